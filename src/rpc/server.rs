//! RPC server main loop and request handling.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use tracing::debug;

use super::handlers::handle_method;
use super::protocol::{JsonRpcRequest, JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR};
use super::response::failure_response;
use crate::engine::Engine;
use crate::repository::ProjectRepository;

/// Run the server, reading from stdin and writing to stdout.
pub fn run_server<R: ProjectRepository>(engine: &Engine<R>) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(engine, BufReader::new(stdin.lock()), stdout.lock())
}

/// Serve line-delimited requests from `input` until EOF.
pub fn serve<R: ProjectRepository>(
    engine: &Engine<R>,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read request")?;

        if line.trim().is_empty() {
            continue;
        }

        if let Some(resp) = handle_request(engine, &line) {
            let encoded = serde_json::to_string(&resp)?;
            writeln!(output, "{}", encoded)?;
            output.flush()?;
        }
    }

    Ok(())
}

/// Handle a single JSON-RPC request line.
///
/// - **Parse Error (-32700)**: JSON is invalid or malformed
/// - **Invalid Request (-32600)**: `jsonrpc` field is not `"2.0"`
/// - **No Response**: Notifications (requests without `id`) are executed silently
pub fn handle_request<R: ProjectRepository>(
    engine: &Engine<R>,
    line: &str,
) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                Value::Null,
                PARSE_ERROR,
                &format!("Parse error: {}", e),
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::error(
            request.id.unwrap_or(Value::Null),
            INVALID_REQUEST,
            "Invalid JSON-RPC version",
        ));
    }

    debug!(method = %request.method, "RPC request");
    let result = handle_method(engine, &request.method, request.params.as_ref());

    let id = request.id?;
    Some(match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => failure_response(id, &e),
    })
}
