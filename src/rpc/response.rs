//! Mapping of handler failures onto JSON-RPC error responses.

use serde_json::{json, Value};

use super::handlers::HandlerError;
use super::protocol::{
    JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, NOT_FOUND,
    PRECONDITION_NOT_MET, STATE_CONFLICT, VALIDATION_ERROR,
};
use crate::error::EngineError;

/// JSON-RPC code for an engine error.
pub fn engine_error_code(err: &EngineError) -> i32 {
    match err {
        EngineError::Validation(_) => VALIDATION_ERROR,
        EngineError::PreconditionNotMet(_) => PRECONDITION_NOT_MET,
        EngineError::NotFound(_) => NOT_FOUND,
        EngineError::StateConflict(_) => STATE_CONFLICT,
        EngineError::Storage(_) => INTERNAL_ERROR,
    }
}

fn error_data(kind: &str, message: &str) -> Value {
    json!({ "kind": kind, "message": message })
}

/// Build the error response for a failed method call.
pub fn failure_response(id: Value, err: &HandlerError) -> JsonRpcResponse {
    match err {
        HandlerError::MethodNotFound(method) => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {}", method),
        ),
        HandlerError::InvalidParams(msg) => JsonRpcResponse::error_with_data(
            id,
            INVALID_PARAMS,
            &format!("Invalid params: {}", msg),
            Some(error_data("validation_error", msg)),
        ),
        HandlerError::Engine(e) => JsonRpcResponse::error_with_data(
            id,
            engine_error_code(e),
            &e.to_string(),
            Some(error_data(e.kind(), &e.detail())),
        ),
        HandlerError::Internal(msg) => {
            JsonRpcResponse::error(id, INTERNAL_ERROR, &format!("Server error: {}", msg))
        }
    }
}
