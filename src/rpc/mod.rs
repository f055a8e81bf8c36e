//! JSON-RPC 2.0 server over stdio.
//!
//! One request per line on stdin, one response per line on stdout. Every
//! engine query and command is exposed as a method; engine errors become
//! JSON-RPC errors carrying `data = {kind, message}`.

pub mod handlers;
pub mod protocol;
pub mod response;
pub mod server;

pub use handlers::{handle_method, HandlerError, METHODS};
pub use server::{handle_request, run_server, serve};
