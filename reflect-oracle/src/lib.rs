//! The oracle completion trait consulted once per reflection cycle, plus a
//! concrete Ollama-compatible adapter and a deterministic test double.

#![warn(missing_docs, clippy::pedantic)]

mod http_client;
mod oracle;
pub mod ollama;
pub mod static_oracle;

/// The oracle trait, its request/response types, and its error taxonomy.
pub use oracle::{
    MessageRole, Oracle, OracleError, OracleMessage, OracleRequest, OracleResponse, OracleResult,
    StopReason,
};
