//! Unified error types for scrapay.
//!
//! Every variant maps to a stable JSON-RPC error code so that MCP clients can
//! branch on the failure without parsing the message.

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::config::ConfigError;

/// Unified error types for the scrapay server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A URL could not be parsed or has no host.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The scraping API could not be reached.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The scraping API answered with a body that is not the expected JSON.
    #[error("UNEXPECTED_RESPONSE: {0}")]
    UnexpectedResponse(String),

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::UnexpectedResponse(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::UnexpectedResponse(msg) => (-32013, msg.clone()),
            Error::Config(e) => (-32014, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
