//! Error types for the painpoint server.

use crate::mcp::protocol::JsonRpcError;
use painpoint_core::SolutionError;
use thiserror::Error;

/// Errors that can occur in the CLI and MCP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Solution(#[from] SolutionError),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unsupported encoder: {0}")]
    UnsupportedEncoder(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }
}

impl From<ServerError> for JsonRpcError {
    fn from(err: ServerError) -> Self {
        match &err {
            ServerError::InvalidParams(_)
            | ServerError::UnknownTool(_)
            | ServerError::ResourceNotFound(_) => JsonRpcError::invalid_params(err.to_string()),
            _ => JsonRpcError::internal_error(err.to_string()),
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
