//! Error types for painpoint-core

use thiserror::Error;

/// Errors that can occur while building or querying the matcher
#[derive(Debug, Error)]
pub enum SolutionError {
    /// Catalog is missing, empty, or inconsistent with its embeddings
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Embedding set does not line up with the catalog or the encoder
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid engine configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Model loading error
    #[error("Model error: {0}")]
    Model(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Serialization error (bincode)
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SolutionError {
    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }
}

/// Result type for matcher operations
pub type Result<T> = std::result::Result<T, SolutionError>;
