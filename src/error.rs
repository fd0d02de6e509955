//! Error types for the RAG core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG core errors
#[derive(Debug, Error)]
pub enum Error {
    /// Source document could not be parsed into page text
    #[error("Invalid document '{path}': {message}")]
    InvalidDocument { path: PathBuf, message: String },

    /// Configuration error (bad chunking parameters, missing credential, ...)
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Persisted index is unreadable, tampered with, or version-incompatible
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Embedding provider failure or dimensionality mismatch
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Generation provider failure during answer synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an invalid document error
    pub fn invalid_document(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a corrupt index error
    pub fn corrupt_index(message: impl Into<String>) -> Self {
        Self::CorruptIndex(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a synthesis error
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis(message.into())
    }
}
