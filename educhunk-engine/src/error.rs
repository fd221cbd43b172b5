//! Engine error types

use educhunk_core::CoreError;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Detection, resolution or assembly failed for a document
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Chunk store failure
    #[error("store error: {0}")]
    Store(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Processing was cancelled before results were persisted
    #[error("processing cancelled")]
    Cancelled,
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Store(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
