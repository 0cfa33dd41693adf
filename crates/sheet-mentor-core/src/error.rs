//! Error types for sheet-mentor-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheet-mentor-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell reference format
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    /// Invalid cell span format
    #[error("Invalid cell span: {0}")]
    InvalidSpan(String),

    /// Checkpoint target is missing or malformed
    #[error("Checkpoint '{0}' has an invalid target: {1}")]
    InvalidCheckpointTarget(String, String),

    /// A value could not be interpreted as a date
    #[error("Value is not a recognizable date: {0}")]
    NotADate(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
