//! Server error types.

use thiserror::Error;

/// Server error type.
#[derive(Error, Debug)]
pub enum ServerError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Socket error
    #[error("Socket error: {0}")]
    Socket(String),

    /// Connection closed
    #[error("Connection closed")]
    ConnectionClosed,

    /// The server is already listening
    #[error("Server is already listening")]
    AlreadyListening,
}

/// Result type alias using ServerError.
pub type ServerResult<T> = Result<T, ServerError>;
