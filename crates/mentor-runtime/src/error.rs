//! Error types for the runtime crate.

use thiserror::Error;

/// Errors that can occur in the client runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The frame source refused to start.
    #[error("screen capture denied: {0}")]
    CaptureDenied(String),

    /// An operation that needs an active capture ran while idle.
    #[error("not recording")]
    NotRecording,

    /// The backend could not be reached or answered with garbage.
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Remote(String),

    /// Reading a frame from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be decoded or encoded.
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
