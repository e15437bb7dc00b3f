//! Error types for model calls.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// No API key for the provider.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// The HTTP request could not be completed.
    #[error("model request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
