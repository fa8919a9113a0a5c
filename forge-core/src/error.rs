//! Error types for Forge

use thiserror::Error;

/// Result type alias for Forge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Forge operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error talking to the chat service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat service answered, but not with something usable
    #[error("Agent error: {0}")]
    Agent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
