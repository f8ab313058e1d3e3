//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    /// Request never produced a complete response (connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Flatten a reqwest error and its source chain into a transport error
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(s) = source {
            msg.push_str(&format!(" → {s}"));
            source = s.source();
        }
        Self::Transport(msg)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
