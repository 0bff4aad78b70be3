//! Error types for the Retort core library.

use thiserror::Error;

use crate::endpoints::ResolveError;

/// Core error type for the Retort client.
///
/// Server failures are normalized into either [`RetortError::AuthRequired`]
/// (any 401, regardless of body) or [`RetortError::Api`] carrying the
/// message and optional detail extracted from the response body.
#[derive(Error, Debug)]
pub enum RetortError {
    #[error("Authentication Required")]
    AuthRequired,

    #[error("{message}")]
    Api {
        message: String,
        detail: Option<String>,
    },

    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Endpoint resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl RetortError {
    /// Secondary detail line accompanying the primary message, when the
    /// server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            RetortError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for Retort operations.
pub type Result<T> = std::result::Result<T, RetortError>;
