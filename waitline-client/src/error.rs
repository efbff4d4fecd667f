//! Error types for the synchronization subsystem

use thiserror::Error;

/// Errors surfaced by the queue client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level request failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response envelope was malformed or missing its payload
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),

    /// 401: token missing or expired
    #[error("authentication required")]
    Unauthorized,

    /// 403: the token does not grant this tenant or action
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// 404: the lane or entry no longer exists
    #[error("not found: {0}")]
    NotFound(String),

    /// 400: the backend rejected the request parameters
    #[error("rejected by server: {0}")]
    Validation(String),

    /// Any other backend failure
    #[error("server error: {0}")]
    Internal(String),

    /// JSON encode/decode failure
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The notification stream could not be established
    #[error("notification stream: {0}")]
    Connection(String),

    /// Bad client configuration
    #[error("configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
