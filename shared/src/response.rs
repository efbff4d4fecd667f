//! REST response envelope
//!
//! Every Waitline endpoint wraps its payload in the same envelope so
//! clients can distinguish transport success from application errors.

use serde::{Deserialize, Serialize};

/// Code carried by successful responses; anything else is an error code.
pub const API_CODE_SUCCESS: &str = "E0000";

/// Envelope around every endpoint payload
///
/// On the wire: `{"code": "E0000", "message": "Success", "data": ...}`.
/// Error responses carry a non-success code and usually no `data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload in a success envelope
    pub fn ok(data: T) -> Self {
        Self {
            code: API_CODE_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Build an error envelope with no payload
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == API_CODE_SUCCESS
    }
}
