//! API response types

use serde::Serialize;

use crate::error::FieldErrors;

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub detail: String,
    /// Stable machine-readable error code
    pub code: String,
    /// Per-field messages, only present for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
            errors: None,
        }
    }

    pub fn with_errors(
        code: impl Into<String>,
        detail: impl Into<String>,
        errors: FieldErrors,
    ) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
            errors: Some(errors),
        }
    }
}
