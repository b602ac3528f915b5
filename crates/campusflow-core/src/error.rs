//! Core error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Passed through from the API client unchanged.
    #[error(transparent)]
    Api(#[from] campusflow_api::Error),

    /// A read was issued without its required parameter (disabled-read
    /// guard) or with an unusable one.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}
