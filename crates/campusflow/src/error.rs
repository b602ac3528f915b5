//! CLI error types with miette diagnostics.
//!
//! Maps core/config errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use campusflow_core::CoreError;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the CampusFlow backend")]
    #[diagnostic(
        code(campusflow::connection_failed),
        help(
            "Check that the backend is running and the URL is correct.\n\
             Try: campusflow health --api-url http://localhost:8000"
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed ({status})")]
    #[diagnostic(
        code(campusflow::auth_failed),
        help("Set a token with --token or the CAMPUSFLOW_API_TOKEN environment variable.")
    )]
    AuthFailed { status: u16 },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(campusflow::not_found),
        help("Run: campusflow {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Backend error ({status}): {message}")]
    #[diagnostic(code(campusflow::api_error))]
    Backend { status: u16, message: String },

    #[error("Unexpected response from the backend: {message}")]
    #[diagnostic(
        code(campusflow::bad_response),
        help("The backend may be a different version than this client expects.")
    )]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(campusflow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(campusflow::config))]
    Config(#[from] campusflow_config::ConfigError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<campusflow_api::Error> for CliError {
    fn from(err: campusflow_api::Error) -> Self {
        match err {
            campusflow_api::Error::Api { status, message } => match status {
                401 | 403 => Self::AuthFailed { status },
                _ => Self::Backend { status, message },
            },
            campusflow_api::Error::Transport(e) => Self::ConnectionFailed { source: e.into() },
            campusflow_api::Error::Deserialization { message, .. } => {
                Self::UnexpectedResponse { message }
            }
            campusflow_api::Error::Url(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            campusflow_api::Error::InvalidToken(reason) => Self::Validation {
                field: "token".into(),
                reason,
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => api.into(),
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
        }
    }
}
