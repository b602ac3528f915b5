//! Error taxonomy for the CampusFlow API client.

use thiserror::Error;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx response. `message` is the body's `detail` field when the
    /// backend supplied one, otherwise a generic `HTTP <status>` string.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Network-level failure (DNS, connection refused, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body did not decode into the declared type.
    #[error("failed to decode response: {message}")]
    Deserialization { message: String, body: String },

    /// Invalid base or joined URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A configured bearer token contained bytes not valid in a header.
    #[error("invalid API token: {0}")]
    InvalidToken(String),
}

impl Error {
    /// HTTP status of an [`Error::Api`], if that's what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
