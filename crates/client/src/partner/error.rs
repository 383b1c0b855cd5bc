//! Partner API client error types.

use std::sync::Arc;

/// Errors from the partner carrier API client.
#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    /// Missing partner API token.
    #[error("missing partner token")]
    MissingToken,

    /// Missing seller alias for partner API paths.
    #[error("missing partner alias")]
    MissingAlias,

    /// Authentication failed (invalid or expired token).
    #[error("authentication failed: status {status}")]
    AuthError { status: u16 },

    /// Non-success HTTP response.
    #[error("HTTP error: status {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PartnerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { PartnerError::Timeout } else { PartnerError::Network(Arc::new(err)) }
    }
}
