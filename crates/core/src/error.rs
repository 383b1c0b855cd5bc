//! Unified error types for the quote-proxy pipeline.
//!
//! These are the client-facing failures: each variant knows the HTTP status
//! the thin layer should answer with.

/// Unified error type for quote handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// App-proxy signature missing or did not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// Bad request input (postal code, item lists, quantities).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An item code neither numeric nor present in the catalog.
    #[error("unmapped sku: {0}")]
    UnmappedSku(String),

    /// Partner API answered with a non-success status.
    #[error("upstream failure: status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Catalog hydration attempt failed (non-fatal for the schedule).
    #[error("hydration failed: {0}")]
    Hydration(String),
}

impl Error {
    /// HTTP status the thin layer should respond with.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidSignature => 401,
            Error::InvalidInput(_) | Error::UnmappedSku(_) => 400,
            Error::Upstream { .. } => 502,
            Error::Hydration(_) => 500,
        }
    }
}
