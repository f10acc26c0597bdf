//! Error types for the HTTP transport

use courier_core::TransportFailure;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the HTTP transport.
#[derive(Error, Debug)]
pub enum HttpTransportError {
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme {scheme:?}")]
    UnsupportedScheme { scheme: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },
}

impl HttpTransportError {
    /// Create an invalid-URL error.
    pub fn invalid_url<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        HttpTransportError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<HttpTransportError> for TransportFailure {
    fn from(err: HttpTransportError) -> Self {
        TransportFailure::protocol(err.to_string())
    }
}
