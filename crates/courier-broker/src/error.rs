//! Error types for the broker transport

use courier_core::TransportFailure;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the broker transport.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("invalid broker reference {reference:?}: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("connection closed mid-frame")]
    ConnectionClosed,

    #[error("no servant registered for object key {key:?}")]
    NoSuchObject { key: String },

    #[error("broker fault: {0}")]
    Fault(String),

    #[error("frame serialization failed: {0}")]
    Framing(#[from] bincode::Error),

    #[error("network i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrokerError {
    /// Create an invalid-reference error.
    pub fn invalid_reference<R: Into<String>, S: Into<String>>(reference: R, reason: S) -> Self {
        BrokerError::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

impl From<BrokerError> for TransportFailure {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::Io(io) => TransportFailure::Io(io),
            other => TransportFailure::protocol(other.to_string()),
        }
    }
}
