//! Error types for the chat transport

use courier_core::TransportFailure;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the store-and-forward chat transport.
#[derive(Error, Debug)]
pub enum ChatTransportError {
    #[error("invalid chat address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("send to {to} failed: {reason}")]
    SendFailed { to: String, reason: String },

    #[error("chat session closed")]
    SessionClosed,
}

impl ChatTransportError {
    /// Create an invalid-address error.
    pub fn invalid_address<A: Into<String>, R: Into<String>>(address: A, reason: R) -> Self {
        ChatTransportError::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a send failure.
    pub fn send_failed<T: ToString, R: Into<String>>(to: T, reason: R) -> Self {
        ChatTransportError::SendFailed {
            to: to.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ChatTransportError> for TransportFailure {
    fn from(err: ChatTransportError) -> Self {
        match err {
            ChatTransportError::SendFailed { to, reason } => TransportFailure::ConnectionFailed {
                locator: to,
                reason,
            },
            other => TransportFailure::protocol(other.to_string()),
        }
    }
}
