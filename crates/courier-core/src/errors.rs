//! Error types for the Courier forwarding protocol
//!
//! The taxonomy callers act on lives in [`ForwardError`]: it tells them
//! whether to retry immediately, retry after the cache has been
//! invalidated, or give up. Transport backends report the lower-level
//! [`TransportFailure`]; delivery sinks report [`DeliveryError`].

use core::time::Duration;

use crate::envelope::DeliveryFault;
use crate::types::PeerAddress;

// ----------------------------------------------------------------------------
// Codec Errors
// ----------------------------------------------------------------------------

/// Failure to turn a value into wire bytes.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

/// Failure to turn wire bytes back into a value.
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    #[error("malformed wire data: {0}")]
    Malformed(#[from] bincode::Error),

    #[error("invalid peer address: {0:?}")]
    InvalidAddress(String),
}

// ----------------------------------------------------------------------------
// Transport Failures
// ----------------------------------------------------------------------------

/// Exchange-level failure reported by a transport backend.
///
/// Every variant leaves the cached handle suspect: the forwarding link
/// discards it and the caller may retry, triggering a fresh resolution.
#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    #[error("connection to {locator} failed: {reason}")]
    ConnectionFailed { locator: String, reason: String },

    #[error("network i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no reply within {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("malformed reply: {0}")]
    MalformedReply(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportFailure {
    /// Create a connection failure for the given locator.
    pub fn connection_failed<L: ToString, R: Into<String>>(locator: L, reason: R) -> Self {
        TransportFailure::ConnectionFailed {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a protocol-level failure.
    pub fn protocol<T: Into<String>>(reason: T) -> Self {
        TransportFailure::Protocol(reason.into())
    }
}

// ----------------------------------------------------------------------------
// Delivery Sink Errors
// ----------------------------------------------------------------------------

/// Failure reported by the local delivery sink.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The addressed target is not hosted on this platform.
    #[error("target {0} is not hosted here")]
    UnknownTarget(PeerAddress),

    /// The sink failed with a non-retryable application error.
    #[error(transparent)]
    Failed(#[from] DeliveryFault),
}

// ----------------------------------------------------------------------------
// Forwarding Errors
// ----------------------------------------------------------------------------

/// Classified outcome of a failed forward attempt.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// A resolver lookup is in flight; no invocation was attempted.
    #[error("address resolution pending for {0}")]
    ResolutionPending(PeerAddress),

    /// The directory has no locator for this peer. Permanent until the
    /// entry is decached and a new lookup completes.
    #[error("no locator known for {0}")]
    NameNotFound(PeerAddress),

    /// The remote reported the target is not hosted at the resolved
    /// locator. The handle has been discarded; retry resolves afresh.
    #[error("peer {0} is not hosted at the resolved locator")]
    Misdelivered(PeerAddress),

    /// The remote delivery sink failed with a non-retryable error. The
    /// handle is fine and has been kept.
    #[error("remote delivery failed: {0}")]
    Application(#[from] DeliveryFault),

    /// The exchange itself failed. The handle has been discarded.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportFailure),

    #[error("encoding failure: {0}")]
    Encoding(#[from] EncodingError),

    #[error("decoding failure: {0}")]
    Decoding(#[from] DecodingError),
}

impl ForwardError {
    /// Whether the caller may reasonably retry this forward.
    ///
    /// Application faults are non-retryable by definition; an unknown name
    /// stays unknown until a new lookup completes.
    pub fn is_retryable(&self) -> bool {
        match self {
            ForwardError::ResolutionPending(_) => true,
            ForwardError::Misdelivered(_) => true,
            ForwardError::Transport(_) => true,
            ForwardError::Encoding(_) => true,
            ForwardError::Decoding(_) => true,
            ForwardError::NameNotFound(_) => false,
            ForwardError::Application(_) => false,
        }
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type ForwardResult<T> = core::result::Result<T, ForwardError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
