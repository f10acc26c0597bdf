//! Core types for the Courier forwarding protocol
//!
//! This module defines the fundamental identifiers used throughout the
//! relay, using newtype patterns for semantic validation and type safety.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DecodingError;

// ----------------------------------------------------------------------------
// Peer Address
// ----------------------------------------------------------------------------

/// Logical, transport-independent identifier for a message destination
/// (conventionally `name@platform`).
///
/// Peer addresses compare by value and serve as the key of the resolution
/// cache. They say nothing about how the peer is reached; the resolver maps
/// them to transport-specific [`Locator`]s.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerAddress(String);

impl PeerAddress {
    /// Create a new peer address from any string-like value.
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self(name.into())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PeerAddress {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(DecodingError::InvalidAddress(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

// ----------------------------------------------------------------------------
// Locator
// ----------------------------------------------------------------------------

/// Transport-specific address string resolved from a [`PeerAddress`]
/// (a broker reference string, a URL, a chat handle).
///
/// Locators are produced by the resolver and consumed by a transport
/// backend's `bind`; the core never interprets their contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(String);

impl Locator {
    /// Create a new locator from any string-like value.
    pub fn new<T: Into<String>>(raw: T) -> Self {
        Self(raw.into())
    }

    /// Get the locator as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Message Identifier
// ----------------------------------------------------------------------------

/// Unique identifier of one application message, carried in every envelope
/// and used to correlate replies with pending requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random identifier.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw milliseconds.
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current wall-clock timestamp.
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }

    /// Get the raw milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
