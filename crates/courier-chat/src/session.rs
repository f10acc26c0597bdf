//! Chat session seam
//!
//! Session setup (server login, reconnects) happens outside this crate.
//! The transport only needs two things from the session: an outbound
//! "send one text to one handle" operation, and a channel of inbound
//! texts feeding the listener.

use core::fmt;

use async_trait::async_trait;
use courier_core::Locator;

use crate::error::ChatTransportError;

/// Optional scheme prefix on chat locators.
pub const CHAT_SCHEME: &str = "chat:";

// ----------------------------------------------------------------------------
// Chat Address
// ----------------------------------------------------------------------------

/// One chat handle, `localpart@host`: the bound handle of the chat
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatAddress {
    local: String,
    host: String,
}

impl ChatAddress {
    /// Build an address from its parts.
    pub fn new<L: Into<String>, H: Into<String>>(local: L, host: H) -> Self {
        Self {
            local: local.into(),
            host: host.into(),
        }
    }

    /// Parse a locator of the form `chat:localpart@host` (the scheme is
    /// optional). No I/O: validation only.
    pub fn parse(locator: &Locator) -> Result<Self, ChatTransportError> {
        let raw = locator.as_str();
        let handle = raw.strip_prefix(CHAT_SCHEME).unwrap_or(raw);

        let (local, host) = handle
            .split_once('@')
            .ok_or_else(|| ChatTransportError::invalid_address(raw, "missing @"))?;
        if local.is_empty() || host.is_empty() || host.contains('@') {
            return Err(ChatTransportError::invalid_address(raw, "malformed handle"));
        }

        Ok(Self::new(local, host))
    }

    /// Local part of the handle.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Host part of the handle.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for ChatAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.host)
    }
}

// ----------------------------------------------------------------------------
// Session Traits
// ----------------------------------------------------------------------------

/// Outbound half of a logged-in chat session.
#[async_trait]
pub trait ChatSession: Send + Sync + 'static {
    /// Send one text message to a chat handle.
    async fn send(&self, to: &ChatAddress, body: &str) -> Result<(), ChatTransportError>;
}

/// One text received by the session.
#[derive(Debug, Clone)]
pub struct InboundText {
    /// Chat handle of the sender; replies go back here.
    pub from: ChatAddress,
    /// Message body as received.
    pub body: String,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_scheme() {
        let with_scheme = ChatAddress::parse(&Locator::new("chat:relay@hub.example")).unwrap();
        let without = ChatAddress::parse(&Locator::new("relay@hub.example")).unwrap();
        assert_eq!(with_scheme, without);
        assert_eq!(with_scheme.local(), "relay");
        assert_eq!(with_scheme.host(), "hub.example");
        assert_eq!(with_scheme.to_string(), "relay@hub.example");
    }

    #[test]
    fn test_parse_rejects_malformed_handles() {
        for raw in ["relay", "@hub", "relay@", "a@b@c", "chat:@hub"] {
            assert!(
                ChatAddress::parse(&Locator::new(raw)).is_err(),
                "{raw} should not parse"
            );
        }
    }
}
