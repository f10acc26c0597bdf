//! Configuration for the Courier core
//!
//! Transport crates carry their own configuration structs; this module
//! holds the pieces shared across them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Codec Configuration
// ----------------------------------------------------------------------------

/// Default maximum payload size accepted by the codec (512 KiB).
pub const DEFAULT_MAX_PAYLOAD: usize = 512 * 1024;

/// Configuration for the wire codec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum payload size in bytes, checked at encode time.
    pub max_payload: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

// ----------------------------------------------------------------------------
// Protocol Table
// ----------------------------------------------------------------------------

/// Default port for the HTTP transport.
pub const DEFAULT_HTTP_PORT: u16 = 7778;

/// Default port for the broker transport.
pub const DEFAULT_BROKER_PORT: u16 = 7779;

/// Explicit protocol-name → default-port table.
///
/// Backends consult it when a locator omits the port, so port discovery is
/// a plain lookup instead of runtime reflection over configuration
/// accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolTable {
    ports: HashMap<String, u16>,
}

impl ProtocolTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            ports: HashMap::new(),
        }
    }

    /// Get the default port configured for a protocol, if any.
    pub fn port_for(&self, protocol: &str) -> Option<u16> {
        self.ports.get(protocol).copied()
    }

    /// Set the default port for a protocol.
    pub fn set_port<T: Into<String>>(&mut self, protocol: T, port: u16) {
        self.ports.insert(protocol.into(), port);
    }
}

impl Default for ProtocolTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.set_port("http", DEFAULT_HTTP_PORT);
        table.set_port("broker", DEFAULT_BROKER_PORT);
        table
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
