//! Broker object reference strings
//!
//! A broker locator names a servant by host, port and object key:
//! `broker://host:port/object-key`. The port may be omitted, in which case
//! the configured default applies.

use core::fmt;

use courier_core::Locator;

use crate::error::BrokerError;

/// Scheme prefix of broker reference strings.
pub const BROKER_SCHEME: &str = "broker://";

// ----------------------------------------------------------------------------
// Broker Reference
// ----------------------------------------------------------------------------

/// Parsed broker object reference: the bound handle of the broker backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerRef {
    host: String,
    port: u16,
    key: String,
}

impl BrokerRef {
    /// Parse a locator as a broker reference, filling a missing port with
    /// `default_port`. No I/O: validation only.
    pub fn parse(locator: &Locator, default_port: u16) -> Result<Self, BrokerError> {
        let raw = locator.as_str();
        let rest = raw
            .strip_prefix(BROKER_SCHEME)
            .ok_or_else(|| BrokerError::invalid_reference(raw, "missing broker:// scheme"))?;

        let (authority, key) = rest
            .split_once('/')
            .ok_or_else(|| BrokerError::invalid_reference(raw, "missing object key"))?;
        if key.is_empty() {
            return Err(BrokerError::invalid_reference(raw, "empty object key"));
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    BrokerError::invalid_reference(raw, format!("invalid port {port:?}"))
                })?;
                (host, port)
            }
            None => (authority, default_port),
        };
        if host.is_empty() {
            return Err(BrokerError::invalid_reference(raw, "empty host"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            key: key.to_string(),
        })
    }

    /// Host the servant lives on.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Broker endpoint port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Object key identifying the servant.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `host:port` form suitable for connecting.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for BrokerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BROKER_SCHEME}{}:{}/{}", self.host, self.port, self.key)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_reference() {
        let reference =
            BrokerRef::parse(&Locator::new("broker://host.example:9001/acc"), 7779).unwrap();
        assert_eq!(reference.host(), "host.example");
        assert_eq!(reference.port(), 9001);
        assert_eq!(reference.key(), "acc");
        assert_eq!(reference.endpoint(), "host.example:9001");
        assert_eq!(reference.to_string(), "broker://host.example:9001/acc");
    }

    #[test]
    fn test_parse_fills_default_port() {
        let reference = BrokerRef::parse(&Locator::new("broker://host.example/acc"), 7779).unwrap();
        assert_eq!(reference.port(), 7779);
    }

    #[test]
    fn test_parse_rejects_malformed_references() {
        for raw in [
            "http://host/acc",
            "broker://host:9001",
            "broker://host:9001/",
            "broker://:9001/acc",
            "broker://host:notaport/acc",
        ] {
            assert!(
                BrokerRef::parse(&Locator::new(raw), 7779).is_err(),
                "{raw} should not parse"
            );
        }
    }
}
