//! Broker transport backend
//!
//! One TCP connection per invocation: connect, send the request frame,
//! read the reply frame, done. Broker-level frames (`NoSuchObject`,
//! `Fault`) translate into transport failures; what the reply payload
//! means is decided upstream by the forwarding link.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

use courier_core::config::DEFAULT_BROKER_PORT;
use courier_core::{Envelope, Locator, TransportBackend, TransportFailure, WireCodec};

use crate::error::BrokerError;
use crate::frame::{read_frame, write_frame, BrokerFrame, MAX_FRAME};
use crate::reference::BrokerRef;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the broker transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Port used when a broker reference omits one.
    pub default_port: u16,
    /// Cost reported to the external route selector.
    pub cost: u32,
    /// Upper bound on one frame body, in bytes.
    pub max_frame: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_BROKER_PORT,
            cost: 75,
            max_frame: MAX_FRAME,
        }
    }
}

// ----------------------------------------------------------------------------
// Broker Backend
// ----------------------------------------------------------------------------

/// Framed request/reply transport against a remote object broker.
pub struct BrokerBackend {
    config: BrokerConfig,
    codec: WireCodec,
}

impl BrokerBackend {
    /// Create a backend with the given configuration.
    pub fn new(config: BrokerConfig, codec: WireCodec) -> Self {
        Self { config, codec }
    }
}

impl Default for BrokerBackend {
    fn default() -> Self {
        Self::new(BrokerConfig::default(), WireCodec::new())
    }
}

#[async_trait]
impl TransportBackend for BrokerBackend {
    type Handle = BrokerRef;

    fn protocol(&self) -> &'static str {
        "broker"
    }

    fn cost(&self) -> u32 {
        self.config.cost
    }

    fn bind(&self, locator: &Locator) -> Result<BrokerRef, TransportFailure> {
        Ok(BrokerRef::parse(locator, self.config.default_port)?)
    }

    async fn invoke(
        &self,
        handle: &BrokerRef,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, TransportFailure> {
        let encoded = self
            .codec
            .encode_envelope(envelope)
            .map_err(|err| TransportFailure::protocol(err.to_string()))?;

        let mut stream = TcpStream::connect(handle.endpoint())
            .await
            .map_err(|err| TransportFailure::connection_failed(handle, err.to_string()))?;

        debug!(reference = %handle, "invoking broker servant");

        let request = BrokerFrame::Request {
            key: handle.key().to_string(),
            envelope: encoded,
        };
        write_frame(&mut stream, &request, self.config.max_frame)
            .await
            .map_err(TransportFailure::from)?;

        match read_frame(&mut stream, self.config.max_frame).await? {
            BrokerFrame::Reply { payload } => Ok(payload),
            BrokerFrame::NoSuchObject { key } => {
                Err(BrokerError::NoSuchObject { key }.into())
            }
            BrokerFrame::Fault { reason } => Err(BrokerError::Fault(reason).into()),
            BrokerFrame::Request { .. } => {
                Err(TransportFailure::protocol("unexpected request frame in reply"))
            }
        }
    }
}
