//! HTTP transport backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use courier_core::{Envelope, Locator, ProtocolTable, TransportBackend, TransportFailure, WireCodec};

use crate::error::HttpTransportError;

/// Content type of both request and response bodies.
const BODY_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Protocol → default-port table consulted when a URL omits its port.
    pub ports: ProtocolTable,
    /// Cost reported to the external route selector.
    pub cost: u32,
    /// Whole-round-trip timeout for one invocation.
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            ports: ProtocolTable::default(),
            cost: 50,
            request_timeout: Duration::from_secs(60),
        }
    }
}

// ----------------------------------------------------------------------------
// HTTP Backend
// ----------------------------------------------------------------------------

/// POST-per-invocation transport over a pre-built HTTP client.
pub struct HttpBackend {
    config: HttpConfig,
    client: reqwest::Client,
    codec: WireCodec,
}

impl HttpBackend {
    /// Create a backend with the given configuration.
    ///
    /// The client never follows redirects: a redirecting endpoint surfaces
    /// as an unexpected status, not a silent re-route.
    pub fn new(config: HttpConfig, codec: WireCodec) -> Result<Self, HttpTransportError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(config.request_timeout)
            .build()
            .map_err(HttpTransportError::ClientBuild)?;
        Ok(Self {
            config,
            client,
            codec,
        })
    }
}

#[async_trait]
impl TransportBackend for HttpBackend {
    type Handle = Url;

    fn protocol(&self) -> &'static str {
        "http"
    }

    fn cost(&self) -> u32 {
        self.config.cost
    }

    fn bind(&self, locator: &Locator) -> Result<Url, TransportFailure> {
        let mut url = Url::parse(locator.as_str())
            .map_err(|err| HttpTransportError::invalid_url(locator.as_str(), err.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(HttpTransportError::UnsupportedScheme {
                    scheme: other.to_string(),
                }
                .into());
            }
        }

        if url.port().is_none() {
            if let Some(port) = self.config.ports.port_for(self.protocol()) {
                url.set_port(Some(port)).map_err(|()| {
                    HttpTransportError::invalid_url(locator.as_str(), "cannot carry a port")
                })?;
            }
        }

        Ok(url)
    }

    async fn invoke(&self, handle: &Url, envelope: &Envelope) -> Result<Vec<u8>, TransportFailure> {
        let body = self
            .codec
            .encode_envelope(envelope)
            .map_err(|err| TransportFailure::protocol(err.to_string()))?;

        debug!(url = %handle, bytes = body.len(), "posting envelope");

        let response = self
            .client
            .post(handle.clone())
            .header(CONTENT_TYPE, BODY_CONTENT_TYPE)
            .header(CACHE_CONTROL, "no-cache")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TransportFailure::Timeout {
                        after: self.config.request_timeout,
                    }
                } else {
                    TransportFailure::connection_failed(handle, err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpTransportError::UnexpectedStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let reply = response
            .bytes()
            .await
            .map_err(|err| TransportFailure::MalformedReply(err.to_string()))?;
        Ok(reply.to_vec())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
