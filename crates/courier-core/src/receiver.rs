//! Servant-side request handling
//!
//! The receiver sits between a transport's inbound path and the local
//! delivery sink. It never lets an error escape past its boundary: every
//! outcome, including decode failures, is converted into a well-formed
//! encoded [`Reply`] so the calling transport always has bytes to return.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::codec::WireCodec;
use crate::envelope::{DeliveryFault, Message, MessageAttributes, Reply};
use crate::errors::DeliveryError;
use crate::types::PeerAddress;

// ----------------------------------------------------------------------------
// Delivery Sink Trait
// ----------------------------------------------------------------------------

/// Local delivery endpoint, an external collaborator.
#[async_trait]
pub trait DeliverySink: Send + Sync + 'static {
    /// Deliver a decoded message to its declared target.
    async fn deliver(
        &self,
        message: Message,
        target: &PeerAddress,
    ) -> Result<MessageAttributes, DeliveryError>;
}

// ----------------------------------------------------------------------------
// Receiver
// ----------------------------------------------------------------------------

/// Decodes incoming request bytes, drives the delivery sink, and encodes
/// the outcome.
#[derive(Clone)]
pub struct Receiver {
    codec: WireCodec,
    sink: Arc<dyn DeliverySink>,
}

impl Receiver {
    /// Create a receiver over the given sink.
    pub fn new(codec: WireCodec, sink: Arc<dyn DeliverySink>) -> Self {
        Self { codec, sink }
    }

    /// Handle one raw request and produce the raw reply bytes.
    pub async fn on_request(&self, raw: &[u8]) -> Vec<u8> {
        let reply = self.dispatch(raw).await;
        match self.codec.encode_reply(&reply) {
            Ok(bytes) => bytes,
            Err(err) => {
                // The peer will classify the empty reply as malformed.
                error!(error = %err, "failed to encode reply");
                Vec::new()
            }
        }
    }

    async fn dispatch(&self, raw: &[u8]) -> Reply {
        let envelope = match self.codec.decode_envelope(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "rejecting malformed request envelope");
                return Reply::Failure(DeliveryFault::new(format!(
                    "malformed request envelope: {err}"
                )));
            }
        };

        let message = match self.codec.decode_message(&envelope.payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(source = %envelope.source, error = %err, "rejecting malformed message payload");
                return Reply::Failure(DeliveryFault::new(format!(
                    "malformed message payload: {err}"
                )));
            }
        };

        match self.sink.deliver(message, &envelope.target).await {
            Ok(attributes) => {
                debug!(target = %envelope.target, "delivered inbound message");
                Reply::Delivered(attributes)
            }
            Err(DeliveryError::UnknownTarget(peer)) => {
                warn!(target = %peer, "inbound message for peer not hosted here");
                Reply::Misdelivered
            }
            Err(DeliveryError::Failed(fault)) => Reply::Failure(fault),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
