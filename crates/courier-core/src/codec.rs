//! Wire codec for messages, envelopes and replies
//!
//! One bincode-backed codec serves every transport. Oversized payloads are
//! rejected at encode time; malformed bytes surface as [`DecodingError`]
//! and are mapped to a transport failure on the reply path by the
//! forwarding link.

use crate::config::CodecConfig;
use crate::envelope::{Envelope, Message, Reply};
use crate::errors::{DecodingError, EncodingError};

// ----------------------------------------------------------------------------
// Wire Codec
// ----------------------------------------------------------------------------

/// Bincode-backed codec shared by the forwarding link, the receiver and the
/// transport backends.
#[derive(Debug, Clone)]
pub struct WireCodec {
    max_payload: usize,
}

impl WireCodec {
    /// Create a codec with the default payload limit.
    pub fn new() -> Self {
        Self::from_config(CodecConfig::default())
    }

    /// Create a codec from explicit configuration.
    pub fn from_config(config: CodecConfig) -> Self {
        Self {
            max_payload: config.max_payload,
        }
    }

    /// Encode an application message.
    pub fn encode_message(&self, message: &Message) -> Result<Vec<u8>, EncodingError> {
        self.check_size(message.body.len())?;
        Ok(bincode::serialize(message)?)
    }

    /// Decode an application message.
    pub fn decode_message(&self, raw: &[u8]) -> Result<Message, DecodingError> {
        Ok(bincode::deserialize(raw)?)
    }

    /// Encode an envelope for transmission.
    pub fn encode_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>, EncodingError> {
        self.check_size(envelope.payload.len())?;
        Ok(bincode::serialize(envelope)?)
    }

    /// Decode an envelope received from the wire.
    pub fn decode_envelope(&self, raw: &[u8]) -> Result<Envelope, DecodingError> {
        Ok(bincode::deserialize(raw)?)
    }

    /// Encode a reply payload.
    ///
    /// A [`Reply::Failure`] round-trips as a typed error: decoding it back
    /// yields the same [`crate::DeliveryFault`], not a generic value.
    pub fn encode_reply(&self, reply: &Reply) -> Result<Vec<u8>, EncodingError> {
        Ok(bincode::serialize(reply)?)
    }

    /// Decode a reply payload.
    pub fn decode_reply(&self, raw: &[u8]) -> Result<Reply, DecodingError> {
        Ok(bincode::deserialize(raw)?)
    }

    fn check_size(&self, size: usize) -> Result<(), EncodingError> {
        if size > self.max_payload {
            return Err(EncodingError::PayloadTooLarge {
                size,
                max: self.max_payload,
            });
        }
        Ok(())
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
