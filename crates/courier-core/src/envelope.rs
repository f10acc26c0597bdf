//! Wire units exchanged between peers
//!
//! An application [`Message`] is encoded into the payload of an
//! [`Envelope`], the unit a transport backend actually moves. Replies come
//! back as an encoded [`Reply`], a tagged sum that carries either the
//! delivery receipt, an explicit misdelivery signal, or a serialized
//! non-retryable [`DeliveryFault`]. Remote failures travel as data, never as
//! rethrown exceptions.

use serde::{Deserialize, Serialize};

use crate::types::{MessageId, PeerAddress, Timestamp};

// ----------------------------------------------------------------------------
// Application Message
// ----------------------------------------------------------------------------

/// One application-level message handed to the forwarding link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Logical address of the sender.
    pub sender: PeerAddress,
    /// MIME-style content type of the body.
    pub content_type: String,
    /// Opaque message body.
    pub body: Vec<u8>,
}

impl Message {
    /// Create a new message with a fresh identifier.
    pub fn new<T: Into<String>>(sender: PeerAddress, content_type: T, body: Vec<u8>) -> Self {
        Self {
            id: MessageId::fresh(),
            sender,
            content_type: content_type.into(),
            body,
        }
    }
}

// ----------------------------------------------------------------------------
// Delivery Receipt
// ----------------------------------------------------------------------------

/// Attributes of a completed delivery, returned to the sender on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttributes {
    /// Identifier of the delivered message.
    pub message_id: MessageId,
    /// Peer that accepted the message.
    pub receiver: PeerAddress,
    /// When the receiving side accepted it.
    pub received_at: Timestamp,
}

impl MessageAttributes {
    /// Build a receipt for a message accepted now.
    pub fn receipt(message_id: MessageId, receiver: PeerAddress) -> Self {
        Self {
            message_id,
            receiver,
            received_at: Timestamp::now(),
        }
    }
}

// ----------------------------------------------------------------------------
// Envelope
// ----------------------------------------------------------------------------

/// The outbound unit a transport backend moves: an opaque payload plus the
/// addressing and correlation fields every transport needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Identifier of this envelope.
    pub id: MessageId,
    /// For replies, the id of the request envelope being answered.
    pub reply_to: Option<MessageId>,
    /// Logical address of the originating peer.
    pub source: PeerAddress,
    /// Logical address of the destination peer.
    pub target: PeerAddress,
    /// Encoded message (requests) or encoded reply (replies).
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Build a request envelope. The envelope reuses the message id so
    /// store-and-forward transports can correlate the eventual reply.
    pub fn request(id: MessageId, source: PeerAddress, target: PeerAddress, payload: Vec<u8>) -> Self {
        Self {
            id,
            reply_to: None,
            source,
            target,
            payload,
        }
    }

    /// Build the reply envelope for a request, with source and target
    /// swapped and `reply_to` pointing at the request.
    pub fn reply_to(request: &Envelope, payload: Vec<u8>) -> Self {
        Self {
            id: MessageId::fresh(),
            reply_to: Some(request.id),
            source: request.target.clone(),
            target: request.source.clone(),
            payload,
        }
    }

    /// Whether this envelope answers an earlier request.
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}

// ----------------------------------------------------------------------------
// Reply Payload
// ----------------------------------------------------------------------------

/// Remote-side non-retryable delivery failure.
///
/// This is the one error shape that crosses the wire as data and must come
/// back out of the codec as a typed error: blind retry would mask it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("non-retryable delivery fault: {reason}")]
pub struct DeliveryFault {
    /// Human-readable description of the remote failure.
    pub reason: String,
}

impl DeliveryFault {
    /// Create a fault with the given reason.
    pub fn new<T: Into<String>>(reason: T) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of one delivery attempt as reported by the receiving side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// The message reached its target; here is the receipt.
    Delivered(MessageAttributes),
    /// The addressed target is not hosted at this locator.
    Misdelivered,
    /// The local delivery sink failed with a non-retryable error.
    Failure(DeliveryFault),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
