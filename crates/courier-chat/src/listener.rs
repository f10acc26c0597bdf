//! Inbound listener for the chat transport
//!
//! One listener per backend instance. Every inbound text is base64-decoded
//! into an envelope; replies complete their pending request, requests go
//! through the local receiver and the encoded reply is sent back to the
//! originating chat handle. Nothing a peer sends can take the listener
//! down: undecodable texts are logged and dropped.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use courier_core::{Envelope, Receiver, WireCodec};

use crate::backend::OutboundGate;
use crate::pending::PendingReplies;
use crate::session::InboundText;

// ----------------------------------------------------------------------------
// Inbound Listener
// ----------------------------------------------------------------------------

/// Drains the session's inbound texts until the channel closes.
pub struct InboundListener {
    codec: WireCodec,
    gate: Arc<OutboundGate>,
    pending: Arc<PendingReplies>,
    receiver: Receiver,
    inbound: mpsc::Receiver<InboundText>,
}

impl InboundListener {
    pub(crate) fn new(
        codec: WireCodec,
        gate: Arc<OutboundGate>,
        pending: Arc<PendingReplies>,
        receiver: Receiver,
        inbound: mpsc::Receiver<InboundText>,
    ) -> Self {
        Self {
            codec,
            gate,
            pending,
            receiver,
            inbound,
        }
    }

    /// Run until the session closes its inbound channel.
    pub async fn run(mut self) {
        info!("store-and-forward listener started");
        while let Some(text) = self.inbound.recv().await {
            self.handle_text(text).await;
        }
        info!("inbound channel closed, store-and-forward listener stopped");
    }

    async fn handle_text(&self, text: InboundText) {
        let raw = match BASE64.decode(text.body.as_bytes()) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(from = %text.from, error = %err, "discarding non-base64 text");
                return;
            }
        };

        let envelope = match self.codec.decode_envelope(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(from = %text.from, error = %err, "discarding undecodable envelope");
                return;
            }
        };

        if let Some(request_id) = envelope.reply_to {
            if !self.pending.complete(&request_id, envelope.payload).await {
                debug!(request = %request_id, "reply for unknown or expired request");
            }
            return;
        }

        // A fresh request: run it through the receiver and send the
        // encoded reply back to where the text came from.
        let reply_payload = self.receiver.on_request(&raw).await;
        let reply = Envelope::reply_to(&envelope, reply_payload);
        let body = match self.codec.encode_envelope(&reply) {
            Ok(encoded) => BASE64.encode(&encoded),
            Err(err) => {
                warn!(request = %envelope.id, error = %err, "failed to encode reply envelope");
                return;
            }
        };
        if let Err(err) = self.gate.send(&text.from, &body).await {
            warn!(to = %text.from, error = %err, "failed to send reply text");
        }
    }
}
