//! Store-and-forward transport backend

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tracing::debug;

use courier_core::{
    Envelope, Locator, Receiver, TransportBackend, TransportFailure, WireCodec,
};

use crate::config::ChatConfig;
use crate::error::ChatTransportError;
use crate::listener::InboundListener;
use crate::pending::PendingReplies;
use crate::session::{ChatAddress, ChatSession, InboundText};

// ----------------------------------------------------------------------------
// Outbound Gate
// ----------------------------------------------------------------------------

/// The one shared chat session, serialized to one outbound send at a time
/// so concurrent invocations cannot interleave message framing.
pub(crate) struct OutboundGate {
    session: Arc<dyn ChatSession>,
    lock: Mutex<()>,
}

impl OutboundGate {
    fn new(session: Arc<dyn ChatSession>) -> Self {
        Self {
            session,
            lock: Mutex::new(()),
        }
    }

    pub(crate) async fn send(
        &self,
        to: &ChatAddress,
        body: &str,
    ) -> Result<(), ChatTransportError> {
        let _guard = self.lock.lock().await;
        self.session.send(to, body).await
    }
}

// ----------------------------------------------------------------------------
// Store-and-Forward Backend
// ----------------------------------------------------------------------------

/// Connectionless chat transport: send one base64 text, await the
/// correlated reply out-of-band.
pub struct StoreForwardBackend {
    config: ChatConfig,
    codec: WireCodec,
    gate: Arc<OutboundGate>,
    pending: Arc<PendingReplies>,
}

impl StoreForwardBackend {
    /// Create a backend over an already-established chat session.
    pub fn new(config: ChatConfig, codec: WireCodec, session: Arc<dyn ChatSession>) -> Self {
        Self {
            config,
            codec,
            gate: Arc::new(OutboundGate::new(session)),
            pending: Arc::new(PendingReplies::new()),
        }
    }

    /// Build the single inbound listener for this backend instance.
    ///
    /// `inbound` is the channel the session feeds received texts into;
    /// `receiver` handles the requests among them. Spawn the returned
    /// listener's `run` before invoking.
    pub fn listener(&self, inbound: mpsc::Receiver<InboundText>, receiver: Receiver) -> InboundListener {
        InboundListener::new(
            self.codec.clone(),
            self.gate.clone(),
            self.pending.clone(),
            receiver,
            inbound,
        )
    }
}

#[async_trait]
impl TransportBackend for StoreForwardBackend {
    type Handle = ChatAddress;

    fn protocol(&self) -> &'static str {
        "chat"
    }

    fn cost(&self) -> u32 {
        self.config.cost
    }

    fn bind(&self, locator: &Locator) -> Result<ChatAddress, TransportFailure> {
        Ok(ChatAddress::parse(locator)?)
    }

    async fn invoke(
        &self,
        handle: &ChatAddress,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, TransportFailure> {
        let encoded = self
            .codec
            .encode_envelope(envelope)
            .map_err(|err| TransportFailure::protocol(err.to_string()))?;
        let text = BASE64.encode(&encoded);

        // Park the waiter before sending so a fast reply cannot race past
        // its own registration.
        let wait = self.pending.register(envelope.id).await;

        debug!(to = %handle, request = %envelope.id, "sending store-and-forward request");
        if let Err(err) = self.gate.send(handle, &text).await {
            self.pending.abandon(&envelope.id).await;
            return Err(err.into());
        }

        match timeout(self.config.reply_timeout, wait).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => {
                self.pending.abandon(&envelope.id).await;
                Err(TransportFailure::protocol("reply channel dropped"))
            }
            Err(_) => {
                self.pending.abandon(&envelope.id).await;
                debug!(request = %envelope.id, "expiration window closed without a reply");
                Err(TransportFailure::Timeout {
                    after: self.config.reply_timeout,
                })
            }
        }
    }
}
