//! Forwarding link: one request/reply exchange per call
//!
//! The link combines the resolution cache, a transport backend and the
//! codec. Each `forward` call is exactly one attempt: resolve, invoke,
//! classify. There is no retry loop in here — the classified error tells
//! the caller whether retrying makes sense, and the cache has already been
//! invalidated where the classification demands it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{Resolution, ResolutionCache};
use crate::codec::WireCodec;
use crate::envelope::{DeliveryFault, Envelope, Message, MessageAttributes, Reply};
use crate::errors::{ForwardError, ForwardResult, TransportFailure};
use crate::resolver::Resolver;
use crate::transport::TransportBackend;
use crate::types::PeerAddress;

// ----------------------------------------------------------------------------
// Outcome Classification
// ----------------------------------------------------------------------------

/// Classification of one completed invocation attempt.
///
/// Every attempt produces exactly one of these; none is ever silently
/// dropped. Reply bytes that fail to decode are a transport failure, not an
/// absent result.
#[derive(Debug)]
pub enum Outcome {
    /// The reply decoded to a delivery receipt.
    Delivered(MessageAttributes),
    /// The remote explicitly reported the target is not hosted there.
    Misdelivered,
    /// The remote delivery sink failed with a non-retryable error.
    ApplicationFailure(DeliveryFault),
    /// The exchange itself failed (connection, timeout, malformed reply).
    TransportFailure(TransportFailure),
}

impl Outcome {
    /// Classify the raw result of a backend invocation.
    pub fn classify(exchange: Result<Vec<u8>, TransportFailure>, codec: &WireCodec) -> Self {
        match exchange {
            Err(failure) => Outcome::TransportFailure(failure),
            Ok(raw) => match codec.decode_reply(&raw) {
                Ok(Reply::Delivered(attributes)) => Outcome::Delivered(attributes),
                Ok(Reply::Misdelivered) => Outcome::Misdelivered,
                Ok(Reply::Failure(fault)) => Outcome::ApplicationFailure(fault),
                Err(err) => {
                    Outcome::TransportFailure(TransportFailure::MalformedReply(err.to_string()))
                }
            },
        }
    }

    /// Whether this outcome leaves the cached handle suspect.
    ///
    /// Misdelivery means the handle points at the wrong host; a transport
    /// failure means it is presumed stale or unreachable. An application
    /// fault says nothing about the handle, which stays cached.
    pub fn invalidates_handle(&self) -> bool {
        matches!(self, Outcome::Misdelivered | Outcome::TransportFailure(_))
    }
}

// ----------------------------------------------------------------------------
// Forwarding Link
// ----------------------------------------------------------------------------

/// Public entry point for forwarding messages over one transport backend.
pub struct ForwardingLink<B: TransportBackend> {
    local: PeerAddress,
    codec: WireCodec,
    backend: Arc<B>,
    cache: ResolutionCache<B>,
}

impl<B: TransportBackend> ForwardingLink<B> {
    /// Create a link for the given local peer over `backend`, resolving
    /// destinations through `resolver`.
    pub fn new(
        local: PeerAddress,
        backend: Arc<B>,
        resolver: Arc<dyn Resolver>,
        codec: WireCodec,
    ) -> Self {
        let cache = ResolutionCache::new(backend.clone(), resolver);
        Self {
            local,
            codec,
            backend,
            cache,
        }
    }

    /// Protocol tag of the underlying backend.
    pub fn protocol(&self) -> &'static str {
        self.backend.protocol()
    }

    /// Transport cost reported to the external route selector.
    pub fn cost(&self) -> u32 {
        self.backend.cost()
    }

    /// Invalidate the cached handle for a peer.
    pub async fn decache(&self, peer: &PeerAddress) {
        self.cache.decache(peer).await;
    }

    /// Forward one message to `target` and return the delivery receipt.
    ///
    /// One attempt per call. On [`ForwardError::ResolutionPending`] no
    /// invocation was made; the caller retries once resolution has had a
    /// chance to complete.
    pub async fn forward(
        &self,
        target: &PeerAddress,
        message: &Message,
    ) -> ForwardResult<MessageAttributes> {
        let handle = match self.cache.resolve(target).await {
            Resolution::Bound(handle) => handle,
            Resolution::Pending => {
                debug!(peer = %target, protocol = self.protocol(), "resolution pending");
                return Err(ForwardError::ResolutionPending(target.clone()));
            }
            Resolution::Unknown => {
                return Err(ForwardError::NameNotFound(target.clone()));
            }
        };

        let payload = self.codec.encode_message(message)?;
        let envelope = Envelope::request(message.id, self.local.clone(), target.clone(), payload);

        let exchange = self.backend.invoke(&handle, &envelope).await;
        let outcome = Outcome::classify(exchange, &self.codec);

        if outcome.invalidates_handle() {
            self.cache.decache(target).await;
        }

        match outcome {
            Outcome::Delivered(attributes) => {
                debug!(peer = %target, message = %message.id, "delivered");
                Ok(attributes)
            }
            Outcome::Misdelivered => {
                warn!(peer = %target, "target not hosted at resolved locator");
                Err(ForwardError::Misdelivered(target.clone()))
            }
            Outcome::ApplicationFailure(fault) => {
                debug!(peer = %target, fault = %fault, "remote delivery fault");
                Err(ForwardError::Application(fault))
            }
            Outcome::TransportFailure(failure) => {
                warn!(peer = %target, error = %failure, "transport exchange failed");
                Err(ForwardError::Transport(failure))
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;
    use crate::types::{Locator, MessageId};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Backend that replays a script of invocation results and records the
    /// envelopes it was asked to move.
    struct MockBackend {
        script: Mutex<VecDeque<Result<Vec<u8>, TransportFailure>>>,
        sent: Mutex<Vec<Envelope>>,
    }

    impl MockBackend {
        fn scripted(results: Vec<Result<Vec<u8>, TransportFailure>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(results.into()),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TransportBackend for MockBackend {
        type Handle = Locator;

        fn protocol(&self) -> &'static str {
            "mock"
        }

        fn cost(&self) -> u32 {
            10
        }

        fn bind(&self, locator: &Locator) -> Result<Locator, TransportFailure> {
            Ok(locator.clone())
        }

        async fn invoke(
            &self,
            _handle: &Locator,
            envelope: &Envelope,
        ) -> Result<Vec<u8>, TransportFailure> {
            self.sent.lock().await.push(envelope.clone());
            self.script
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| panic!("invoke called beyond script"))
        }
    }

    struct CountingResolver {
        inner: StaticResolver,
        calls: AtomicUsize,
    }

    impl CountingResolver {
        fn for_peer(peer: &PeerAddress) -> Arc<Self> {
            let mut inner = StaticResolver::new();
            inner.insert(peer.clone(), Locator::new("mock://remote"));
            Arc::new(Self {
                inner,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Resolver for CountingResolver {
        async fn lookup(&self, peer: &PeerAddress, protocol: &str) -> Option<Locator> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(peer, protocol).await
        }
    }

    fn local() -> PeerAddress {
        PeerAddress::new("alice@home")
    }

    fn remote() -> PeerAddress {
        PeerAddress::new("bob@work")
    }

    fn message() -> Message {
        Message::new(local(), "text/plain", b"payload".to_vec())
    }

    fn delivered_reply(codec: &WireCodec, id: MessageId) -> Vec<u8> {
        codec
            .encode_reply(&Reply::Delivered(MessageAttributes::receipt(id, remote())))
            .unwrap()
    }

    /// Retry through the initial resolution window.
    async fn forward_settled(
        link: &ForwardingLink<MockBackend>,
        target: &PeerAddress,
        message: &Message,
    ) -> ForwardResult<MessageAttributes> {
        for _ in 0..200 {
            match link.forward(target, message).await {
                Err(ForwardError::ResolutionPending(_)) => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                settled => return settled,
            }
        }
        panic!("forward never settled");
    }

    fn link_over(
        backend: Arc<MockBackend>,
        resolver: Arc<CountingResolver>,
    ) -> ForwardingLink<MockBackend> {
        ForwardingLink::new(local(), backend, resolver, WireCodec::new())
    }

    #[tokio::test]
    async fn test_delivered_returns_receipt() {
        let codec = WireCodec::new();
        let message = message();
        let backend = MockBackend::scripted(vec![Ok(delivered_reply(&codec, message.id))]);
        let resolver = CountingResolver::for_peer(&remote());
        let link = link_over(backend.clone(), resolver);

        let attributes = forward_settled(&link, &remote(), &message).await.unwrap();
        assert_eq!(attributes.message_id, message.id);
        assert_eq!(attributes.receiver, remote());

        // The envelope carried the encoded message between the right peers.
        let sent = backend.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].source, local());
        assert_eq!(sent[0].target, remote());
        assert_eq!(sent[0].id, message.id);
    }

    #[tokio::test]
    async fn test_misdelivered_discards_handle() {
        let codec = WireCodec::new();
        let message = message();
        let misdelivered = codec.encode_reply(&Reply::Misdelivered).unwrap();
        let backend = MockBackend::scripted(vec![
            Ok(misdelivered),
            Ok(delivered_reply(&codec, message.id)),
        ]);
        let resolver = CountingResolver::for_peer(&remote());
        let link = link_over(backend, resolver.clone());

        match forward_settled(&link, &remote(), &message).await {
            Err(ForwardError::Misdelivered(peer)) => assert_eq!(peer, remote()),
            other => panic!("expected misdelivery, got {other:?}"),
        }

        // Retry goes through a fresh resolution, not the stale handle.
        forward_settled(&link, &remote(), &message).await.unwrap();
        assert_eq!(resolver.calls(), 2);
    }

    #[tokio::test]
    async fn test_application_fault_keeps_handle() {
        let codec = WireCodec::new();
        let message = message();
        let fault = DeliveryFault::new("mailbox revoked");
        let failure = codec.encode_reply(&Reply::Failure(fault.clone())).unwrap();
        let backend = MockBackend::scripted(vec![
            Ok(failure),
            Ok(delivered_reply(&codec, message.id)),
        ]);
        let resolver = CountingResolver::for_peer(&remote());
        let link = link_over(backend, resolver.clone());

        match forward_settled(&link, &remote(), &message).await {
            Err(ForwardError::Application(decoded)) => assert_eq!(decoded, fault),
            other => panic!("expected application fault, got {other:?}"),
        }

        // Next attempt reuses the cached handle immediately: no pending
        // window, no second lookup.
        link.forward(&remote(), &message).await.unwrap();
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_discards_handle() {
        let codec = WireCodec::new();
        let message = message();
        let backend = MockBackend::scripted(vec![
            Err(TransportFailure::connection_failed("mock://remote", "refused")),
            Ok(delivered_reply(&codec, message.id)),
        ]);
        let resolver = CountingResolver::for_peer(&remote());
        let link = link_over(backend, resolver.clone());

        match forward_settled(&link, &remote(), &message).await {
            Err(ForwardError::Transport(TransportFailure::ConnectionFailed { .. })) => {}
            other => panic!("expected transport failure, got {other:?}"),
        }

        forward_settled(&link, &remote(), &message).await.unwrap();
        assert_eq!(resolver.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_transport_failure() {
        let message = message();
        let backend = MockBackend::scripted(vec![Ok(b"not a reply".to_vec())]);
        let resolver = CountingResolver::for_peer(&remote());
        let link = link_over(backend, resolver);

        match forward_settled(&link, &remote(), &message).await {
            Err(ForwardError::Transport(TransportFailure::MalformedReply(_))) => {}
            other => panic!("expected malformed-reply failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unresolvable_peer_is_name_not_found() {
        let backend = MockBackend::scripted(vec![]);
        // Resolver knows a different peer only.
        let resolver = CountingResolver::for_peer(&PeerAddress::new("someone@else"));
        let link = link_over(backend, resolver);

        match forward_settled(&link, &remote(), &message()).await {
            Err(ForwardError::NameNotFound(peer)) => assert_eq!(peer, remote()),
            other => panic!("expected name-not-found, got {other:?}"),
        }
    }
}
