//! Servant-side broker endpoint
//!
//! Accepts framed connections and dispatches request frames to the
//! receiver registered under the requested object key. Connections are
//! handled on their own tasks; a connection may carry any number of
//! exchanges before the client closes it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use courier_core::Receiver;

use crate::backend::BrokerConfig;
use crate::error::BrokerError;
use crate::frame::{read_frame, write_frame, BrokerFrame};

// ----------------------------------------------------------------------------
// Broker Server
// ----------------------------------------------------------------------------

/// Accept loop dispatching broker requests to registered receivers.
pub struct BrokerServer {
    servants: HashMap<String, Receiver>,
    config: BrokerConfig,
}

impl BrokerServer {
    /// Create a server with no registered servants.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            servants: HashMap::new(),
            config,
        }
    }

    /// Register a receiver under an object key.
    pub fn register<T: Into<String>>(&mut self, key: T, receiver: Receiver) {
        self.servants.insert(key.into(), receiver);
    }

    /// Serve connections from `listener` until the task is cancelled.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "broker server listening");
        }
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(%addr, "broker connection accepted");
                    let server = self.clone();
                    tokio::spawn(async move {
                        server.handle_connection(stream).await;
                    });
                }
                Err(err) => {
                    warn!(error = %err, "broker accept failed");
                }
            }
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) {
        loop {
            let frame = match read_frame(&mut stream, self.config.max_frame).await {
                Ok(frame) => frame,
                Err(BrokerError::ConnectionClosed) => break,
                Err(err) => {
                    debug!(error = %err, "dropping broker connection");
                    break;
                }
            };

            let response = match frame {
                BrokerFrame::Request { key, envelope } => match self.servants.get(&key) {
                    Some(receiver) => BrokerFrame::Reply {
                        payload: receiver.on_request(&envelope).await,
                    },
                    None => {
                        warn!(key = %key, "request for unregistered object key");
                        BrokerFrame::NoSuchObject { key }
                    }
                },
                _ => BrokerFrame::Fault {
                    reason: "expected a request frame".to_string(),
                },
            };

            if let Err(err) = write_frame(&mut stream, &response, self.config.max_frame).await {
                debug!(error = %err, "failed to write broker response");
                break;
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
    use crate::backend::BrokerBackend;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::net::TcpListener;

    use courier_core::{
        DeliveryError, DeliverySink, ForwardError, ForwardingLink, Locator, Message,
        MessageAttributes, PeerAddress, StaticResolver, TransportFailure, WireCodec,
    };

    struct AcceptingSink {
        hosted: PeerAddress,
    }

    #[async_trait]
    impl DeliverySink for AcceptingSink {
        async fn deliver(
            &self,
            message: Message,
            target: &PeerAddress,
        ) -> Result<MessageAttributes, DeliveryError> {
            if *target != self.hosted {
                return Err(DeliveryError::UnknownTarget(target.clone()));
            }
            Ok(MessageAttributes::receipt(message.id, target.clone()))
        }
    }

    async fn spawn_server(key: &str, hosted: &PeerAddress) -> std::net::SocketAddr {
        let receiver = Receiver::new(
            WireCodec::new(),
            Arc::new(AcceptingSink {
                hosted: hosted.clone(),
            }),
        );
        let mut server = BrokerServer::new(BrokerConfig::default());
        server.register(key, receiver);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Arc::new(server).serve(listener));
        addr
    }

    fn link_to(addr: std::net::SocketAddr, key: &str, peer: &PeerAddress) -> ForwardingLink<BrokerBackend> {
        let mut resolver = StaticResolver::new();
        resolver.insert(
            peer.clone(),
            Locator::new(format!("broker://127.0.0.1:{}/{key}", addr.port())),
        );
        ForwardingLink::new(
            PeerAddress::new("alice@home"),
            Arc::new(BrokerBackend::default()),
            Arc::new(resolver),
            WireCodec::new(),
        )
    }

    async fn forward_settled(
        link: &ForwardingLink<BrokerBackend>,
        target: &PeerAddress,
        message: &Message,
    ) -> Result<MessageAttributes, ForwardError> {
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

    #[tokio::test]
    async fn test_loopback_round_trip() {
        let peer = PeerAddress::new("bob@work");
        let addr = spawn_server("acc", &peer).await;
        let link = link_to(addr, "acc", &peer);

        let message = Message::new(PeerAddress::new("alice@home"), "text/plain", b"hi".to_vec());
        let attributes = forward_settled(&link, &peer, &message).await.unwrap();
        assert_eq!(attributes.message_id, message.id);
        assert_eq!(attributes.receiver, peer);
    }

    #[tokio::test]
    async fn test_unregistered_key_is_transport_failure() {
        let peer = PeerAddress::new("bob@work");
        let addr = spawn_server("acc", &peer).await;
        // Locator names a key nobody registered.
        let link = link_to(addr, "missing", &peer);

        let message = Message::new(PeerAddress::new("alice@home"), "text/plain", b"hi".to_vec());
        match forward_settled(&link, &peer, &message).await {
            Err(ForwardError::Transport(TransportFailure::Protocol(reason))) => {
                assert!(reason.contains("missing"));
            }
            other => panic!("expected protocol failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let peer = PeerAddress::new("bob@work");
        // Bind a port and drop the listener so nothing is accepting.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let link = link_to(addr, "acc", &peer);
        let message = Message::new(PeerAddress::new("alice@home"), "text/plain", b"hi".to_vec());
        match forward_settled(&link, &peer, &message).await {
            Err(ForwardError::Transport(TransportFailure::ConnectionFailed { .. })) => {}
            other => panic!("expected connection failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_misdelivery_signal_crosses_the_broker() {
        // Server hosts a different peer than the one addressed.
        let hosted = PeerAddress::new("someone@else");
        let target = PeerAddress::new("bob@work");
        let addr = spawn_server("acc", &hosted).await;
        let link = link_to(addr, "acc", &target);

        let message = Message::new(PeerAddress::new("alice@home"), "text/plain", b"hi".to_vec());
        match forward_settled(&link, &target, &message).await {
            Err(ForwardError::Misdelivered(peer)) => assert_eq!(peer, target),
            other => panic!("expected misdelivery, got {other:?}"),
        }
    }
}
