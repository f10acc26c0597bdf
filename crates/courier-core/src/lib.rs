//! Courier Core Forwarding Protocol
//!
//! This crate provides the transport-independent half of the Courier message
//! relay: logical peer addresses, the wire codec, the resolution cache that
//! turns a peer address into a live transport handle, the forwarding link
//! that performs one request/reply exchange and classifies its outcome, and
//! the servant-side receiver. Concrete transports (broker, HTTP,
//! store-and-forward chat) live in their own crates and plug in behind the
//! [`TransportBackend`] trait.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod cache;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod link;
pub mod receiver;
pub mod resolver;
pub mod transport;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use cache::{Resolution, ResolutionCache};
pub use codec::WireCodec;
pub use config::{CodecConfig, ProtocolTable};
pub use envelope::{DeliveryFault, Envelope, Message, MessageAttributes, Reply};
pub use errors::{
    DecodingError, DeliveryError, EncodingError, ForwardError, ForwardResult, TransportFailure,
};
pub use link::{ForwardingLink, Outcome};
pub use receiver::{DeliverySink, Receiver};
pub use resolver::{Resolver, StaticResolver};
pub use transport::TransportBackend;
pub use types::{Locator, MessageId, PeerAddress, Timestamp};
