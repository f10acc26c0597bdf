//! Broker transport for the Courier message relay
//!
//! A synchronous request/reply exchange against a remote object broker:
//! length-prefixed frames over TCP, addressed to a servant by object key.
//! `bind` parses the broker reference string without touching the network;
//! `invoke` performs exactly one framed round trip. The servant side is a
//! [`BrokerServer`] that dispatches request frames to registered
//! [`courier_core::Receiver`]s.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod backend;
pub mod error;
pub mod frame;
pub mod reference;
pub mod server;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use backend::{BrokerBackend, BrokerConfig};
pub use error::BrokerError;
pub use frame::BrokerFrame;
pub use reference::BrokerRef;
pub use server::BrokerServer;
