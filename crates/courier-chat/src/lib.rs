//! Store-and-forward chat transport for the Courier message relay
//!
//! Connectionless: an invocation base64-encodes the envelope, sends it as
//! one text message to the chat handle derived from the locator, and
//! returns once the correlated reply arrives — or fails with a timeout
//! when the expiration window closes first. A single [`InboundListener`]
//! per backend instance decodes incoming texts, completes pending requests
//! and hands fresh requests to the local receiver. The chat-server session
//! itself (login, roster, reconnects) is an external collaborator behind
//! the [`ChatSession`] trait.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod backend;
pub mod config;
pub mod error;
pub mod listener;
pub mod pending;
pub mod session;


// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use backend::StoreForwardBackend;
pub use config::ChatConfig;
pub use error::ChatTransportError;
pub use listener::InboundListener;
pub use session::{ChatAddress, ChatSession, InboundText};
