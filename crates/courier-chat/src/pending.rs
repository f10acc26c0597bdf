//! Pending-reply correlation
//!
//! Each in-flight invocation parks a oneshot sender here, keyed by its
//! request envelope id. The inbound listener completes the slot when the
//! correlated reply arrives; the invoking side abandons it when the
//! expiration window closes.

use std::collections::HashMap;

use courier_core::MessageId;
use tokio::sync::{oneshot, Mutex};

// ----------------------------------------------------------------------------
// Pending Replies
// ----------------------------------------------------------------------------

/// Table of requests awaiting an out-of-band reply.
#[derive(Default)]
pub struct PendingReplies {
    slots: Mutex<HashMap<MessageId, oneshot::Sender<Vec<u8>>>>,
}

impl PendingReplies {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending request and get the completion channel.
    pub async fn register(&self, id: MessageId) -> oneshot::Receiver<Vec<u8>> {
        let (sender, receiver) = oneshot::channel();
        self.slots.lock().await.insert(id, sender);
        receiver
    }

    /// Complete a pending request with the reply payload. Returns false
    /// when no such request is pending (expired or never sent from here).
    pub async fn complete(&self, id: &MessageId, payload: Vec<u8>) -> bool {
        match self.slots.lock().await.remove(id) {
            Some(sender) => sender.send(payload).is_ok(),
            None => false,
        }
    }

    /// Drop a pending request without completing it.
    pub async fn abandon(&self, id: &MessageId) {
        self.slots.lock().await.remove(id);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
