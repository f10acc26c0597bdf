//! Configuration for the chat transport

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Chat Configuration
// ----------------------------------------------------------------------------

/// Configuration for the store-and-forward chat transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Expiration window for a pending reply. When it closes without a
    /// correlated inbound message, the invocation fails with a timeout.
    pub reply_timeout: Duration,
    /// Cost reported to the external route selector.
    pub cost: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(30),
            cost: 100,
        }
    }
}
