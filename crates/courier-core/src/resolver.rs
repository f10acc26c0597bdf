//! Asynchronous name resolution
//!
//! The directory that maps logical peer addresses to transport locators is
//! an external collaborator. The core only needs one operation: an
//! asynchronous lookup that completes exactly once, with a locator or with
//! nothing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::{Locator, PeerAddress};

// ----------------------------------------------------------------------------
// Resolver Trait
// ----------------------------------------------------------------------------

/// Asynchronous peer-address directory.
#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Resolve `peer` to a locator for the given protocol.
    ///
    /// Completes exactly once; `None` means the directory has no entry for
    /// this peer and protocol.
    async fn lookup(&self, peer: &PeerAddress, protocol: &str) -> Option<Locator>;
}

// ----------------------------------------------------------------------------
// Static Resolver
// ----------------------------------------------------------------------------

/// Table-backed resolver for fixed topologies and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<PeerAddress, Locator>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locator for a peer.
    pub fn insert(&mut self, peer: PeerAddress, locator: Locator) {
        self.entries.insert(peer, locator);
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn lookup(&self, peer: &PeerAddress, _protocol: &str) -> Option<Locator> {
        self.entries.get(peer).cloned()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
