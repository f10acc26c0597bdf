//! Per-peer resolution cache
//!
//! One [`CacheEntry`] per peer address, each behind its own narrow lock, in
//! a single-owner table. `resolve` never blocks on the directory: either a
//! bound handle is already cached, or a lookup is in flight, or one is
//! started now — in both of the latter cases the caller gets
//! [`Resolution::Pending`] back immediately. Lookups are deduplicated: at
//! most one outstanding directory call per peer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::resolver::Resolver;
use crate::transport::TransportBackend;
use crate::types::{Locator, PeerAddress};

// ----------------------------------------------------------------------------
// Resolution Result
// ----------------------------------------------------------------------------

/// What the cache knows about a peer right now.
#[derive(Debug)]
pub enum Resolution<H> {
    /// A live handle, bound from the most recently resolved locator.
    Bound(Arc<H>),
    /// A directory lookup is in flight; try again later.
    Pending,
    /// The last completed lookup found no usable locator. Permanent until
    /// the entry is decached.
    Unknown,
}

// ----------------------------------------------------------------------------
// Cache Entry
// ----------------------------------------------------------------------------

/// Per-peer resolution state.
///
/// Invariants: `lookup_pending` implies `handle` is absent; a present
/// `handle` was bound from `last_locator`; at most one lookup task exists
/// per entry at any time.
#[derive(Debug)]
struct CacheEntry<H> {
    handle: Option<Arc<H>>,
    lookup_pending: bool,
    last_locator: Option<Locator>,
    /// Whether a lookup has completed since the entry was (de)cached.
    resolved: bool,
}

impl<H> Default for CacheEntry<H> {
    fn default() -> Self {
        Self {
            handle: None,
            lookup_pending: false,
            last_locator: None,
            resolved: false,
        }
    }
}

// ----------------------------------------------------------------------------
// Resolution Cache
// ----------------------------------------------------------------------------

/// Table of per-peer resolution state for one transport backend.
pub struct ResolutionCache<B: TransportBackend> {
    backend: Arc<B>,
    resolver: Arc<dyn Resolver>,
    entries: Mutex<HashMap<PeerAddress, Arc<Mutex<CacheEntry<B::Handle>>>>>,
}

impl<B: TransportBackend> ResolutionCache<B> {
    /// Create an empty cache over the given backend and directory.
    pub fn new(backend: Arc<B>, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            backend,
            resolver,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the current handle for a peer, starting an asynchronous
    /// directory lookup if none is cached and none is in flight.
    pub async fn resolve(&self, peer: &PeerAddress) -> Resolution<B::Handle> {
        let entry = self.entry(peer).await;
        let mut state = entry.lock().await;

        if let Some(handle) = &state.handle {
            return Resolution::Bound(handle.clone());
        }
        if state.lookup_pending {
            return Resolution::Pending;
        }
        if state.resolved {
            return Resolution::Unknown;
        }

        state.lookup_pending = true;
        drop(state);

        self.spawn_lookup(peer.clone(), entry);
        Resolution::Pending
    }

    /// Invalidate the cached handle for a peer.
    ///
    /// If a lookup is in flight it is left to complete: the pending flag
    /// stays set so the in-flight completion is not orphaned, and the entry
    /// will reflect its result. Otherwise the remembered locator is cleared
    /// too, so the next `resolve` issues a fresh lookup instead of
    /// rebuilding from a stale locator.
    pub async fn decache(&self, peer: &PeerAddress) {
        let entry = { self.entries.lock().await.get(peer).cloned() };
        let Some(entry) = entry else {
            return;
        };

        let mut state = entry.lock().await;
        state.handle = None;
        if !state.lookup_pending {
            state.last_locator = None;
            state.resolved = false;
        }
        debug!(peer = %peer, "decached transport handle");
    }

    async fn entry(&self, peer: &PeerAddress) -> Arc<Mutex<CacheEntry<B::Handle>>> {
        let mut entries = self.entries.lock().await;
        entries.entry(peer.clone()).or_default().clone()
    }

    /// Run the directory lookup off the caller's task and complete the
    /// entry exactly once.
    fn spawn_lookup(&self, peer: PeerAddress, entry: Arc<Mutex<CacheEntry<B::Handle>>>) {
        let resolver = self.resolver.clone();
        let backend = self.backend.clone();

        tokio::spawn(async move {
            let located = resolver.lookup(&peer, backend.protocol()).await;

            let mut state = entry.lock().await;
            state.lookup_pending = false;
            state.resolved = true;

            match located {
                Some(locator) => match backend.bind(&locator) {
                    Ok(handle) => {
                        debug!(peer = %peer, locator = %locator, "bound transport handle");
                        state.handle = Some(Arc::new(handle));
                        state.last_locator = Some(locator);
                    }
                    Err(err) => {
                        warn!(peer = %peer, locator = %locator, error = %err, "binding resolved locator failed");
                        state.handle = None;
                        state.last_locator = None;
                    }
                },
                None => {
                    debug!(peer = %peer, protocol = backend.protocol(), "directory has no locator");
                    state.handle = None;
                    state.last_locator = None;
                }
            }
        });
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
