//! Transport backend contract
//!
//! A backend turns a resolved locator into a live, invocable handle and
//! performs one request/reply exchange with it. All backends are
//! substitutable behind [`crate::ForwardingLink`]; the only
//! backend-specific value the outside world sees is the integer cost an
//! external route selector consumes.

use async_trait::async_trait;

use crate::envelope::Envelope;
use crate::errors::TransportFailure;
use crate::types::Locator;

// ----------------------------------------------------------------------------
// Transport Backend Trait
// ----------------------------------------------------------------------------

/// One wire transport binding.
#[async_trait]
pub trait TransportBackend: Send + Sync + 'static {
    /// Live, invocable handle for one locator. Owned by the cache entry of
    /// exactly one peer.
    type Handle: Send + Sync + 'static;

    /// Protocol tag handed to the resolver (e.g. `"http"`).
    fn protocol(&self) -> &'static str;

    /// Relative cost of this transport, consumed by an external route
    /// selector. Lower is cheaper.
    fn cost(&self) -> u32;

    /// Construct a handle from a locator.
    ///
    /// Pure client-side construction: parsing and validation only, no I/O.
    fn bind(&self, locator: &Locator) -> Result<Self::Handle, TransportFailure>;

    /// Perform one request/reply exchange, returning the raw reply bytes.
    ///
    /// May suspend the calling task for the duration of the round trip.
    /// Connection errors, timeouts and malformed framing all surface as
    /// [`TransportFailure`]; what the bytes *mean* is the forwarding
    /// link's business.
    async fn invoke(
        &self,
        handle: &Self::Handle,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, TransportFailure>;
}
