//! HTTP transport for the Courier message relay
//!
//! One POST per invocation: the encoded envelope travels as the request
//! body, the raw reply bytes come back as the response body. Redirects are
//! never followed and caching is disabled; a missing port in the resolved
//! URL is filled from the explicit protocol table.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod backend;
pub mod error;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use backend::{HttpBackend, HttpConfig};
pub use error::HttpTransportError;
