//! # Federation Error Types
//!
//! Transient infrastructure failures are distinguished from client input
//! errors so the store gateway can fall back to a synthesized manifest on
//! the former and reject the request on the latter. None of these crash a
//! resolving request.

use thiserror::Error;

use fedreg_core::UrnError;

/// Failure of a federated resolution.
#[derive(Error, Debug)]
pub enum FederationError {
    /// The identifier was rejected before any network activity.
    #[error("identifier rejected before federation: {0}")]
    InvalidUrn(#[from] UrnError),

    /// Resolver construction failed.
    #[error("federation resolver configuration error: {reason}")]
    Configuration { reason: String },

    /// The circuit breaker is open; no network attempt was made.
    #[error("federation circuit breaker is open")]
    CircuitOpen,

    /// The peer could not be reached within the retry budget, or answered
    /// with an error status or an unusable body.
    #[error("peer for jurisdiction '{jurisdiction}' unreachable: {reason}")]
    PeerUnreachable { jurisdiction: String, reason: String },

    /// The peer answered, but for a different identifier — misrouting
    /// protection.
    #[error("peer returned manifest for '{found}', expected '{expected}'")]
    PeerMismatch { expected: String, found: String },
}
