//! # fedreg-federation — Cross-Jurisdiction URN Resolution
//!
//! Resolves identifiers that the local store does not know by querying the
//! peer instance responsible for the owning jurisdiction, under caching,
//! retry, and circuit-breaking policies.
//!
//! ## Resolution Path
//!
//! 1. TTL cache lookup — a fresh entry short-circuits everything.
//! 2. Parse the identifier (grammar + policy + catalog snapshot) to find
//!    the owning jurisdiction.
//! 3. Look up the jurisdiction's peer base URL; no peer means
//!    [`Resolution::NotFederated`], which is a signal, not an error.
//! 4. `GET <peer>/resolve?urn=<id>` with a per-attempt timeout, bounded
//!    retry on transient transport failures, and one shared circuit
//!    breaker guarding all peer traffic.
//! 5. A 200 response whose manifest echoes the requested `urn` is cached
//!    and returned; anything else is a soft failure the caller may answer
//!    with a synthesized minimal manifest.
//!
//! Failures here never crash a resolving request — the error taxonomy in
//! [`error::FederationError`] exists so the store gateway can fall back
//! deliberately.

pub mod breaker;
pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod peers;
pub mod resolver;
mod retry;

pub use breaker::{BreakerState, CircuitBreaker};
pub use cache::{CacheBackend, InMemoryCache, ManifestCache};
pub use config::FederationConfig;
pub use error::FederationError;
pub use manifest::Manifest;
pub use peers::PeerDirectory;
pub use resolver::{FederationResolver, Resolution};
pub use retry::RetryPolicy;
