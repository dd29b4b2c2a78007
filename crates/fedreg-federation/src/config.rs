//! # Federation Configuration
//!
//! Typed configuration for the resolver. The embedding service owns the
//! environment; it builds this struct and hands it over.

use std::time::Duration;

use crate::cache::CacheBackend;
use crate::retry::RetryPolicy;

/// Resolver configuration with the documented defaults.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    /// Peer directory input: `jurisdiction=baseURL` pairs, comma-separated.
    pub peers: String,
    /// Per-attempt HTTP timeout (default: 3s).
    pub timeout: Duration,
    /// TTL for cached manifests (default: 300s).
    pub cache_ttl: Duration,
    /// Retry policy for transient transport failures.
    pub retry: RetryPolicy,
    /// Consecutive failures before the circuit breaker opens (default: 5).
    pub breaker_threshold: u32,
    /// Breaker cooldown before the half-open trial (default: 60s).
    pub breaker_cooldown: Duration,
    /// Cache backend selection.
    pub cache_backend: CacheBackend,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            peers: String::new(),
            timeout: Duration::from_secs(3),
            cache_ttl: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            breaker_threshold: 5,
            breaker_cooldown: Duration::from_secs(60),
            cache_backend: CacheBackend::InMemory,
        }
    }
}
