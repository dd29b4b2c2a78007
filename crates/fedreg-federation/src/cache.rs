//! # TTL Manifest Cache
//!
//! Expiring key/value store for resolved manifests. The [`ManifestCache`]
//! trait is the seam between the resolver and the cache backend: the
//! in-memory implementation lives here, and a distributed backend (an
//! external collaborator) plugs in behind the same contract.
//!
//! Expiry is lazy: an expired entry is evicted by the `get` that finds it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::manifest::Manifest;

/// Cache backend selection, from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// Process-local map with per-entry TTL.
    #[default]
    InMemory,
}

/// Contract shared by all manifest cache backends.
pub trait ManifestCache: Send + Sync {
    /// The cached manifest for `key`, if present and unexpired.
    fn get(&self, key: &str) -> Option<Manifest>;
    /// Store `value` under `key`, expiring after `ttl`. Overwrites.
    fn set(&self, key: &str, value: Manifest, ttl: Duration);
    /// Evict one entry.
    fn delete(&self, key: &str);
    /// Evict everything. Called after catalog/config reloads so no stale
    /// cross-jurisdiction data survives a policy change.
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    expires_at: Instant,
    manifest: Manifest,
}

/// In-memory TTL cache.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManifestCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Manifest> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.manifest.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Manifest, ttl: Duration) {
        let entry = CacheEntry {
            expires_at: Instant::now() + ttl,
            manifest: value,
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}
