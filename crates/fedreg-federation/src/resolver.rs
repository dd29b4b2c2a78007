//! # Federation Resolver
//!
//! Resolves identifiers through the peer responsible for their owning
//! jurisdiction. See the crate docs for the full resolution path.
//!
//! The resolver is cheap to clone: the HTTP client, cache, breaker, and
//! catalog registry are all shared handles, which is what lets batch
//! resolution fan out one task per jurisdiction over the same state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use fedreg_core::{CatalogRegistry, Urn, UrnPolicy};

use crate::breaker::{BreakerState, CircuitBreaker};
use crate::cache::{CacheBackend, InMemoryCache, ManifestCache};
use crate::config::FederationConfig;
use crate::error::FederationError;
use crate::manifest::Manifest;
use crate::peers::PeerDirectory;
use crate::retry::{retry_send, RetryPolicy};

/// Outcome of a single resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A manifest was found, locally cached or fetched from the peer.
    Resolved { manifest: Manifest, cache_hit: bool },
    /// No peer is configured for the owning jurisdiction. Not an error:
    /// the caller falls back to local synthesis.
    NotFederated,
}

/// Resolver for identifiers owned by remote jurisdictions.
///
/// One circuit breaker guards all peer traffic of a resolver, so an
/// outage at one peer backs off calls toward all of them — matching the
/// deployed behavior this replaces. An embedder wanting per-peer
/// isolation can run one resolver per peer subset.
#[derive(Clone)]
pub struct FederationResolver {
    client: reqwest::Client,
    peers: PeerDirectory,
    cache: Arc<dyn ManifestCache>,
    breaker: Arc<CircuitBreaker>,
    policy: UrnPolicy,
    registry: Arc<CatalogRegistry>,
    cache_ttl: Duration,
    retry: RetryPolicy,
}

impl FederationResolver {
    /// Build a resolver from configuration, the instance identifier
    /// policy, and the shared catalog registry.
    ///
    /// # Errors
    ///
    /// [`FederationError::Configuration`] if the HTTP client cannot be
    /// built.
    pub fn new(
        config: FederationConfig,
        policy: UrnPolicy,
        registry: Arc<CatalogRegistry>,
    ) -> Result<Self, FederationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FederationError::Configuration {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        let cache: Arc<dyn ManifestCache> = match config.cache_backend {
            CacheBackend::InMemory => Arc::new(InMemoryCache::new()),
        };
        Ok(Self {
            client,
            peers: PeerDirectory::from_csv(&config.peers),
            cache,
            breaker: Arc::new(CircuitBreaker::new(
                config.breaker_threshold,
                config.breaker_cooldown,
            )),
            policy,
            registry,
            cache_ttl: config.cache_ttl,
            retry: config.retry,
        })
    }

    /// Resolve one identifier.
    ///
    /// # Errors
    ///
    /// [`FederationError::InvalidUrn`] for identifiers the grammar,
    /// policy, or catalog rejects; [`FederationError::CircuitOpen`],
    /// [`FederationError::PeerUnreachable`], and
    /// [`FederationError::PeerMismatch`] are soft failures the caller may
    /// answer with [`Manifest::synthesize`].
    pub async fn resolve(&self, id: &str) -> Result<Resolution, FederationError> {
        if let Some(manifest) = self.cache.get(id) {
            tracing::debug!(urn = id, "federation cache hit");
            return Ok(Resolution::Resolved {
                manifest,
                cache_hit: true,
            });
        }

        let snapshot = self.registry.snapshot();
        let urn = Urn::parse(id, &self.policy, &snapshot)?;
        let jurisdiction = urn.components().jurisdiction.as_str();

        let Some(base) = self.peers.base_url(jurisdiction) else {
            tracing::debug!(urn = id, jurisdiction, "no peer configured");
            return Ok(Resolution::NotFederated);
        };

        if !self.breaker.try_acquire() {
            return Err(FederationError::CircuitOpen);
        }

        match self.fetch(base, id, jurisdiction).await {
            Ok(manifest) => {
                self.breaker.record_success();
                self.cache.set(id, manifest.clone(), self.cache_ttl);
                tracing::info!(urn = id, jurisdiction, "resolved via peer");
                Ok(Resolution::Resolved {
                    manifest,
                    cache_hit: false,
                })
            }
            Err(e) => {
                self.breaker.record_failure();
                tracing::warn!(urn = id, jurisdiction, error = %e, "peer resolution failed");
                Err(e)
            }
        }
    }

    /// Resolve a batch of identifiers. `None` = not found (no peer,
    /// unparsable id, or soft failure) — batch flows never error.
    ///
    /// Cache hits are satisfied first; the rest are grouped by owning
    /// jurisdiction and fanned out one task per jurisdiction, each worker
    /// writing disjoint result keys. The breaker is shared across groups.
    pub async fn resolve_batch(&self, ids: &[String]) -> HashMap<String, Option<Manifest>> {
        let mut results: HashMap<String, Option<Manifest>> = HashMap::with_capacity(ids.len());
        let mut pending: HashMap<String, Vec<String>> = HashMap::new();
        let snapshot = self.registry.snapshot();

        for id in ids {
            if results.contains_key(id) || pending.values().any(|g| g.contains(id)) {
                continue;
            }
            if let Some(manifest) = self.cache.get(id) {
                results.insert(id.clone(), Some(manifest));
                continue;
            }
            match Urn::parse(id, &self.policy, &snapshot) {
                Ok(urn) => {
                    let jurisdiction = urn.components().jurisdiction.clone();
                    if self.peers.base_url(&jurisdiction).is_some() {
                        pending.entry(jurisdiction).or_default().push(id.clone());
                    } else {
                        results.insert(id.clone(), None);
                    }
                }
                Err(e) => {
                    tracing::warn!(urn = %id, error = %e, "unresolvable identifier in batch");
                    results.insert(id.clone(), None);
                }
            }
        }

        let mut workers = JoinSet::new();
        for (jurisdiction, group) in pending {
            let resolver = self.clone();
            workers.spawn(async move {
                let mut out = Vec::with_capacity(group.len());
                for id in group {
                    let resolved = match resolver.resolve(&id).await {
                        Ok(Resolution::Resolved { manifest, .. }) => Some(manifest),
                        Ok(Resolution::NotFederated) => None,
                        Err(e) => {
                            tracing::warn!(
                                urn = %id,
                                jurisdiction = %jurisdiction,
                                error = %e,
                                "batch peer resolution failed"
                            );
                            None
                        }
                    };
                    out.push((id, resolved));
                }
                out
            });
        }
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(pairs) => {
                    for (id, manifest) in pairs {
                        results.insert(id, manifest);
                    }
                }
                Err(e) => tracing::error!(error = %e, "batch resolution worker failed"),
            }
        }
        results
    }

    /// Drop all cached manifests. Called after a catalog or configuration
    /// reload so no stale cross-jurisdiction data outlives a policy
    /// change.
    pub fn invalidate_cache(&self) {
        self.cache.clear();
        tracing::info!("federation cache invalidated");
    }

    /// Current circuit breaker state, for observability.
    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }

    async fn fetch(
        &self,
        base: &str,
        id: &str,
        jurisdiction: &str,
    ) -> Result<Manifest, FederationError> {
        let url = format!("{base}/resolve");
        let resp = retry_send(&self.retry, || {
            self.client.get(&url).query(&[("urn", id)]).send()
        })
        .await
        .map_err(|e| FederationError::PeerUnreachable {
            jurisdiction: jurisdiction.to_string(),
            reason: e.to_string(),
        })?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(FederationError::PeerUnreachable {
                jurisdiction: jurisdiction.to_string(),
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let manifest: Manifest =
            resp.json()
                .await
                .map_err(|e| FederationError::PeerUnreachable {
                    jurisdiction: jurisdiction.to_string(),
                    reason: format!("unreadable manifest body: {e}"),
                })?;

        match manifest.urn() {
            Some(urn) if urn == id => Ok(manifest),
            other => Err(FederationError::PeerMismatch {
                expected: id.to_string(),
                found: other.unwrap_or_default().to_string(),
            }),
        }
    }
}
