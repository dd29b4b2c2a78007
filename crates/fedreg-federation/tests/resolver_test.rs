//! # Resolver Tests Against Mock Peers
//!
//! Exercises the federation resolver against wiremock peers: caching,
//! misrouting protection, retry bounds, circuit breaking, and batch
//! grouping — without requiring live peer instances.

use std::sync::Arc;
use std::time::Duration;

use fedreg_core::{CatalogRegistry, CatalogSnapshot, MintRequest, Urn, UrnPolicy};
use fedreg_federation::{
    BreakerState, FederationConfig, FederationError, FederationResolver, Resolution, RetryPolicy,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

fn resolver(peers: String) -> FederationResolver {
    resolver_with(FederationConfig {
        peers,
        timeout: Duration::from_millis(500),
        retry: fast_retry(),
        ..Default::default()
    })
}

fn resolver_with(config: FederationConfig) -> FederationResolver {
    FederationResolver::new(
        config,
        UrnPolicy::default(),
        Arc::new(CatalogRegistry::default()),
    )
    .expect("resolver build")
}

fn mint(jurisdiction: &str, local_reference: &str) -> String {
    Urn::generate(
        &MintRequest {
            jurisdiction,
            category: "bimschg",
            record_type: "anlage",
            local_reference,
            uuid: None,
            version: None,
        },
        &UrnPolicy::default(),
        &CatalogSnapshot::unrestricted(),
    )
    .expect("mint")
    .into_string()
}

fn manifest_body(urn: &str) -> serde_json::Value {
    serde_json::json!({
        "urn": urn,
        "type": "anlage",
        "label": "anlage (remote)",
    })
}

#[tokio::test]
async fn resolve_fetches_once_then_serves_from_cache() {
    let server = MockServer::start().await;
    let id = mint("by", "4711");

    Mock::given(method("GET"))
        .and(path("/resolve"))
        .and(query_param("urn", id.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body(&id)))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(format!("by={}", server.uri()));

    let first = resolver.resolve(&id).await.expect("first resolve");
    let Resolution::Resolved { manifest, cache_hit } = first else {
        panic!("expected a resolved manifest");
    };
    assert!(!cache_hit);
    assert_eq!(manifest.urn(), Some(id.as_str()));

    let second = resolver.resolve(&id).await.expect("second resolve");
    let Resolution::Resolved { cache_hit, .. } = second else {
        panic!("expected a resolved manifest");
    };
    assert!(cache_hit, "second resolve must not hit the peer");
}

#[tokio::test]
async fn invalidate_cache_forces_a_refetch() {
    let server = MockServer::start().await;
    let id = mint("by", "4712");

    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body(&id)))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = resolver(format!("by={}", server.uri()));
    resolver.resolve(&id).await.expect("first resolve");
    resolver.invalidate_cache();
    resolver.resolve(&id).await.expect("refetch");
}

#[tokio::test]
async fn mismatched_manifest_urn_is_rejected() {
    let server = MockServer::start().await;
    let id = mint("by", "4713");
    let other = mint("by", "9999");

    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body(&other)))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(format!("by={}", server.uri()));
    let err = resolver.resolve(&id).await.unwrap_err();
    assert!(matches!(
        err,
        FederationError::PeerMismatch { ref expected, ref found }
            if *expected == id && *found == other
    ));
}

#[tokio::test]
async fn error_status_is_not_retried() {
    let server = MockServer::start().await;
    let id = mint("by", "4714");

    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(format!("by={}", server.uri()));
    let err = resolver.resolve(&id).await.unwrap_err();
    assert!(matches!(
        err,
        FederationError::PeerUnreachable { ref reason, .. } if reason.contains("500")
    ));
}

#[tokio::test]
async fn unreachable_peer_is_a_soft_failure() {
    let resolver = resolver("by=http://127.0.0.1:1".to_string());
    let id = mint("by", "4715");
    let err = resolver.resolve(&id).await.unwrap_err();
    assert!(matches!(err, FederationError::PeerUnreachable { .. }));
}

#[tokio::test]
async fn unknown_jurisdiction_is_not_federated() {
    let resolver = resolver("by=http://127.0.0.1:1".to_string());
    let id = mint("nrw", "4716");
    match resolver.resolve(&id).await.expect("resolve") {
        Resolution::NotFederated => {}
        other => panic!("expected NotFederated, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_identifier_is_rejected_before_any_network() {
    let resolver = resolver("by=http://127.0.0.1:1".to_string());
    let err = resolver.resolve("urn:de:by:broken").await.unwrap_err();
    assert!(matches!(err, FederationError::InvalidUrn(_)));
}

#[tokio::test]
async fn breaker_opens_after_consecutive_failures_and_recovers() {
    let server = MockServer::start().await;
    let id = mint("by", "4717");

    // The peer fails twice, then recovers.
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body(&id)))
        .mount(&server)
        .await;

    let resolver = resolver_with(FederationConfig {
        peers: format!("by={}", server.uri()),
        timeout: Duration::from_millis(500),
        retry: RetryPolicy {
            max_attempts: 1,
            ..fast_retry()
        },
        breaker_threshold: 2,
        breaker_cooldown: Duration::from_millis(100),
        ..Default::default()
    });

    for _ in 0..2 {
        let err = resolver.resolve(&id).await.unwrap_err();
        assert!(matches!(err, FederationError::PeerUnreachable { .. }));
    }
    assert_eq!(resolver.breaker_state(), BreakerState::Open);

    // Within the cooldown: rejected without a network attempt.
    let err = resolver.resolve(&id).await.unwrap_err();
    assert!(matches!(err, FederationError::CircuitOpen));

    // After the cooldown the half-open trial goes through and closes the
    // breaker.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let resolved = resolver.resolve(&id).await.expect("trial resolve");
    assert!(matches!(
        resolved,
        Resolution::Resolved { cache_hit: false, .. }
    ));
    assert_eq!(resolver.breaker_state(), BreakerState::Closed);
}

#[tokio::test]
async fn batch_groups_by_jurisdiction_and_skips_unpeered_ones() {
    let server = MockServer::start().await;
    let by_a = mint("by", "100");
    let by_b = mint("by", "200");
    let nrw_a = mint("nrw", "300");
    let nrw_b = mint("nrw", "400");

    for id in [&by_a, &by_b] {
        Mock::given(method("GET"))
            .and(path("/resolve"))
            .and(query_param("urn", id.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body(id)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let resolver = resolver(format!("by={}", server.uri()));
    let ids = vec![
        by_a.clone(),
        nrw_a.clone(),
        by_b.clone(),
        nrw_b.clone(),
        "urn:de:hh:broken".to_string(),
    ];
    let results = resolver.resolve_batch(&ids).await;

    assert_eq!(results.len(), 5);
    assert_eq!(results[&by_a].as_ref().unwrap().urn(), Some(by_a.as_str()));
    assert_eq!(results[&by_b].as_ref().unwrap().urn(), Some(by_b.as_str()));
    // nrw has no peer: not found, and never attempted over the network.
    assert!(results[&nrw_a].is_none());
    assert!(results[&nrw_b].is_none());
    assert!(results["urn:de:hh:broken"].is_none());
}

#[tokio::test]
async fn batch_serves_cached_entries_without_refetching() {
    let server = MockServer::start().await;
    let id = mint("by", "500");

    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body(&id)))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(format!("by={}", server.uri()));
    resolver.resolve(&id).await.expect("warm the cache");

    let results = resolver.resolve_batch(std::slice::from_ref(&id)).await;
    assert_eq!(results[&id].as_ref().unwrap().urn(), Some(id.as_str()));
}
