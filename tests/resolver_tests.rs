//! Integration tests for the resolver chain over mocked providers.

use bchtip::{
    BitpayProvider, BitstampProvider, IndexApiProvider, IndexBackupProvider, MemoryCache,
    RateProvider, RateResolver, FALLBACK_RATE,
};
use mockito::Server;
use std::sync::Arc;

fn cache() -> Arc<MemoryCache> {
    Arc::new(MemoryCache::new())
}

/// A full default-shaped chain where every link points at a dead endpoint.
fn dead_chain(shared: Arc<MemoryCache>) -> Vec<Arc<dyn RateProvider>> {
    vec![
        Arc::new(IndexApiProvider::with_url(
            "http://127.0.0.1:1/api/v0/cash/pulse",
            shared.clone(),
        )),
        Arc::new(IndexBackupProvider::with_url(
            "http://127.0.0.1:1/api/v0/cash/price/usd/",
            shared.clone(),
        )),
        Arc::new(BitpayProvider::with_url(
            "http://127.0.0.1:1/special/rates.json",
            shared.clone(),
        )),
        Arc::new(BitstampProvider::with_url(
            "http://127.0.0.1:1/api/v2/ticker/bchusd/",
            shared,
        )),
    ]
}

#[test]
fn test_total_exhaustion_returns_sentinel() {
    let resolver = RateResolver::new(dead_chain(cache()));
    assert_eq!(resolver.avg_rate(), FALLBACK_RATE);
    assert_eq!(resolver.avg_rate(), 500);
}

#[test]
fn test_last_provider_standing_wins() {
    let mut server = Server::new();

    let bitstamp_mock = server
        .mock("GET", "/api/v2/ticker/bchusd/")
        .with_status(200)
        .with_body(r#"{"last": "427.50"}"#)
        .create();

    let shared = cache();
    let providers: Vec<Arc<dyn RateProvider>> = vec![
        Arc::new(IndexApiProvider::with_url(
            "http://127.0.0.1:1/api/v0/cash/pulse",
            shared.clone(),
        )),
        Arc::new(IndexBackupProvider::with_url(
            "http://127.0.0.1:1/api/v0/cash/price/usd/",
            shared.clone(),
        )),
        Arc::new(BitpayProvider::with_url(
            "http://127.0.0.1:1/special/rates.json",
            shared.clone(),
        )),
        Arc::new(BitstampProvider::with_url(
            format!("{}/api/v2/ticker/bchusd/", server.url()),
            shared,
        )),
    ];

    let resolver = RateResolver::new(providers);
    assert_eq!(resolver.avg_rate(), 427);
    bitstamp_mock.assert();
}

#[test]
fn test_primary_success_short_circuits() {
    let mut server = Server::new();

    let primary_mock = server
        .mock("GET", "/api/v0/cash/pulse")
        .with_status(200)
        .with_body(r#"{"price": 43199}"#)
        .expect(1)
        .create();

    let backup_mock = server
        .mock("GET", "/api/v0/cash/price/usd/")
        .with_status(200)
        .with_body(r#"{"price": 99999}"#)
        .expect(0)
        .create();

    let shared = cache();
    let providers: Vec<Arc<dyn RateProvider>> = vec![
        Arc::new(IndexApiProvider::with_url(
            format!("{}/api/v0/cash/pulse", server.url()),
            shared.clone(),
        )),
        Arc::new(IndexBackupProvider::with_url(
            format!("{}/api/v0/cash/price/usd/", server.url()),
            shared,
        )),
    ];

    let resolver = RateResolver::new(providers);
    assert_eq!(resolver.avg_rate(), 431);

    primary_mock.assert();
    backup_mock.assert();
}

#[test]
fn test_resolver_reuses_provider_cache() {
    let mut server = Server::new();

    let mock = server
        .mock("GET", "/api/v0/cash/pulse")
        .with_status(200)
        .with_body(r#"{"price": 43199}"#)
        .expect(1)
        .create();

    let shared = cache();
    let resolver = RateResolver::new(vec![Arc::new(IndexApiProvider::with_url(
        format!("{}/api/v0/cash/pulse", server.url()),
        shared,
    )) as Arc<dyn RateProvider>]);

    // Repeated resolutions within the TTL cost one outbound call
    assert_eq!(resolver.avg_rate(), 431);
    assert_eq!(resolver.avg_rate(), 431);
    assert_eq!(resolver.avg_rate(), 431);

    mock.assert();
}

#[test]
fn test_euro_rate_tracks_resolved_rate() {
    let mut server = Server::new();

    server
        .mock("GET", "/api/v0/cash/pulse")
        .with_status(200)
        .with_body(r#"{"price": 43199}"#)
        .create();

    let resolver = RateResolver::new(vec![Arc::new(IndexApiProvider::with_url(
        format!("{}/api/v0/cash/pulse", server.url()),
        cache(),
    )) as Arc<dyn RateProvider>]);

    // round(431 * 0.88) = 379
    assert_eq!(resolver.avg_rate_euro(), 379);
}

#[test]
fn test_euro_rate_under_total_exhaustion() {
    let resolver = RateResolver::new(dead_chain(cache()));
    // round(500 * 0.88) = 440
    assert_eq!(resolver.avg_rate_euro(), 440);
}
