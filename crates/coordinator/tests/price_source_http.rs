//! HTTP price source tests against the mock feed server
//!
//! These exercise the reqwest-backed client end to end: payload parsing,
//! the error-kind mapping, and dedup of a feed that emits duplicates.

use std::net::SocketAddr;
use std::sync::Arc;

use swap_coordinator::{CoordinatorConfig, HttpPriceSource, PriceSource, SwapCoordinator};
use swap_feeds::{spawn_feed, FeedConfig};
use swap_models::{PriceSourceError, SwapError};

fn test_config() -> CoordinatorConfig {
    CoordinatorConfig {
        refresh_interval_ms: 10_000,
        countdown_secs: 10,
        restart_delay_ms: 100,
        settlement_delay_ms: 10,
        output_decimals: 6,
    }
}

fn feed_url(addr: SocketAddr) -> String {
    format!("http://{addr}/prices")
}

#[tokio::test]
async fn test_fetch_good_catalog() {
    let (addr, _state, _server) = spawn_feed(FeedConfig::default()).await.unwrap();
    let source = HttpPriceSource::new(feed_url(addr));

    let records = source.fetch().await.expect("fetch should succeed");
    assert_eq!(records.len(), 4);
    assert!(records.iter().any(|r| r.currency == "BTC"));
}

#[tokio::test]
async fn test_server_error_maps_to_status_kind() {
    let (addr, _state, _server) = spawn_feed(FeedConfig::failing(500)).await.unwrap();
    let source = HttpPriceSource::new(feed_url(addr));

    let err = source.fetch().await.unwrap_err();
    assert_eq!(err, PriceSourceError::Server { status: 500 });
}

#[tokio::test]
async fn test_non_array_body_is_malformed_payload() {
    let (addr, _state, _server) = spawn_feed(FeedConfig::malformed()).await.unwrap();
    let source = HttpPriceSource::new(feed_url(addr));

    let err = source.fetch().await.unwrap_err();
    assert!(
        matches!(err, PriceSourceError::MalformedPayload { .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Bind a port, then drop the listener so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpPriceSource::new(feed_url(addr));
    let err = source.fetch().await.unwrap_err();
    assert!(
        matches!(err, PriceSourceError::Network { .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_duplicated_feed_dedups_through_coordinator() {
    let (addr, _state, _server) = spawn_feed(FeedConfig::duplicated()).await.unwrap();
    let coord = SwapCoordinator::new(
        Arc::new(HttpPriceSource::new(feed_url(addr))),
        test_config(),
    );
    coord.load_initial_prices().await;

    let snap = coord.snapshot().await;
    assert!(snap.error.is_none());
    assert_eq!(snap.tokens.len(), 4, "duplicates collapse per currency");

    // The duplicate record is older, so it wins the dedup
    let btc = snap.tokens.iter().find(|t| t.currency == "BTC").unwrap();
    assert!(
        (btc.price - 26002.82 * 1.02).abs() < 1e-6,
        "expected the earlier duplicate's price, got {}",
        btc.price
    );
}

#[tokio::test]
async fn test_refresh_failure_keeps_prior_tokens() {
    let (addr, state, _server) = spawn_feed(FeedConfig::default()).await.unwrap();
    let coord = SwapCoordinator::new(
        Arc::new(HttpPriceSource::new(feed_url(addr))),
        test_config(),
    );
    coord.load_initial_prices().await;
    assert_eq!(coord.snapshot().await.tokens.len(), 4);

    // Flip the live feed into failure: the refresh reports but keeps state
    state.set_config(FeedConfig::failing(503)).await;
    coord.refresh_prices().await;
    let snap = coord.snapshot().await;
    assert!(matches!(
        snap.error,
        Some(SwapError::PriceRefreshFailed {
            cause: PriceSourceError::Server { status: 503 }
        })
    ));
    assert_eq!(snap.tokens.len(), 4, "prior prices survive a failed refresh");

    // And a recovered feed clears the notice
    state.set_config(FeedConfig::default()).await;
    coord.refresh_prices().await;
    assert!(coord.snapshot().await.error.is_none());
}
