//! Mock price-source server for the swap session coordinator
//!
//! Provides a controllable HTTP endpoint that simulates the token price
//! feed with configurable behavior (good, duplicated, stale, failing,
//! malformed payload).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// One catalog entry served by the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub currency: String,
    pub price: f64,
}

impl CatalogEntry {
    pub fn new(currency: &str, price: f64) -> Self {
        Self {
            currency: currency.to_string(),
            price,
        }
    }
}

/// Configuration for the mock feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base catalog: one record per currency
    pub catalog: Vec<CatalogEntry>,
    /// Emit a second record per currency with an earlier timestamp and a
    /// different price, to exercise deduplication
    pub duplicate_entries: bool,
    /// Shift record timestamps this many seconds into the past
    pub stale_seconds: i64,
    /// Respond with this HTTP status instead of a payload
    pub fail_status: Option<u16>,
    /// Respond with a non-array JSON body
    pub malformed: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            catalog: vec![
                CatalogEntry::new("BTC", 26002.82),
                CatalogEntry::new("ETH", 1645.93),
                CatalogEntry::new("USDC", 1.0),
                CatalogEntry::new("ATOM", 7.18),
            ],
            duplicate_entries: false,
            stale_seconds: 0,
            fail_status: None,
            malformed: false,
        }
    }
}

impl FeedConfig {
    /// A well-behaved feed serving the given catalog.
    pub fn good(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    /// A feed that duplicates every currency with divergent records.
    pub fn duplicated() -> Self {
        Self {
            duplicate_entries: true,
            ..Default::default()
        }
    }

    /// A feed that answers with an HTTP error status.
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Default::default()
        }
    }

    /// A feed that answers with a non-array body.
    pub fn malformed() -> Self {
        Self {
            malformed: true,
            ..Default::default()
        }
    }
}

/// State for the mock feed server
#[derive(Debug)]
pub struct FeedState {
    pub config: RwLock<FeedConfig>,
}

impl FeedState {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Swap the feed behavior on a live server.
    pub async fn set_config(&self, config: FeedConfig) {
        *self.config.write().await = config;
    }
}

/// Serve the current price catalog as a JSON array of token records.
pub async fn get_prices(State(state): State<Arc<FeedState>>) -> Response {
    let config = state.config.read().await;

    if let Some(status) = config.fail_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(serde_json::json!({ "error": "feed unavailable" })))
            .into_response();
    }

    if config.malformed {
        return Json(serde_json::json!({ "error": "unexpected shape" })).into_response();
    }

    let observed = Utc::now() - Duration::seconds(config.stale_seconds);
    let mut records = Vec::with_capacity(config.catalog.len() * 2);

    for entry in &config.catalog {
        records.push(serde_json::json!({
            "currency": entry.currency,
            "date": observed.to_rfc3339(),
            "price": entry.price,
        }));

        if config.duplicate_entries {
            // An earlier record with a different price: dedup must keep this one
            let earlier = observed - Duration::seconds(60);
            records.push(serde_json::json!({
                "currency": entry.currency,
                "date": earlier.to_rfc3339(),
                "price": entry.price * 1.02,
            }));
        }
    }

    Json(serde_json::Value::Array(records)).into_response()
}

/// Create a router for the feed
pub fn feed_router(state: Arc<FeedState>) -> Router {
    Router::new()
        .route("/prices", get(get_prices))
        .with_state(state)
}

/// Run the feed on a fixed port.
pub async fn run_feed(config: FeedConfig, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(FeedState::new(config));
    let router = feed_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Feed server listening on port {}", port);
    axum::serve(listener, router).await?;

    Ok(())
}

/// Spawn the feed on an ephemeral localhost port.
///
/// Returns the bound address, the shared state (so tests can flip the
/// config mid-run), and the server task handle.
pub async fn spawn_feed(
    config: FeedConfig,
) -> anyhow::Result<(SocketAddr, Arc<FeedState>, JoinHandle<()>)> {
    let state = Arc::new(FeedState::new(config));
    let router = feed_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Feed server error: {}", e);
        }
    });

    Ok((addr, state, handle))
}
