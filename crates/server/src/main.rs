//! Swap Session Server
//!
//! Main entry point for the swap session coordinator.
//!
//! This server:
//! - Loads token prices from the configured price endpoint at startup
//! - Exposes HTTP endpoints for driving one swap session
//! - Runs the auto-refresh and confirmation-countdown timers inside the
//!   coordinator it owns
//!
//! ## Usage
//!
//! ```bash
//! # Against the default price endpoint
//! cargo run --bin swap-server -- --port 3000
//!
//! # Against a local mock feed
//! cargo run --bin swap-server -- --port 3000 --price-url http://127.0.0.1:4100/prices
//! ```

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swap_coordinator::{CoordinatorConfig, HttpPriceSource, SwapCoordinator};

mod api_types;
mod config;

use api_types::{
    AmountRequest, ApiErrorNotice, ApiReceipt, ApiSessionState, SelectTokenRequest,
};
use config::ServerConfig;

/// CLI arguments
#[derive(Parser)]
#[command(name = "swap-server")]
#[command(about = "Swap session coordinator - currency swaps with live price refresh")]
struct CliArgs {
    /// Port for the HTTP API server (overrides env)
    #[arg(short, long)]
    port: Option<u16>,

    /// Price source URL (overrides env)
    #[arg(long)]
    price_url: Option<String>,
}

/// Application state shared across handlers
pub struct AppState {
    /// The one session this process drives
    pub coordinator: SwapCoordinator,
    /// Configuration
    pub config: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,swap_server=debug".into()),
        )
        .init();

    tracing::info!("Starting swap session server...");

    let args = CliArgs::parse();

    let mut config = ServerConfig::default();
    if let Some(port) = args.port {
        config.api_port = port;
    }
    if let Some(url) = args.price_url {
        config.price_url = url;
    }

    tracing::info!(
        "Configuration: port={}, price_url={}",
        config.api_port,
        config.price_url
    );

    let source = Arc::new(HttpPriceSource::with_timeout(
        config.price_url.clone(),
        Duration::from_millis(config.price_timeout_ms),
    ));
    let coordinator = SwapCoordinator::new(source, CoordinatorConfig::default());

    // Load the catalog once; the server starts either way and a failure is
    // visible in the session state
    coordinator.load_initial_prices().await;

    let state = Arc::new(AppState {
        coordinator,
        config: config.clone(),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/state", get(get_state))
        // Session operations
        .route("/session/from", post(select_from))
        .route("/session/to", post(select_to))
        .route("/session/amount", post(set_amount))
        .route("/session/swap", post(submit_swap))
        .route("/session/confirm", post(confirm_swap))
        .route("/session/cancel", post(cancel_swap))
        .route("/session/dismiss-error", post(dismiss_error))
        // Receipts
        .route("/receipts", get(get_receipts))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                - Health check");
    tracing::info!("  GET  /state                 - Session state snapshot");
    tracing::info!("  POST /session/from          - Select/clear the from-token");
    tracing::info!("  POST /session/to            - Select/clear the to-token");
    tracing::info!("  POST /session/amount        - Set the input amount");
    tracing::info!("  POST /session/swap          - Submit a swap for confirmation");
    tracing::info!("  POST /session/confirm       - Confirm the pending swap");
    tracing::info!("  POST /session/cancel        - Cancel the pending swap");
    tracing::info!("  POST /session/dismiss-error - Dismiss the error notice");
    tracing::info!("  GET  /receipts              - Committed swap receipts");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "price_url": state.config.price_url,
    }))
}

/// Full session state snapshot
async fn get_state(State(state): State<Arc<AppState>>) -> Json<ApiSessionState> {
    let snapshot = state.coordinator.snapshot().await;
    Json(ApiSessionState::from(&snapshot))
}

/// Select (or clear) the token to swap from
async fn select_from(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectTokenRequest>,
) -> Result<Json<ApiSessionState>, (StatusCode, String)> {
    match request.currency {
        Some(currency) => {
            if !state.coordinator.select_from(&currency).await {
                return Err((
                    StatusCode::NOT_FOUND,
                    format!("Unknown currency: {currency}"),
                ));
            }
        }
        None => state.coordinator.clear_from().await,
    }
    Ok(Json(ApiSessionState::from(
        &state.coordinator.snapshot().await,
    )))
}

/// Select (or clear) the token to swap to
async fn select_to(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectTokenRequest>,
) -> Result<Json<ApiSessionState>, (StatusCode, String)> {
    match request.currency {
        Some(currency) => {
            if !state.coordinator.select_to(&currency).await {
                return Err((
                    StatusCode::NOT_FOUND,
                    format!("Unknown currency: {currency}"),
                ));
            }
        }
        None => state.coordinator.clear_to().await,
    }
    Ok(Json(ApiSessionState::from(
        &state.coordinator.snapshot().await,
    )))
}

/// Set the input amount
async fn set_amount(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AmountRequest>,
) -> Json<ApiSessionState> {
    state.coordinator.set_input_amount(&request.amount).await;
    Json(ApiSessionState::from(&state.coordinator.snapshot().await))
}

/// Submit the swap: validation failures come back as 422 with the full
/// message list, success opens the confirmation countdown
async fn submit_swap(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiSessionState>, (StatusCode, Json<ApiErrorNotice>)> {
    match state.coordinator.submit_swap().await {
        Ok(()) => Ok(Json(ApiSessionState::from(
            &state.coordinator.snapshot().await,
        ))),
        Err(error) => {
            tracing::info!("swap rejected: {}", error);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiErrorNotice::from(&error)),
            ))
        }
    }
}

/// Confirm the pending swap
async fn confirm_swap(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiSessionState>, (StatusCode, String)> {
    if !state.coordinator.confirm().await {
        return Err((
            StatusCode::CONFLICT,
            "Confirmation is not available".to_string(),
        ));
    }
    Ok(Json(ApiSessionState::from(
        &state.coordinator.snapshot().await,
    )))
}

/// Cancel the pending swap
async fn cancel_swap(State(state): State<Arc<AppState>>) -> Json<ApiSessionState> {
    state.coordinator.cancel().await;
    Json(ApiSessionState::from(&state.coordinator.snapshot().await))
}

/// Dismiss the error notice
async fn dismiss_error(State(state): State<Arc<AppState>>) -> Json<ApiSessionState> {
    state.coordinator.dismiss_error().await;
    Json(ApiSessionState::from(&state.coordinator.snapshot().await))
}

/// Receipts of the swaps committed in this session
async fn get_receipts(State(state): State<Arc<AppState>>) -> Json<Vec<ApiReceipt>> {
    let receipts = state.coordinator.receipts().await;
    Json(receipts.iter().map(ApiReceipt::from).collect())
}
