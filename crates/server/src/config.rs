//! Server configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the API
    pub api_port: u16,
    /// Price source endpoint (must return a JSON array of token records)
    pub price_url: String,
    /// Per-request timeout for the price client, in milliseconds
    pub price_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            price_url: env::var("PRICE_URL")
                .unwrap_or_else(|_| "https://interview.switcheo.com/prices.json".to_string()),
            price_timeout_ms: env::var("PRICE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5_000),
        }
    }
}
