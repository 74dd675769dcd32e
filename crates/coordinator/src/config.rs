//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Timing and formatting knobs for a coordinator session.
///
/// Defaults come from the environment where set, otherwise from the stock
/// interaction timings: a 10 s price refresh, a 10 s confirmation countdown
/// with a 100 ms restart pause, and a 1.5 s simulated settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How often prices are re-fetched while a conversion is active (ms)
    pub refresh_interval_ms: u64,
    /// Where the confirmation countdown starts (seconds)
    pub countdown_secs: u32,
    /// Pause between the forced refresh and the countdown restart (ms)
    pub restart_delay_ms: u64,
    /// Artificial settlement delay for a confirmed swap (ms)
    pub settlement_delay_ms: u64,
    /// Decimal places for the derived output amount
    pub output_decimals: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: env::var("PRICE_REFRESH_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
            countdown_secs: env::var("COUNTDOWN_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            restart_delay_ms: env::var("COUNTDOWN_RESTART_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            settlement_delay_ms: env::var("SETTLEMENT_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_500),
            output_decimals: env::var("OUTPUT_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
        }
    }
}

impl CoordinatorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn settlement_delay(&self) -> Duration {
        Duration::from_millis(self.settlement_delay_ms)
    }
}
