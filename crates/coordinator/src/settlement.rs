//! Settlement backend seam
//!
//! A confirmed swap is handed to a [`Settlement`] implementation. The
//! default stands in for a backend swap-execution call with a fixed delay.

use async_trait::async_trait;
use std::time::Duration;
use swap_models::SwapReceipt;

/// Backend that executes a confirmed swap.
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Settle the swap described by the receipt.
    async fn settle(&self, receipt: &SwapReceipt) -> anyhow::Result<()>;
}

/// Settlement stand-in: waits a fixed delay and succeeds.
pub struct SimulatedSettlement {
    delay: Duration,
}

impl SimulatedSettlement {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Settlement for SimulatedSettlement {
    async fn settle(&self, receipt: &SwapReceipt) -> anyhow::Result<()> {
        tracing::debug!(
            from = %receipt.from_currency,
            to = %receipt.to_currency,
            "settling swap"
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
