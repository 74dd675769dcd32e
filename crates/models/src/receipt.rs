//! Receipts for committed swaps
//!
//! A receipt records what was exchanged and at which rate once settlement
//! completes. Receipts live only for the session; there is no persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of one committed swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Unique receipt ID
    pub id: Uuid,
    /// Currency sold
    pub from_currency: String,
    /// Currency bought
    pub to_currency: String,
    /// Amount sold
    pub input_amount: f64,
    /// Amount bought, as derived at confirmation time
    pub output_amount: f64,
    /// Conversion rate applied (from-price / to-price)
    pub rate: f64,
    /// When settlement completed
    pub settled_at: DateTime<Utc>,
}

impl SwapReceipt {
    pub fn new(
        from_currency: impl Into<String>,
        to_currency: impl Into<String>,
        input_amount: f64,
        output_amount: f64,
        rate: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_currency: from_currency.into(),
            to_currency: to_currency.into(),
            input_amount,
            output_amount,
            rate,
            settled_at: Utc::now(),
        }
    }
}
