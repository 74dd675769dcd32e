//! Swap session state and the derived output amount

use crate::Token;
use serde::{Deserialize, Serialize};

/// Transient state of one swap interaction.
///
/// `output_amount` is always a pure function of the current token prices and
/// `input_amount`; it is recomputed on every dependency change and never
/// cached across a price refresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapSession {
    /// Token being sold
    pub from_token: Option<Token>,
    /// Token being bought
    pub to_token: Option<Token>,
    /// User-entered amount, kept verbatim as a string
    pub input_amount: String,
    /// Derived converted amount, formatted to a fixed number of decimals
    pub output_amount: String,
}

impl SwapSession {
    /// Recompute the derived output from the current selections and input.
    pub fn recompute_output(&mut self, decimals: usize) {
        self.output_amount = derive_output(
            self.from_token.as_ref(),
            self.to_token.as_ref(),
            &self.input_amount,
            decimals,
        );
    }

    /// Whether a live conversion is on screen: both tokens selected and a
    /// positive input amount. This is the arming condition for auto-refresh.
    pub fn conversion_active(&self) -> bool {
        self.from_token.is_some()
            && self.to_token.is_some()
            && parse_amount(&self.input_amount).is_some_and(|v| v > 0.0)
    }

    /// Clear both amounts, as after a committed swap.
    pub fn clear_amounts(&mut self) {
        self.input_amount.clear();
        self.output_amount.clear();
    }
}

/// Parse a user-entered decimal amount. Returns `None` for empty,
/// unparseable, or non-finite input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Derive the output amount for a candidate conversion.
///
/// Empty string when either token is unset, the input is empty, or either
/// price is exactly zero (no rate available, not a division fault).
/// An unparseable non-empty input is treated as zero.
pub fn derive_output(
    from: Option<&Token>,
    to: Option<&Token>,
    amount: &str,
    decimals: usize,
) -> String {
    let (Some(from), Some(to)) = (from, to) else {
        return String::new();
    };
    if amount.trim().is_empty() {
        return String::new();
    }
    if from.price == 0.0 || to.price == 0.0 {
        return String::new();
    }

    let input = parse_amount(amount).unwrap_or(0.0);
    let converted = input * from.price / to.price;
    format!("{converted:.decimals$}")
}
