//! Swap request validation
//!
//! Collects every applicable failure rather than stopping at the first,
//! so the presentation layer can show the complete list at once.

use crate::{parse_amount, Token};
use serde::{Deserialize, Serialize};

/// Outcome of validating a swap request before a confirmation window opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapValidation {
    pub errors: Vec<String>,
}

impl SwapValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a candidate swap.
pub fn validate_swap(
    from: Option<&Token>,
    to: Option<&Token>,
    amount: &str,
) -> SwapValidation {
    let mut errors = Vec::new();

    // 1. Both sides of the pair must be selected
    if from.is_none() {
        errors.push("Please select a token to swap from".to_string());
    }
    if to.is_none() {
        errors.push("Please select a token to swap to".to_string());
    }

    // 2. Amount must be a positive decimal
    if amount.trim().is_empty() {
        errors.push("Please enter an amount".to_string());
    } else {
        match parse_amount(amount) {
            Some(value) if value > 0.0 => {}
            _ => errors.push("Please enter a valid positive number".to_string()),
        }
    }

    // 3. The pair must differ
    if let (Some(from), Some(to)) = (from, to) {
        if from.currency == to.currency {
            errors.push("Cannot swap the same currency".to_string());
        }
    }

    SwapValidation { errors }
}
