//! Flattened API response types for frontend consumption
//!
//! These transform the internal session models into flat JSON shapes that
//! are easy for a presentation layer to render directly.

use serde::{Deserialize, Serialize};
use swap_coordinator::SessionSnapshot;
use swap_models::{ConfirmPhase, ConfirmationWindow, SwapError, SwapReceipt, Token};

// ============================================================================
// Response types
// ============================================================================

/// Flattened token for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    /// Currency symbol (e.g., "ETH")
    pub currency: String,
    /// Price in the feed's quote currency
    pub price: f64,
    /// Observation time as unix timestamp (seconds)
    pub updated_at: i64,
}

impl From<&Token> for ApiToken {
    fn from(token: &Token) -> Self {
        Self {
            currency: token.currency.clone(),
            price: token.price,
            updated_at: token.updated_at.timestamp(),
        }
    }
}

/// Flattened confirmation window state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfirmation {
    /// Phase: "idle", "counting_down", "refreshing_before_restart", "closed"
    pub phase: String,
    /// Seconds left before the forced price refresh
    pub seconds_remaining: u32,
    /// Whether the confirm action is currently rejected
    pub confirm_disabled: bool,
}

impl From<&ConfirmationWindow> for ApiConfirmation {
    fn from(window: &ConfirmationWindow) -> Self {
        let phase = match window.phase {
            ConfirmPhase::Idle => "idle",
            ConfirmPhase::CountingDown => "counting_down",
            ConfirmPhase::RefreshingBeforeRestart => "refreshing_before_restart",
            ConfirmPhase::Closed => "closed",
        };
        Self {
            phase: phase.to_string(),
            seconds_remaining: window.seconds_remaining,
            confirm_disabled: window.confirm_disabled,
        }
    }
}

/// Error notice as rendered by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorNotice {
    /// Machine-readable code (e.g., "PRICE_REFRESH_FAILED")
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl From<&SwapError> for ApiErrorNotice {
    fn from(error: &SwapError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Full session state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSessionState {
    pub tokens: Vec<ApiToken>,
    pub from_token: Option<ApiToken>,
    pub to_token: Option<ApiToken>,
    pub input_amount: String,
    pub output_amount: String,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<ApiErrorNotice>,
    pub confirmation: ApiConfirmation,
}

impl From<&SessionSnapshot> for ApiSessionState {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            tokens: snapshot.tokens.iter().map(ApiToken::from).collect(),
            from_token: snapshot.from_token.as_ref().map(ApiToken::from),
            to_token: snapshot.to_token.as_ref().map(ApiToken::from),
            input_amount: snapshot.input_amount.clone(),
            output_amount: snapshot.output_amount.clone(),
            loading: snapshot.loading,
            refreshing: snapshot.refreshing,
            error: snapshot.error.as_ref().map(ApiErrorNotice::from),
            confirmation: ApiConfirmation::from(&snapshot.confirmation),
        }
    }
}

/// Flattened receipt of a committed swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiReceipt {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub input_amount: f64,
    pub output_amount: f64,
    pub rate: f64,
    /// Settlement time as unix timestamp (seconds)
    pub settled_at: i64,
}

impl From<&SwapReceipt> for ApiReceipt {
    fn from(receipt: &SwapReceipt) -> Self {
        Self {
            id: receipt.id.to_string(),
            from_currency: receipt.from_currency.clone(),
            to_currency: receipt.to_currency.clone(),
            input_amount: receipt.input_amount,
            output_amount: receipt.output_amount,
            rate: receipt.rate,
            settled_at: receipt.settled_at.timestamp(),
        }
    }
}

// ============================================================================
// Request types
// ============================================================================

/// Select (or clear, with null) one side of the pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTokenRequest {
    pub currency: Option<String>,
}

/// Set the input amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}
