//! Error taxonomy for the swap session
//!
//! Price source failures are distinguished by kind but handled identically
//! by the coordinator: record the error, keep prior state. Session errors
//! are what the presentation layer renders as a dismissible notice.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure modes of the external price source.
///
/// Each maps to a distinct reported kind; the coordinator's reaction is the
/// same for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum PriceSourceError {
    /// The request exceeded the configured timeout.
    #[error("request timed out - please try again")]
    Timeout,
    /// The endpoint could not be reached at all.
    #[error("network error - please check your connection")]
    Network { message: String },
    /// The endpoint answered with an error status.
    #[error("server error: {status}")]
    Server { status: u16 },
    /// The body was not an array of token records.
    #[error("invalid response format: {message}")]
    MalformedPayload { message: String },
}

impl PriceSourceError {
    /// Machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Network { .. } => "NETWORK",
            Self::Server { .. } => "SERVER_ERROR",
            Self::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
        }
    }
}

/// Session-level errors surfaced to the presentation layer.
///
/// These never propagate as faults; they are stored on the session and
/// rendered as a dismissible notice. Recovery is always user-retriable.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapError {
    /// The initial price load failed; the token set stays empty.
    #[error("failed to load token prices: {cause}")]
    PriceFetchFailed {
        #[source]
        cause: PriceSourceError,
    },
    /// A background refresh failed; prior prices are kept.
    #[error("failed to refresh token prices: {cause}")]
    PriceRefreshFailed {
        #[source]
        cause: PriceSourceError,
    },
    /// The swap request did not pass validation.
    #[error("swap validation failed: {}", .messages.join(", "))]
    ValidationFailed { messages: Vec<String> },
    /// The settlement call for a confirmed swap faulted.
    #[error("swap failed: {message}")]
    SwapCommitFailed { message: String },
}

impl SwapError {
    /// Machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PriceFetchFailed { .. } => "PRICE_FETCH_FAILED",
            Self::PriceRefreshFailed { .. } => "PRICE_REFRESH_FAILED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::SwapCommitFailed { .. } => "SWAP_COMMIT_FAILED",
        }
    }
}
