//! Price source client
//!
//! The coordinator consumes one external capability: fetch the full token
//! catalog. Either the whole array comes back or the call fails as a unit;
//! there is no pagination and no partial result.

use async_trait::async_trait;
use std::time::Duration;
use swap_models::{PriceSourceError, RawToken};

/// Default per-request timeout for the HTTP client.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Read-only view of the external price endpoint.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the full token catalog.
    async fn fetch(&self) -> Result<Vec<RawToken>, PriceSourceError>;
}

/// `PriceSource` backed by an HTTP endpoint returning a JSON array of
/// token records.
pub struct HttpPriceSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpPriceSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> Result<Vec<RawToken>, PriceSourceError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceSourceError::Server {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| PriceSourceError::MalformedPayload {
                    message: format!("body is not JSON: {e}"),
                })?;

        let serde_json::Value::Array(entries) = body else {
            return Err(PriceSourceError::MalformedPayload {
                message: "expected an array of token records".to_string(),
            });
        };

        // Unparseable entries are dropped at the boundary rather than
        // failing the whole payload
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<RawToken>(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("dropping unparseable token record: {}", e);
                }
            }
        }

        Ok(records)
    }
}

/// Map a transport-level reqwest error to the reported failure kind.
fn classify_transport_error(error: reqwest::Error) -> PriceSourceError {
    if error.is_timeout() {
        PriceSourceError::Timeout
    } else {
        PriceSourceError::Network {
            message: error.to_string(),
        }
    }
}
