//! Token price models
//!
//! Raw records arrive from the price source, get validated at the boundary,
//! and are collapsed into a deduplicated [`TokenSet`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A price value as it appears on the wire.
///
/// Some feeds emit prices as JSON numbers, others as numeric strings;
/// both forms are accepted and resolved by [`RawToken::parsed_price`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

/// A token record as returned by the price source, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawToken {
    /// Currency symbol (e.g., "ETH")
    pub currency: String,
    /// Observation timestamp
    #[serde(rename = "date")]
    pub updated_at: DateTime<Utc>,
    /// Price in the feed's quote currency
    pub price: RawPrice,
}

impl RawToken {
    /// Resolve the wire price to a number, if it is one.
    pub fn parsed_price(&self) -> Option<f64> {
        match &self.price {
            RawPrice::Number(n) => Some(*n),
            RawPrice::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// A validated price snapshot for one currency.
///
/// Immutable once built; the whole set is replaced on each refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Currency symbol, unique within a [`TokenSet`]
    pub currency: String,
    /// Price in the feed's quote currency. Zero means "no rate available".
    pub price: f64,
    /// When the price was observed
    pub updated_at: DateTime<Utc>,
}

impl Token {
    pub fn new(currency: impl Into<String>, price: f64, updated_at: DateTime<Utc>) -> Self {
        Self {
            currency: currency.into(),
            price,
            updated_at,
        }
    }

    /// Validate a raw record. Entries whose price is missing or non-finite
    /// are rejected here rather than carried into the session.
    pub fn from_raw(raw: &RawToken) -> Option<Self> {
        let price = raw.parsed_price()?;
        if !price.is_finite() {
            return None;
        }
        Some(Self {
            currency: raw.currency.clone(),
            price,
            updated_at: raw.updated_at,
        })
    }
}

/// Deduplicated mapping from currency symbol to its price snapshot.
///
/// Dedup rule: among records sharing a currency, the *earliest*
/// `updated_at` survives; on equal timestamps the higher price wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenSet {
    tokens: HashMap<String, Token>,
}

impl TokenSet {
    /// Validate and deduplicate a raw payload from the price source.
    ///
    /// Malformed entries are dropped with a warning; the rest go through
    /// the dedup rule.
    pub fn from_raw(raw: Vec<RawToken>) -> Self {
        let mut valid = Vec::with_capacity(raw.len());
        for record in &raw {
            match Token::from_raw(record) {
                Some(token) => valid.push(token),
                None => {
                    tracing::warn!(
                        currency = %record.currency,
                        "dropping token record with invalid price"
                    );
                }
            }
        }
        Self::from_tokens(valid)
    }

    /// Deduplicate an already-validated token list.
    pub fn from_tokens(list: Vec<Token>) -> Self {
        let mut tokens: HashMap<String, Token> = HashMap::new();

        for token in list {
            match tokens.get(&token.currency) {
                None => {
                    tokens.insert(token.currency.clone(), token);
                }
                Some(existing) => {
                    let replaces = token.updated_at < existing.updated_at
                        || (token.updated_at == existing.updated_at
                            && token.price > existing.price);
                    if replaces {
                        tokens.insert(token.currency.clone(), token);
                    }
                }
            }
        }

        Self { tokens }
    }

    /// Look up a token by currency symbol.
    pub fn get(&self, currency: &str) -> Option<&Token> {
        self.tokens.get(currency)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All tokens, sorted by currency for stable display.
    pub fn to_sorted_vec(&self) -> Vec<Token> {
        let mut list: Vec<Token> = self.tokens.values().cloned().collect();
        list.sort_by(|a, b| a.currency.cmp(&b.currency));
        list
    }
}
