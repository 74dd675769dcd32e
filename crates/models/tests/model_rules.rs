//! Tests for the core model rules
//!
//! These verify that:
//! 1. Deduplication keeps the earliest observation, higher price on ties
//! 2. The derived output amount follows the zero-price and empty-input rules
//! 3. Boundary validation rejects malformed price records
//! 4. Swap validation collects every applicable failure

use chrono::{TimeZone, Utc};
use swap_models::{
    derive_output, validate_swap, RawPrice, RawToken, Token, TokenSet,
};

fn token(currency: &str, price: f64, secs: i64) -> Token {
    Token::new(currency, price, Utc.timestamp_opt(secs, 0).unwrap())
}

#[test]
fn test_dedup_keeps_earliest_observation() {
    let set = TokenSet::from_tokens(vec![
        token("BTC", 100.0, 1),
        token("BTC", 200.0, 1),
        token("BTC", 50.0, 2),
    ]);

    let btc = set.get("BTC").expect("BTC should survive dedup");
    assert_eq!(btc.price, 200.0, "equal timestamps keep the higher price");
    assert_eq!(btc.updated_at.timestamp(), 1, "earliest observation wins");
}

#[test]
fn test_dedup_ignores_later_observations_regardless_of_price() {
    let set = TokenSet::from_tokens(vec![
        token("ETH", 1650.0, 10),
        token("ETH", 9999.0, 20),
    ]);

    let eth = set.get("ETH").unwrap();
    assert_eq!(eth.price, 1650.0);
}

#[test]
fn test_dedup_distinct_currencies_all_survive() {
    let set = TokenSet::from_tokens(vec![
        token("BTC", 26000.0, 1),
        token("ETH", 1650.0, 1),
        token("USDC", 1.0, 1),
    ]);
    assert_eq!(set.len(), 3);
}

#[test]
fn test_output_amount_six_decimal_places() {
    let from = token("A", 2.0, 0);
    let to = token("B", 4.0, 0);
    assert_eq!(derive_output(Some(&from), Some(&to), "10", 6), "5.000000");
}

#[test]
fn test_output_amount_zero_price_means_no_rate() {
    let from = token("A", 2.0, 0);
    let to = token("B", 0.0, 0);
    assert_eq!(
        derive_output(Some(&from), Some(&to), "10", 6),
        "",
        "a zero price is 'no rate available', not a division fault"
    );
}

#[test]
fn test_output_amount_empty_without_both_tokens_or_input() {
    let from = token("A", 2.0, 0);
    assert_eq!(derive_output(Some(&from), None, "10", 6), "");
    assert_eq!(derive_output(None, None, "10", 6), "");

    let to = token("B", 4.0, 0);
    assert_eq!(derive_output(Some(&from), Some(&to), "", 6), "");
    assert_eq!(derive_output(Some(&from), Some(&to), "   ", 6), "");
}

#[test]
fn test_output_amount_unparseable_input_is_zero() {
    let from = token("A", 2.0, 0);
    let to = token("B", 4.0, 0);
    assert_eq!(
        derive_output(Some(&from), Some(&to), "abc", 6),
        "0.000000"
    );
}

#[test]
fn test_boundary_rejects_non_finite_prices() {
    let raw = vec![
        RawToken {
            currency: "GOOD".into(),
            updated_at: Utc.timestamp_opt(1, 0).unwrap(),
            price: RawPrice::Number(1.5),
        },
        RawToken {
            currency: "BAD".into(),
            updated_at: Utc.timestamp_opt(1, 0).unwrap(),
            price: RawPrice::Text("NaN".into()),
        },
        RawToken {
            currency: "WORSE".into(),
            updated_at: Utc.timestamp_opt(1, 0).unwrap(),
            price: RawPrice::Text("not a price".into()),
        },
    ];

    let set = TokenSet::from_raw(raw);
    assert_eq!(set.len(), 1, "only the finite-price record survives");
    assert!(set.get("GOOD").is_some());
}

#[test]
fn test_boundary_parses_string_prices() {
    let raw = vec![RawToken {
        currency: "ATOM".into(),
        updated_at: Utc.timestamp_opt(1, 0).unwrap(),
        price: RawPrice::Text("7.25".into()),
    }];

    let set = TokenSet::from_raw(raw);
    assert_eq!(set.get("ATOM").unwrap().price, 7.25);
}

#[test]
fn test_raw_token_wire_format() {
    let json = r#"{"currency":"BLUR","date":"2023-08-29T07:10:40.000Z","price":0.208}"#;
    let raw: RawToken = serde_json::from_str(json).expect("wire format should parse");
    assert_eq!(raw.currency, "BLUR");
    assert_eq!(raw.parsed_price(), Some(0.208));
}

#[test]
fn test_validation_collects_all_failures() {
    let result = validate_swap(None, None, "");
    assert!(!result.is_valid());
    assert_eq!(
        result.errors.len(),
        3,
        "missing from, missing to, and missing amount should all be reported: {:?}",
        result.errors
    );
}

#[test]
fn test_validation_rejects_same_currency_pair() {
    let from = token("ETH", 1650.0, 0);
    let to = token("ETH", 1650.0, 0);
    let result = validate_swap(Some(&from), Some(&to), "1");
    assert_eq!(result.errors, vec!["Cannot swap the same currency"]);
}

#[test]
fn test_validation_rejects_non_positive_amounts() {
    let from = token("ETH", 1650.0, 0);
    let to = token("BTC", 26000.0, 0);

    for bad in ["0", "-1", "abc"] {
        let result = validate_swap(Some(&from), Some(&to), bad);
        assert!(
            !result.is_valid(),
            "amount {bad:?} should fail validation"
        );
    }
}

#[test]
fn test_validation_accepts_valid_swap() {
    let from = token("ETH", 1650.0, 0);
    let to = token("BTC", 26000.0, 0);
    let result = validate_swap(Some(&from), Some(&to), "0.5");
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
}
