//! # Field Parsing
//!
//! Lenient parsing for catalog and order fields that arrive loosely typed.
//!
//! Product documents and storefront payloads are not strict: a price can be a
//! number or a numeric string, the packaging opt-out flag shows up as `true`,
//! `1`, `"1"` or `"TRUE"`. Everything is normalized here, once, so the
//! pricing code only ever sees `Amount`, `u32` and `bool`.
//!
//! ## Defaults
//! ```text
//! ┌───────────────────┬──────────────────────────────┬──────────┐
//! │ Field             │ Accepted                     │ Fallback │
//! ├───────────────────┼──────────────────────────────┼──────────┤
//! │ amount (price)    │ finite number, numeric text  │ 0        │
//! │ quantity          │ positive number/numeric text │ 1        │
//! │ flag (opt-out)    │ true, 1, "1", "true" (any    │ false    │
//! │                   │ case)                        │          │
//! │ key (name, code)  │ string, number, bool         │ none     │
//! │ pricing mode      │ "override" (any case)        │ add      │
//! │ list (options)    │ array; bad entries dropped   │ empty    │
//! └───────────────────┴──────────────────────────────┴──────────┘
//! ```
//!
//! None of these functions fail. The serde adapters at the bottom plug them
//! into `#[serde(deserialize_with = ...)]`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::money::Amount;
use crate::types::PricingMode;

/// Quantity used when a line carries no usable quantity.
pub const DEFAULT_QUANTITY: u32 = 1;

// =============================================================================
// Value Parsers
// =============================================================================

/// Parses a currency field, defaulting to zero.
///
/// A bare `true` counts as 1, the way the storefront's numeric coercion
/// treats it.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tavola_core::parse::parse_amount;
///
/// assert_eq!(parse_amount(&json!(8.5)).value(), 8.5);
/// assert_eq!(parse_amount(&json!(" 4.25 ")).value(), 4.25);
/// assert!(parse_amount(&json!("free")).is_zero());
/// assert!(parse_amount(&json!(null)).is_zero());
/// ```
pub fn parse_amount(value: &Value) -> Amount {
    match value {
        Value::Number(n) => n.as_f64().map(Amount::new).unwrap_or_default(),
        Value::String(s) => parse_amount_str(s),
        Value::Bool(true) => Amount::new(1.0),
        _ => Amount::zero(),
    }
}

/// Parses a currency field from text, defaulting to zero.
///
/// Blank text is zero, matching how an empty form field prices.
pub fn parse_amount_str(raw: &str) -> Amount {
    raw.trim()
        .parse::<f64>()
        .map(Amount::new)
        .unwrap_or_default()
}

/// Parses a line quantity, defaulting to [`DEFAULT_QUANTITY`].
///
/// Only positive finite numbers count. Fractions are truncated, and a value
/// that truncates to zero falls back to the default as well.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tavola_core::parse::parse_quantity;
///
/// assert_eq!(parse_quantity(&json!(3)), 3);
/// assert_eq!(parse_quantity(&json!("2")), 2);
/// assert_eq!(parse_quantity(&json!(0)), 1);
/// assert_eq!(parse_quantity(&json!(-4)), 1);
/// assert_eq!(parse_quantity(&json!("many")), 1);
/// ```
pub fn parse_quantity(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(q) if q.is_finite() && q >= 1.0 => {
            if q.fract() != 0.0 {
                debug!(quantity = q, "Fractional quantity truncated");
            }
            if q >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                q as u32
            }
        }
        Some(q) if q > 0.0 && q.is_finite() => {
            debug!(quantity = q, "Quantity below one, using default");
            DEFAULT_QUANTITY
        }
        _ => DEFAULT_QUANTITY,
    }
}

/// Parses a boolean-like flag.
///
/// `true`, numeric `1`, and the strings `"1"` / `"true"` (case-insensitive)
/// are set; anything else is unset.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tavola_core::parse::parse_flag;
///
/// assert!(parse_flag(&json!(true)));
/// assert!(parse_flag(&json!(1)));
/// assert!(parse_flag(&json!("TRUE")));
/// assert!(!parse_flag(&json!("0")));
/// assert!(!parse_flag(&json!(null)));
/// ```
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => parse_flag_str(s),
        _ => false,
    }
}

/// Text form of [`parse_flag`], for columns read back as strings.
pub fn parse_flag_str(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

/// Parses an identifier field: option name, choice code, selected code.
///
/// Strings are kept as-is; numbers and booleans take their JSON text, so a
/// choice stored with code `1` matches a selection of `"1"`. Anything else
/// is `None` and can never match.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tavola_core::parse::parse_key;
///
/// assert_eq!(parse_key(&json!("L")).as_deref(), Some("L"));
/// assert_eq!(parse_key(&json!(1)).as_deref(), Some("1"));
/// assert_eq!(parse_key(&json!(null)), None);
/// ```
pub fn parse_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parses an option pricing mode. Only `"override"` (any case) overrides.
pub fn parse_pricing_mode(value: &Value) -> PricingMode {
    match value {
        Value::String(s) if s.trim().eq_ignore_ascii_case("override") => PricingMode::Override,
        _ => PricingMode::Add,
    }
}

/// Parses a list of records.
///
/// `null` or any non-array value is an empty list. Entries that do not
/// decode as `T` are dropped (and logged), the rest are kept in order.
pub fn parse_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Dropping undecodable list entry");
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!(value = %other, "Expected a list, using an empty one");
            Vec::new()
        }
    }
}

/// Parses an option selection map (option name → selected code).
///
/// Values go through [`parse_key`]; entries without a usable code are
/// dropped. Anything but an object is an empty map.
pub fn parse_selections(value: &Value) -> BTreeMap<String, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(name, code)| parse_key(code).map(|code| (name.clone(), code)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

// =============================================================================
// Serde Adapters
// =============================================================================

/// `deserialize_with` adapter for [`parse_amount`].
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_amount(&value))
}

/// Like [`deserialize_amount`], but `null` stays `None`.
///
/// Used for the promotion price, where "absent" and "zero" mean different
/// things.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(parse_amount(&other)),
    })
}

/// `deserialize_with` adapter for [`parse_quantity`].
pub fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_quantity(&value))
}

/// `deserialize_with` adapter for [`parse_flag`].
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_flag(&value))
}

/// `deserialize_with` adapter for [`parse_key`]; unusable values become `""`.
pub fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_key(&value).unwrap_or_default())
}

/// `deserialize_with` adapter for optional identifiers (product id, SKU).
pub fn deserialize_optional_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_key(&value))
}

/// `deserialize_with` adapter for [`parse_pricing_mode`].
pub fn deserialize_pricing_mode<'de, D>(deserializer: D) -> Result<PricingMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_pricing_mode(&value))
}

/// `deserialize_with` adapter for [`parse_list`].
pub fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_list(value))
}

/// `deserialize_with` adapter for [`parse_selections`].
pub fn deserialize_selections<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_selections(&value))
}

/// Serde default for quantities.
pub fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!(12)).value(), 12.0);
        assert_eq!(parse_amount(&json!("3.5")).value(), 3.5);
        assert!(parse_amount(&json!("")).is_zero());
        assert!(parse_amount(&json!("NaN")).is_zero());
        assert!(parse_amount(&json!([1, 2])).is_zero());
        assert!(parse_amount(&json!({})).is_zero());
        assert!(parse_amount(&json!(false)).is_zero());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!(1)), 1);
        assert_eq!(parse_quantity(&json!(4.9)), 4);
        assert_eq!(parse_quantity(&json!(2.5)), 2);
        assert_eq!(parse_quantity(&json!("2.5")), 2);
        assert_eq!(parse_quantity(&json!(0.5)), 1);
        assert_eq!(parse_quantity(&json!(" 7 ")), 7);
        assert_eq!(parse_quantity(&json!(null)), 1);
        assert_eq!(parse_quantity(&json!(true)), 1);
        assert_eq!(parse_quantity(&json!(1e12)), u32::MAX);
    }

    #[test]
    fn test_parse_flag_encodings() {
        for set in [json!(true), json!(1), json!(1.0), json!("1"), json!("true"), json!("True")] {
            assert!(parse_flag(&set), "{set} should be set");
        }

        for unset in [
            json!(false),
            json!(0),
            json!(2),
            json!("0"),
            json!("false"),
            json!("yes"),
            json!(""),
            json!(null),
        ] {
            assert!(!parse_flag(&unset), "{unset} should be unset");
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key(&json!("size")).as_deref(), Some("size"));
        assert_eq!(parse_key(&json!(2)).as_deref(), Some("2"));
        assert_eq!(parse_key(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(parse_key(&json!(true)).as_deref(), Some("true"));
        assert_eq!(parse_key(&json!(null)), None);
        assert_eq!(parse_key(&json!(["L"])), None);
        assert_eq!(parse_key(&json!({ "code": "L" })), None);
    }

    #[test]
    fn test_parse_pricing_mode() {
        assert_eq!(parse_pricing_mode(&json!("override")), PricingMode::Override);
        assert_eq!(parse_pricing_mode(&json!(" OVERRIDE ")), PricingMode::Override);
        assert_eq!(parse_pricing_mode(&json!("add")), PricingMode::Add);
        assert_eq!(parse_pricing_mode(&json!("multiply")), PricingMode::Add);
        assert_eq!(parse_pricing_mode(&json!(null)), PricingMode::Add);
        assert_eq!(parse_pricing_mode(&json!(0)), PricingMode::Add);
    }

    #[test]
    fn test_parse_list() {
        let empty: Vec<u32> = parse_list(json!(null));
        assert!(empty.is_empty());

        let empty: Vec<u32> = parse_list(json!({ "a": 1 }));
        assert!(empty.is_empty());

        let kept: Vec<u32> = parse_list(json!([1, "two", 3, null]));
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn test_parse_selections() {
        let selections = parse_selections(&json!({
            "size": "L", "count": 2, "none": null, "list": ["x"], "flag": false
        }));

        assert_eq!(selections.len(), 3);
        assert_eq!(selections["size"], "L");
        assert_eq!(selections["count"], "2");
        assert_eq!(selections["flag"], "false");

        assert!(parse_selections(&json!(null)).is_empty());
        assert!(parse_selections(&json!("size=L")).is_empty());
    }

    #[derive(Deserialize)]
    struct LooseFields {
        #[serde(default, deserialize_with = "deserialize_amount")]
        price: Amount,
        #[serde(default, deserialize_with = "deserialize_optional_amount")]
        promo: Option<Amount>,
        #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
        quantity: u32,
        #[serde(default, deserialize_with = "deserialize_flag")]
        flag: bool,
    }

    #[test]
    fn test_serde_adapters() {
        let fields: LooseFields =
            serde_json::from_value(json!({ "price": "9.5", "promo": null, "quantity": "x", "flag": "1" }))
                .unwrap();
        assert_eq!(fields.price.value(), 9.5);
        assert!(fields.promo.is_none());
        assert_eq!(fields.quantity, 1);
        assert!(fields.flag);

        let fields: LooseFields = serde_json::from_value(json!({ "promo": "abc" })).unwrap();
        assert!(fields.price.is_zero());
        assert_eq!(fields.promo, Some(Amount::zero()));
        assert_eq!(fields.quantity, 1);
        assert!(!fields.flag);
    }
}
