//! Forgiving field decoders for hand-entered records.
//!
//! Records arrive from form submissions, so numbers show up as strings,
//! text fields show up as `null`, and arrays occasionally hold junk. The
//! decoders here never fail: whatever cannot be understood becomes the
//! zero value of the field.
//!
//! Numbers are decoded as [`Decimal`] so that money adds up exactly, and
//! are clamped so that every cost, quantity and hour count is
//! non-negative and no larger than [`MAX_AMOUNT`].

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::ids::ProjectId;

/// Largest amount, quantity or hour count a record may carry. Anything
/// above it is treated as unreadable.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Clamps a number to the range `0..=MAX_AMOUNT`; out-of-range values become zero.
pub fn sanitize(value: Decimal) -> Decimal {
    if value.is_sign_positive() && value <= Decimal::from(MAX_AMOUNT) {
        value.normalize()
    } else {
        Decimal::ZERO
    }
}

/// Parses decimal text in plain (`"12.50"`) or exponent (`"1e-3"`) form.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Reads a JSON value as a number, if it holds one.
///
/// Numeric strings are accepted; surrounding whitespace and a leading `$`
/// or thousands separators are tolerated ("$1,250.50").
pub fn number_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            parse_decimal(&cleaned)
        }
        _ => None,
    }
}

/// Coerces any JSON value to a sanitized number, defaulting to zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    number_from_value(value).map(sanitize).unwrap_or_default()
}

/// `deserialize_with` for numeric fields that default to zero.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_decimal).unwrap_or_default())
}

/// `deserialize_with` for optional numbers; unreadable input is `None`.
pub fn lenient_opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value).map(sanitize))
}

/// Reads an identifier that may have been stored as a string or a number.
pub fn id_from_value(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then_some(raw)
}

/// `deserialize_with` for text fields; numbers are stringified, the rest is empty.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Parses a calendar date from `YYYY-MM-DD` or any timestamp starting with one.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// `deserialize_with` for optional dates; unparseable dates are `None`.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// `deserialize_with` for record arrays.
///
/// A missing or non-array value is an empty list; elements that do not
/// decode as `T` are dropped.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// `deserialize_with` for a project reference.
///
/// Accepts a bare ID string, or a populated project object carrying `id`
/// or `_id`. Blank references are `None`.
pub fn project_ref<'de, D>(deserializer: D) -> Result<Option<ProjectId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let raw = match value {
        Some(Value::Object(map)) => map
            .get("id")
            .or_else(|| map.get("_id"))
            .and_then(id_from_value),
        Some(other) => id_from_value(&other),
        None => None,
    };
    Ok(raw.map(ProjectId::from))
}
