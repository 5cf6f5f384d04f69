//! Exact JSON encoding for money.
//!
//! Amounts are written as JSON numbers carrying every digit of the decimal
//! and read back from the literal text, so nothing passes through `f64`.
//! A quoted numeric string is accepted on read for older files.

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::str::FromStr;

pub(crate) fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(value.to_string())
        .map_err(<S::Error as ser::Error>::custom)?;
    raw.serialize(serializer)
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    parse_literal(raw.get()).map_err(de::Error::custom)
}

pub(crate) fn deserialize_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    let raw = Option::<Box<RawValue>>::deserialize(deserializer)?;
    raw.map(|r| parse_literal(r.get()))
        .transpose()
        .map_err(de::Error::custom)
}

/// Parse the JSON text of a number or a numeric string.
pub(crate) fn parse_literal(literal: &str) -> Result<Decimal, String> {
    let text = literal.trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .map_or(text, str::trim);
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| format!("'{text}' is not an amount"))
}
