//! Custom serde deserializers for loosely typed operator payloads
//!
//! The operator serialises the same field as a JSON number on one endpoint
//! and as a string on another (`buyRound: "1122"` vs `ltEpsd: 1122`).

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    String(String),
}

/// Deserialize an optional integer that can be:
/// - JSON integer: `1122`
/// - JSON float with no fractional part: `1000.0`
/// - String: `"1122"`, `" 1,000 "` (thousands separators are stripped)
/// - `null`, missing or an empty string: `None`
pub fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;

    match value {
        None => Ok(None),
        Some(NumberOrString::Int(i)) => Ok(Some(i)),
        Some(NumberOrString::Float(f)) => {
            if f.fract() == 0.0 {
                Ok(Some(f as i64))
            } else {
                Err(de::Error::custom(format!("expected whole number, got {}", f)))
            }
        }
        Some(NumberOrString::String(s)) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<i64>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid integer string: {}", s)))
        }
    }
}

/// Deserialize an optional string that may be sent as a number (`"0"` vs `0`)
pub fn deserialize_flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;

    Ok(value.map(|v| match v {
        NumberOrString::Int(i) => i.to_string(),
        NumberOrString::Float(f) => f.to_string(),
        NumberOrString::String(s) => s,
    }))
}

/// Deserialize a list whose elements may each be a number or a numeric
/// string (`[1, "02", 3]`). `null` or a missing list becomes empty.
pub fn deserialize_flexible_i64_vec<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<NumberOrString>> = Option::deserialize(deserializer)?;

    values
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            NumberOrString::Int(i) => Ok(i),
            NumberOrString::Float(f) if f.fract() == 0.0 => Ok(f as i64),
            NumberOrString::Float(f) => {
                Err(de::Error::custom(format!("expected whole number, got {}", f)))
            }
            NumberOrString::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid integer string: {}", s))),
        })
        .collect()
}
