pub mod course;
pub mod review;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Accepts an id encoded either as a JSON string or an integer.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}

/// Accepts a numeric field that may arrive as a number, a decimal string, or null.
pub(crate) fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got '{s}'"))),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

/// Naive layouts some API deployments emit; read as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Accepts RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS` timestamp. Anything else,
/// including null, becomes `None` so one odd value never fails the record.
pub(crate) fn de_lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::String(raw) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    Ok(NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc()))
}
