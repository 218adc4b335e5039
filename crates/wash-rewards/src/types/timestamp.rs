//! Ledger timestamp parsing.
//!
//! Ledger exports carry either unix seconds or naive UTC strings such as
//! `2022-03-14 00:00:00`. Both are normalised to unix seconds.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Unix(i64),
    Text(String),
}

impl RawTimestamp {
    fn into_unix(self) -> Result<i64, String> {
        match self {
            Self::Unix(secs) => Ok(secs),
            Self::Text(text) => parse_timestamp(&text),
        }
    }
}

/// Parse a naive UTC timestamp string into unix seconds.
pub fn parse_timestamp(text: &str) -> Result<i64, String> {
    let trimmed = text.trim();
    if let Ok(secs) = trimmed.parse::<i64>() {
        return Ok(secs);
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| format!("unparseable timestamp '{text}'"))
}

/// Render unix seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    RawTimestamp::deserialize(deserializer)?
        .into_unix()
        .map_err(serde::de::Error::custom)
}

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawTimestamp>::deserialize(deserializer)?
        .map(RawTimestamp::into_unix)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_naive_utc() {
        assert_eq!(parse_timestamp("2022-03-14 00:00:00"), Ok(1_647_216_000));
        assert_eq!(parse_timestamp("2022-03-14T00:00:01"), Ok(1_647_216_001));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(parse_timestamp("2022-03-14 00:00:00.250"), Ok(1_647_216_000));
    }

    #[test]
    fn test_parse_unix_string() {
        assert_eq!(parse_timestamp("1647216000"), Ok(1_647_216_000));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(err.contains("unparseable"));
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(format_timestamp(1_647_216_000), "2022-03-14 00:00:00");
    }
}
