//! Newline-delimited JSON cellular observations.

use crate::core::track_loader::truncate_seconds;
use crate::domain::model::{CellObservation, ObservationSource};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("no timestamp field")]
    MissingTimestamp,

    #[error("could not parse timestamp: {0}")]
    UnparseableTimestamp(String),

    #[error("timestamp {0} is not a positive epoch value")]
    NonPositiveTimestamp(i64),
}

/// Extended ISO-8601 datetime: hour, minute, second and fraction are
/// successively optional, offset may be `Z`, `±HH`, `±HHMM` or `±HH:MM`.
const ISO_DATETIME: &str = r"^(\d{4}-\d{2}-\d{2})[T ](\d{2})(?::(\d{2})(?::(\d{2})(\.\d+)?)?)?(Z|[+-]\d{2}(?::?\d{2})?)?$";

/// Resolves a `timestamp` JSON value to epoch seconds.
///
/// Numbers are truncated. Strings are tried as ISO-8601 first (a trailing
/// `Z` means UTC, no offset means UTC) and then as a bare numeric epoch.
pub fn parse_timestamp(value: &Value) -> Result<i64, ObservationError> {
    let seconds = match value {
        Value::Number(n) => {
            let resolved = match n.as_i64() {
                Some(i) => Some(i),
                None => n.as_f64().and_then(truncate_seconds),
            };
            resolved.ok_or_else(|| ObservationError::UnparseableTimestamp(n.to_string()))?
        }
        Value::String(s) => parse_iso8601(s)
            .or_else(|| s.trim().parse::<f64>().ok().and_then(truncate_seconds))
            .ok_or_else(|| ObservationError::UnparseableTimestamp(s.clone()))?,
        other => return Err(ObservationError::UnparseableTimestamp(other.to_string())),
    };

    // 0 counts as "no timestamp" too
    if seconds <= 0 {
        return Err(ObservationError::NonPositiveTimestamp(seconds));
    }
    Ok(seconds)
}

fn parse_iso8601(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }

    let re = Regex::new(ISO_DATETIME).ok()?;
    if let Some(caps) = re.captures(raw) {
        let canonical = format!(
            "{}T{}:{}:{}{}{}",
            &caps[1],
            &caps[2],
            caps.get(3).map_or("00", |m| m.as_str()),
            caps.get(4).map_or("00", |m| m.as_str()),
            caps.get(5).map_or("", |m| m.as_str()),
            rfc3339_offset(caps.get(6).map(|m| m.as_str())),
        );
        return DateTime::parse_from_rfc3339(&canonical)
            .ok()
            .map(|dt| dt.timestamp());
    }

    // 只有日期: 當天 00:00 UTC
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}

/// No offset means UTC.
fn rfc3339_offset(offset: Option<&str>) -> String {
    match offset {
        None | Some("Z") => "+00:00".to_string(),
        Some(o) if o.len() == 3 => format!("{}:00", o),
        Some(o) if o.len() == 5 => format!("{}:{}", &o[..3], &o[3..]),
        Some(o) => o.to_string(),
    }
}

/// Parses one non-blank line into an observation.
pub fn parse_observation_line(line: &str) -> Result<CellObservation, ObservationError> {
    let value: Value = serde_json::from_str(line)?;
    let object = value.as_object().ok_or(ObservationError::NotAnObject)?;

    let timestamp = object
        .get("timestamp")
        .ok_or(ObservationError::MissingTimestamp)
        .and_then(parse_timestamp)?;

    Ok(CellObservation {
        cell_id: field(object, "cell_id"),
        lac: field(object, "lac"),
        tac: field(object, "tac"),
        mcc: field(object, "mcc"),
        mnc: field(object, "mnc"),
        pci: field(object, "pci"),
        rsrp: field(object, "rsrp"),
        rsrq: field(object, "rsrq"),
        rssi: field(object, "rssi"),
        rat: field(object, "rat"),
        ..CellObservation::bare(timestamp, ObservationSource::Structured)
    })
}

/// Copied through untouched; `null` reads as absent.
fn field(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object.get(key).filter(|v| !v.is_null()).cloned()
}

/// Loads every usable observation from an NDJSON document. Bad lines are
/// logged and skipped, records without a timestamp are dropped quietly.
pub fn load_observations(content: &str) -> Vec<CellObservation> {
    let mut observations = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_observation_line(line) {
            Ok(obs) => observations.push(obs),
            Err(ObservationError::MissingTimestamp) => {
                tracing::debug!("NDJSON line {} has no timestamp, skipped", idx + 1);
            }
            Err(ObservationError::NonPositiveTimestamp(ts)) => {
                tracing::debug!("NDJSON line {} has timestamp {}, skipped", idx + 1, ts);
            }
            Err(e) => tracing::warn!("Skipping NDJSON line {}: {}", idx + 1, e),
        }
    }

    tracing::info!(
        "Loaded {} cellular observations from NDJSON",
        observations.len()
    );
    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_timestamps() {
        assert_eq!(parse_timestamp(&json!(1700000000)).unwrap(), 1700000000);
        assert_eq!(parse_timestamp(&json!(1700000000.75)).unwrap(), 1700000000);
    }

    #[test]
    fn test_iso_timestamps() {
        assert_eq!(
            parse_timestamp(&json!("2024-01-01T00:00:00Z")).unwrap(),
            1704067200
        );
        assert_eq!(
            parse_timestamp(&json!("2024-01-01T02:00:00+02:00")).unwrap(),
            1704067200
        );
        assert_eq!(
            parse_timestamp(&json!("2024-01-01T00:00:00.500")).unwrap(),
            1704067200
        );
        assert_eq!(parse_timestamp(&json!("2024-01-01")).unwrap(), 1704067200);
    }

    #[test]
    fn test_iso_reduced_precision_and_offsets() {
        // 2024-01-01T10:00:00Z
        let expected = 1704103200;
        for raw in [
            "2024-01-01T10:00Z",
            "2024-01-01T10:00",
            "2024-01-01T10:00:00+0000",
            "2024-01-01T10",
            "2024-01-01T10Z",
            "2024-01-01 10:00",
            "2024-01-01T11:00+01:00",
            "2024-01-01T12:00+0200",
            "2024-01-01T07-03",
            "2024-01-01T10:00:00.25+00:00",
        ] {
            assert_eq!(parse_timestamp(&json!(raw)).unwrap(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_iso_out_of_range_fields_rejected() {
        for raw in ["2024-01-01T25:00", "2024-13-01T10:00Z", "2024-01-01T10:61"] {
            assert!(
                matches!(
                    parse_timestamp(&json!(raw)),
                    Err(ObservationError::UnparseableTimestamp(_))
                ),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_numeric_string_timestamp() {
        assert_eq!(parse_timestamp(&json!("1700000000")).unwrap(), 1700000000);
        assert_eq!(parse_timestamp(&json!(" 1700000000.9 ")).unwrap(), 1700000000);
    }

    #[test]
    fn test_unparseable_timestamps() {
        assert!(matches!(
            parse_timestamp(&json!("yesterday")),
            Err(ObservationError::UnparseableTimestamp(_))
        ));
        assert!(matches!(
            parse_timestamp(&json!(true)),
            Err(ObservationError::UnparseableTimestamp(_))
        ));
        assert!(matches!(
            parse_timestamp(&json!("inf")),
            Err(ObservationError::UnparseableTimestamp(_))
        ));
    }

    #[test]
    fn test_zero_timestamp_is_dropped() {
        assert!(matches!(
            parse_timestamp(&json!(0)),
            Err(ObservationError::NonPositiveTimestamp(0))
        ));
        assert!(matches!(
            parse_timestamp(&json!("0")),
            Err(ObservationError::NonPositiveTimestamp(0))
        ));
        assert!(matches!(
            parse_timestamp(&json!(0.4)),
            Err(ObservationError::NonPositiveTimestamp(0))
        ));
        assert!(load_observations(r#"{"timestamp": 0, "cell_id": 1}"#).is_empty());
    }

    #[test]
    fn test_fields_copied_verbatim() {
        let obs = parse_observation_line(
            r#"{"timestamp":105,"cell_id":42,"rsrp":-95,"rat":"LTE","pci":"odd","mcc":0}"#,
        )
        .unwrap();
        assert_eq!(obs.timestamp, 105);
        assert_eq!(obs.cell_id, Some(json!(42)));
        assert_eq!(obs.rsrp, Some(json!(-95)));
        assert_eq!(obs.rat, Some(json!("LTE")));
        assert_eq!(obs.pci, Some(json!("odd")));
        assert_eq!(obs.mcc, Some(json!(0)));
        assert_eq!(obs.lac, None);
        assert_eq!(obs.source, ObservationSource::Structured);
    }

    #[test]
    fn test_null_field_is_absent() {
        let obs = parse_observation_line(r#"{"timestamp":105,"tac":null}"#).unwrap();
        assert_eq!(obs.tac, None);
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let content = concat!(
            "{\"timestamp\":100,\"cell_id\":1}\n",
            "{not json\n",
            "\n",
            "[1,2,3]\n",
            "{\"cell_id\":7}\n",
            "{\"timestamp\":\"garbage\"}\n",
            "{\"timestamp\":\"2024-01-01T00:00:00Z\"}\n",
        );
        let observations = load_observations(content);
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].timestamp, 100);
        assert_eq!(observations[1].timestamp, 1704067200);
    }
}
