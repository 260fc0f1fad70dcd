//! Plain-text GPS track parsing (`timestamp,lat,lon` per line).

use crate::domain::model::{GpsFix, Track};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackLineError {
    #[error("expected 3 comma-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Parses one non-blank track line.
///
/// The timestamp may be written as a float; fractional seconds are truncated.
pub fn parse_track_line(line: &str) -> Result<GpsFix, TrackLineError> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != 3 {
        return Err(TrackLineError::FieldCount { found: parts.len() });
    }

    let raw_timestamp = parse_number("timestamp", parts[0])?;
    let timestamp = truncate_seconds(raw_timestamp).ok_or_else(|| TrackLineError::InvalidNumber {
        field: "timestamp",
        value: parts[0].trim().to_string(),
    })?;
    let latitude = parse_number("latitude", parts[1])?;
    let longitude = parse_number("longitude", parts[2])?;

    Ok(GpsFix::new(timestamp, latitude, longitude))
}

/// Loads a whole track. Malformed lines are logged and skipped; the result is
/// sorted ascending by timestamp.
pub fn load_track(content: &str) -> Track {
    let mut fixes = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_track_line(line) {
            Ok(fix) => fixes.push(fix),
            Err(e) => tracing::warn!("Skipping GPS line {}: {} ({})", idx + 1, e, line),
        }
    }

    let track = Track::from_fixes(fixes);
    tracing::info!("Loaded {} GPS points", track.len());
    track
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, TrackLineError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TrackLineError::InvalidNumber {
            field,
            value: raw.trim().to_string(),
        })
}

/// Float seconds to whole seconds, discarding the fraction. `None` for values
/// that have no integer representation (NaN, infinities, out of range).
pub(crate) fn truncate_seconds(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}
