//! Heuristic timestamp recovery from raw QMDL captures.
//!
//! The capture framing is not decoded. The scanner slides over every byte
//! offset looking for a `7E 00` marker and reads the 8 bytes starting four
//! bytes after it as a little-endian microsecond count since 2000-01-01.
//! That time base is an approximation: the output is only meant to be close
//! enough for temporal correlation.

use crate::domain::model::{CellObservation, ObservationSource};

pub const FRAME_MARKER: [u8; 2] = [0x7E, 0x00];

/// Bytes that must remain at an offset for it to be examined.
pub const MIN_WINDOW: usize = 16;

/// Offset of the timestamp from the marker.
const TIMESTAMP_OFFSET: usize = 4;

/// Unix seconds at 2000-01-01T00:00:00Z.
pub const EPOCH_2000: i64 = 946_684_800;

/// Exclusive upper bound on accepted timestamps (2038-01-19).
pub const MAX_PLAUSIBLE_TIMESTAMP: i64 = 2_147_483_647;

pub const MAX_OBSERVATIONS: usize = 1000;

/// Converts a raw capture timestamp to Unix seconds. `None` on overflow.
pub fn raw_to_unix_seconds(raw: u64) -> Option<i64> {
    i64::try_from(raw / 1_000_000).ok()?.checked_add(EPOCH_2000)
}

pub fn is_plausible(unix_seconds: i64) -> bool {
    unix_seconds > EPOCH_2000 && unix_seconds < MAX_PLAUSIBLE_TIMESTAMP
}

/// Reads a candidate timestamp at `offset`, if a marker starts there.
fn candidate_at(data: &[u8], offset: usize) -> Option<i64> {
    let window = data.get(offset..offset.checked_add(MIN_WINDOW)?)?;
    if window[..2] != FRAME_MARKER {
        return None;
    }

    let start = TIMESTAMP_OFFSET;
    let low = u32::from_le_bytes(window.get(start..start + 4)?.try_into().ok()?);
    let high = u32::from_le_bytes(window.get(start + 4..start + 8)?.try_into().ok()?);
    let raw = (u64::from(high) << 32) | u64::from(low);

    raw_to_unix_seconds(raw).filter(|ts| is_plausible(*ts))
}

/// Scans `data` and returns at most [`MAX_OBSERVATIONS`] timestamp-only
/// observations, in buffer order.
pub fn scan_observations(data: &[u8]) -> Vec<CellObservation> {
    let mut observations = Vec::new();
    let mut offset = 0usize;

    while data.len().saturating_sub(offset) >= MIN_WINDOW {
        if let Some(timestamp) = candidate_at(data, offset) {
            observations.push(CellObservation::bare(
                timestamp,
                ObservationSource::BinaryHeuristic,
            ));
            if observations.len() >= MAX_OBSERVATIONS {
                tracing::debug!("QMDL scan stopped at offset {} (record cap)", offset);
                break;
            }
        }
        offset += 1;
    }

    tracing::info!(
        "Extracted {} timestamped observations from QMDL (heuristic scan)",
        observations.len()
    );
    observations
}
