//! Nearest-in-time matching of observations against a GPS track.

use crate::domain::model::{CellObservation, CorrelationResult, FixMatch, GpsFix, Track};

pub const DEFAULT_TIME_THRESHOLD: u64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct TimeCorrelator {
    time_threshold: u64,
}

impl Default for TimeCorrelator {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_THRESHOLD)
    }
}

impl TimeCorrelator {
    pub fn new(time_threshold: u64) -> Self {
        Self { time_threshold }
    }

    pub fn time_threshold(&self) -> u64 {
        self.time_threshold
    }

    /// Matches one timestamp. A fix exactly `time_threshold` seconds away
    /// still matches.
    pub fn match_timestamp(&self, track: &Track, timestamp: i64) -> FixMatch {
        match nearest_fix(track, timestamp) {
            Some((fix, diff)) if diff <= self.time_threshold => FixMatch::Matched {
                fix,
                time_diff_seconds: diff,
            },
            _ => FixMatch::Unmatched,
        }
    }

    /// One result per observation, in input order.
    pub fn correlate(
        &self,
        track: &Track,
        observations: &[CellObservation],
    ) -> Vec<CorrelationResult> {
        tracing::info!(
            "Correlating {} cell observations with {} GPS points",
            observations.len(),
            track.len()
        );

        let results: Vec<CorrelationResult> = observations
            .iter()
            .map(|obs| CorrelationResult {
                observation: obs.clone(),
                fix_match: self.match_timestamp(track, obs.timestamp),
            })
            .collect();

        let matched = results.iter().filter(|r| r.is_matched()).count();
        tracing::info!(
            "Successfully correlated {}/{} observations",
            matched,
            results.len()
        );
        results
    }
}

/// Closest fix to `timestamp` and its distance in seconds.
///
/// On equal distances the fix that comes first in the track wins: the
/// earlier timestamp, and among identical timestamps the first one loaded.
pub fn nearest_fix(track: &Track, timestamp: i64) -> Option<(GpsFix, u64)> {
    let fixes = track.fixes();
    let idx = fixes.partition_point(|f| f.timestamp < timestamp);

    // first fix of the run just below `timestamp`
    let before = idx.checked_sub(1).map(|last| {
        let ts = fixes[last].timestamp;
        fixes[fixes[..last].partition_point(|f| f.timestamp < ts)]
    });
    // first fix at or above `timestamp`
    let after = fixes.get(idx).copied();

    let with_diff = |fix: GpsFix| (fix, fix.timestamp.abs_diff(timestamp));
    match (before.map(with_diff), after.map(with_diff)) {
        (Some(b), Some(a)) => Some(if b.1 <= a.1 { b } else { a }),
        (b, a) => b.or(a),
    }
}
