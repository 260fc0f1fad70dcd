use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One GPS position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Unix epoch seconds, UTC
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsFix {
    pub fn new(timestamp: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
        }
    }
}

/// A GPS track whose fixes are always in ascending timestamp order.
///
/// Fixes with equal timestamps keep the order they were supplied in, so
/// "first in sequence order" is well defined for the correlator's tie-break.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    fixes: Vec<GpsFix>,
}

impl Track {
    pub fn from_fixes(mut fixes: Vec<GpsFix>) -> Self {
        // sort_by_key is stable
        fixes.sort_by_key(|fix| fix.timestamp);
        Self { fixes }
    }

    pub fn fixes(&self) -> &[GpsFix] {
        &self.fixes
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

/// Where an observation was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationSource {
    /// Line-delimited JSON feed
    #[serde(rename = "ndjson")]
    Structured,
    /// Marker scan over a raw QMDL capture
    #[serde(rename = "qmdl")]
    BinaryHeuristic,
}

impl ObservationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationSource::Structured => "ndjson",
            ObservationSource::BinaryHeuristic => "qmdl",
        }
    }
}

/// One cellular measurement.
///
/// Radio parameters are carried exactly as the feed supplied them, so each is
/// an optional JSON value: `None` means the key was absent (or `null`), which
/// stays distinguishable from a real `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellObservation {
    /// Unix epoch seconds, always > 0
    pub timestamp: i64,
    pub cell_id: Option<Value>,
    pub lac: Option<Value>,
    pub tac: Option<Value>,
    pub mcc: Option<Value>,
    pub mnc: Option<Value>,
    pub pci: Option<Value>,
    pub rsrp: Option<Value>,
    pub rsrq: Option<Value>,
    pub rssi: Option<Value>,
    pub rat: Option<Value>,
    pub source: ObservationSource,
}

impl CellObservation {
    /// An observation carrying only a timestamp.
    pub fn bare(timestamp: i64, source: ObservationSource) -> Self {
        Self {
            timestamp,
            cell_id: None,
            lac: None,
            tac: None,
            mcc: None,
            mnc: None,
            pci: None,
            rsrp: None,
            rsrq: None,
            rssi: None,
            rat: None,
            source,
        }
    }
}

/// Outcome of looking up the nearest fix for one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixMatch {
    Matched { fix: GpsFix, time_diff_seconds: u64 },
    /// No fix within the threshold; carries no distance at all.
    Unmatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub observation: CellObservation,
    pub fix_match: FixMatch,
}

impl CorrelationResult {
    pub fn matched_fix(&self) -> Option<&GpsFix> {
        match &self.fix_match {
            FixMatch::Matched { fix, .. } => Some(fix),
            FixMatch::Unmatched => None,
        }
    }

    pub fn time_diff_seconds(&self) -> Option<f64> {
        match self.fix_match {
            FixMatch::Matched {
                time_diff_seconds, ..
            } => Some(time_diff_seconds as f64),
            FixMatch::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.fix_match, FixMatch::Matched { .. })
    }
}

/// Everything the extract phase produces.
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub track: Track,
    /// Structured records first, then binary records, each in load order
    pub observations: Vec<CellObservation>,
}
