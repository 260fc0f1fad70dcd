//! Renders correlation results for the output file.

use crate::domain::model::CorrelationResult;
use crate::domain::ports::OutputFormat;
use crate::utils::error::{CorrelatorError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub const HEADER: [&str; 18] = [
    "cell_timestamp",
    "cell_datetime",
    "gps_timestamp",
    "gps_datetime",
    "latitude",
    "longitude",
    "time_diff_seconds",
    "cell_id",
    "lac",
    "tac",
    "mcc",
    "mnc",
    "pci",
    "rsrp",
    "rsrq",
    "rssi",
    "rat",
    "source",
];

/// Written in the time-diff column of delimited output for unmatched rows.
pub const UNMATCHED_DIFF: &str = "inf";

/// One flattened output row.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub cell_timestamp: i64,
    pub cell_datetime: Option<String>,
    pub gps_timestamp: Option<i64>,
    pub gps_datetime: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_diff_seconds: Option<f64>,
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
    pub source: &'static str,
}

impl From<&CorrelationResult> for ExportRow {
    fn from(result: &CorrelationResult) -> Self {
        let obs = &result.observation;
        let fix = result.matched_fix();

        Self {
            cell_timestamp: obs.timestamp,
            cell_datetime: utc_datetime(obs.timestamp),
            gps_timestamp: fix.map(|f| f.timestamp),
            gps_datetime: fix.and_then(|f| utc_datetime(f.timestamp)),
            latitude: fix.map(|f| f.latitude),
            longitude: fix.map(|f| f.longitude),
            time_diff_seconds: result.time_diff_seconds(),
            cell_id: obs.cell_id.clone(),
            lac: obs.lac.clone(),
            tac: obs.tac.clone(),
            mcc: obs.mcc.clone(),
            mnc: obs.mnc.clone(),
            pci: obs.pci.clone(),
            rsrp: obs.rsrp.clone(),
            rsrq: obs.rsrq.clone(),
            rssi: obs.rssi.clone(),
            rat: obs.rat.clone(),
            source: obs.source.as_str(),
        }
    }
}

impl ExportRow {
    fn delimited_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.cell_timestamp.to_string(),
            self.cell_datetime.clone().unwrap_or_default(),
            opt_text(self.gps_timestamp),
            self.gps_datetime.clone().unwrap_or_default(),
            self.latitude.map(float_text).unwrap_or_default(),
            self.longitude.map(float_text).unwrap_or_default(),
            match self.time_diff_seconds {
                Some(diff) => diff.to_string(),
                None => UNMATCHED_DIFF.to_string(),
            },
        ];
        fields.extend(
            [
                &self.cell_id,
                &self.lac,
                &self.tac,
                &self.mcc,
                &self.mnc,
                &self.pci,
                &self.rsrp,
                &self.rsrq,
                &self.rssi,
                &self.rat,
            ]
            .into_iter()
            .map(|v| v.as_ref().map(value_text).unwrap_or_default()),
        );
        fields.push(self.source.to_string());
        fields
    }
}

fn utc_datetime(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.to_rfc3339())
}

fn opt_text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Shortest round-trip form with a decimal point kept, e.g. `10.0`.
/// Very small or large magnitudes switch to exponent form (`1e-7`).
fn float_text(value: f64) -> String {
    format!("{:?}", value)
}

/// Strings unquoted, everything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render(results: &[CorrelationResult], format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => render_delimited(results, b','),
        OutputFormat::Tsv => render_delimited(results, b'\t'),
        OutputFormat::Json => render_json(results),
        OutputFormat::Gpx => Ok(render_gpx(results).into_bytes()),
    }
}

fn render_delimited(results: &[CorrelationResult], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for result in results {
        writer.write_record(ExportRow::from(result).delimited_fields())?;
    }

    writer
        .into_inner()
        .map_err(|e| CorrelatorError::IoError(e.into_error()))
}

fn render_json(results: &[CorrelationResult]) -> Result<Vec<u8>> {
    let rows: Vec<ExportRow> = results.iter().map(ExportRow::from).collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}

const GPX_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="cell-gps-correlator" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata>
    <name>Correlated cellular observations</name>
  </metadata>
  <trk>
    <name>Matched GPS fixes</name>
    <trkseg>
"#;

const GPX_FOOTER: &str = "    </trkseg>\n  </trk>\n</gpx>\n";

/// One track point per matched observation, in result order. Unmatched
/// observations have no position and are left out.
fn render_gpx(results: &[CorrelationResult]) -> String {
    let mut gpx = String::from(GPX_HEADER);

    for result in results {
        let Some(fix) = result.matched_fix() else {
            continue;
        };
        let obs = &result.observation;
        let cell = obs.cell_id.as_ref().map(value_text).unwrap_or_default();

        gpx.push_str(&format!(
            "      <trkpt lat=\"{}\" lon=\"{}\">\n",
            float_text(fix.latitude),
            float_text(fix.longitude)
        ));
        if let Some(time) = utc_datetime(fix.timestamp) {
            gpx.push_str(&format!("        <time>{}</time>\n", time));
        }
        gpx.push_str(&format!(
            "        <desc>cell {} at {} ({})</desc>\n",
            xml_escape(&cell),
            obs.timestamp,
            obs.source.as_str()
        ));
        gpx.push_str("      </trkpt>\n");
    }

    gpx.push_str(GPX_FOOTER);
    gpx
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
