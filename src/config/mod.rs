pub mod toml_config;

use crate::core::correlator::DEFAULT_TIME_THRESHOLD;
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate, MAX_TIME_THRESHOLD};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_PATH: &str = "correlated_data.csv";

#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(feature = "cli", command(name = "cell-gps-correlator"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Correlate cell tower observations with GPS coordinates")
)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// GPS file (.gps format: timestamp,lat,lon per line)
    #[cfg_attr(feature = "cli", arg(long))]
    pub gps: String,

    /// NDJSON file with cellular data
    #[cfg_attr(feature = "cli", arg(long))]
    pub ndjson: Option<String>,

    /// QMDL file with cellular data
    #[cfg_attr(feature = "cli", arg(long))]
    pub qmdl: Option<String>,

    /// Output file
    #[cfg_attr(feature = "cli", arg(short, long, default_value = DEFAULT_OUTPUT_PATH))]
    pub output: String,

    /// Maximum time difference in seconds for correlation
    #[cfg_attr(feature = "cli", arg(short = 't', long, default_value_t = DEFAULT_TIME_THRESHOLD))]
    pub time_threshold: u64,

    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = OutputFormat::Csv))]
    pub format: OutputFormat,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per phase"))]
    pub monitor: bool,
}

impl CliConfig {
    /// Minimal configuration with defaults for everything but the inputs.
    pub fn new(gps: impl Into<String>, ndjson: Option<String>, qmdl: Option<String>) -> Self {
        Self {
            gps: gps.into(),
            ndjson,
            qmdl,
            output: DEFAULT_OUTPUT_PATH.to_string(),
            time_threshold: DEFAULT_TIME_THRESHOLD,
            format: OutputFormat::Csv,
            verbose: false,
            monitor: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn gps_path(&self) -> &str {
        &self.gps
    }

    fn ndjson_path(&self) -> Option<&str> {
        self.ndjson.as_deref()
    }

    fn qmdl_path(&self) -> Option<&str> {
        self.qmdl.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn time_threshold(&self) -> u64 {
        self.time_threshold
    }

    fn output_format(&self) -> OutputFormat {
        self.format
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_sources(self)
    }
}

/// Checks shared by every configuration front-end.
pub fn validate_sources<C: ConfigProvider>(config: &C) -> Result<()> {
    validation::validate_path("gps", config.gps_path())?;
    validation::validate_cell_sources(config.ndjson_path(), config.qmdl_path())?;
    validation::validate_optional_path("ndjson", config.ndjson_path())?;
    validation::validate_optional_path("qmdl", config.qmdl_path())?;
    validation::validate_path("output", config.output_path())?;
    validation::validate_range(
        "time_threshold",
        config.time_threshold(),
        0,
        MAX_TIME_THRESHOLD,
    )?;
    Ok(())
}
