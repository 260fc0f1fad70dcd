pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use config::{toml_config::TomlConfig, CliConfig};
pub use core::{correlator::TimeCorrelator, etl::CorrelationEngine, pipeline::CorrelationPipeline};
pub use domain::model::{
    CellObservation, CorrelationResult, FixMatch, GpsFix, ObservationSource, Track,
};
pub use domain::ports::OutputFormat;
pub use utils::error::{CorrelatorError, Result};
