pub mod binary_scanner;
pub mod correlator;
pub mod etl;
pub mod ndjson_loader;
pub mod pipeline;
pub mod track_loader;

pub use crate::domain::model::{CellObservation, CorrelationResult, GpsFix, SourceData, Track};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
