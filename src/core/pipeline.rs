use crate::adapters::export;
use crate::core::binary_scanner;
use crate::core::correlator::TimeCorrelator;
use crate::core::ndjson_loader;
use crate::core::track_loader;
use crate::domain::model::{CorrelationResult, SourceData};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{CorrelatorError, Result, SourceKind};
use std::path::PathBuf;

/// Reads the configured sources through `S`, correlates them and writes the
/// rendered results back through `S`.
pub struct CorrelationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CorrelationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_source(&self, kind: SourceKind, path: &str) -> Result<Vec<u8>> {
        tracing::debug!("Reading {} from {}", kind, path);
        self.storage.read_file(path).await.map_err(|e| match e {
            CorrelatorError::IoError(source) => CorrelatorError::SourceUnavailable {
                kind,
                path: PathBuf::from(path),
                source,
            },
            other => other,
        })
    }

    async fn read_text_source(&self, kind: SourceKind, path: &str) -> Result<String> {
        let bytes = self.read_source(kind, path).await?;
        String::from_utf8(bytes).map_err(|e| CorrelatorError::SourceUnavailable {
            kind,
            path: PathBuf::from(path),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CorrelationPipeline<S, C> {
    async fn extract(&self) -> Result<SourceData> {
        tracing::info!("Loading GPS data from {}", self.config.gps_path());
        let gps_text = self
            .read_text_source(SourceKind::GpsTrack, self.config.gps_path())
            .await?;
        let track = track_loader::load_track(&gps_text);

        let mut observations = Vec::new();

        if let Some(path) = self.config.ndjson_path() {
            tracing::info!("Loading cellular data from {}", path);
            let text = self.read_text_source(SourceKind::Structured, path).await?;
            observations.extend(ndjson_loader::load_observations(&text));
        }

        if let Some(path) = self.config.qmdl_path() {
            tracing::info!("Scanning QMDL capture {}", path);
            let bytes = self.read_source(SourceKind::Binary, path).await?;
            observations.extend(binary_scanner::scan_observations(&bytes));
        }

        Ok(SourceData {
            track,
            observations,
        })
    }

    async fn transform(&self, data: SourceData) -> Result<Vec<CorrelationResult>> {
        let correlator = TimeCorrelator::new(self.config.time_threshold());
        Ok(correlator.correlate(&data.track, &data.observations))
    }

    async fn load(&self, results: Vec<CorrelationResult>) -> Result<String> {
        let output_path = self.config.output_path();
        let format = self.config.output_format();

        tracing::info!("Exporting correlated data to {} ({:?})", output_path, format);
        let bytes = export::render(&results, format)?;

        tracing::debug!("Writing {} bytes", bytes.len());
        self.storage.write_file(output_path, &bytes).await?;

        tracing::info!("Exported {} correlated observations", results.len());
        Ok(output_path.to_string())
    }
}
