use crate::domain::model::{CorrelationResult, SourceData};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
    /// Matched fixes as a GPX 1.1 track, for mapping tools.
    Gpx,
}

pub trait ConfigProvider: Send + Sync {
    fn gps_path(&self) -> &str;
    fn ndjson_path(&self) -> Option<&str>;
    fn qmdl_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn time_threshold(&self) -> u64;
    fn output_format(&self) -> OutputFormat;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceData>;
    async fn transform(&self, data: SourceData) -> Result<Vec<CorrelationResult>>;
    async fn load(&self, results: Vec<CorrelationResult>) -> Result<String>;
}
