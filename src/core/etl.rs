use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub observations: usize,
    pub matched: usize,
}

/// Runs extract, transform and load strictly one after another.
pub struct CorrelationEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CorrelationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        tracing::info!("Starting correlation run");

        let data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} GPS points and {} cell observations",
            data.track.len(),
            data.observations.len()
        );
        self.monitor.log_stats("Extract");

        let results = self.pipeline.transform(data).await?;
        let observations = results.len();
        let matched = results.iter().filter(|r| r.is_matched()).count();
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(results).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!(
            "Matched {} of {} observations with GPS coordinates",
            matched,
            observations
        );

        Ok(RunSummary {
            output_path,
            observations,
            matched,
        })
    }
}
