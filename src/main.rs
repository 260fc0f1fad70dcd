use cell_gps_correlator::utils::{logger, validation::Validate};
use cell_gps_correlator::{CliConfig, CorrelationEngine, CorrelationPipeline, LocalStorage};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting cell-gps-correlator");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = CorrelationPipeline::new(LocalStorage::default(), config);
    let mut engine = CorrelationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!("\nCorrelation complete! Results saved to {}", summary.output_path);
            println!(
                "Matched {} observations with GPS coordinates",
                summary.matched
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Correlation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }
}
