use cell_gps_correlator::domain::ports::ConfigProvider;
use cell_gps_correlator::utils::{logger, validation::Validate};
use cell_gps_correlator::{CorrelationEngine, CorrelationPipeline, LocalStorage, TomlConfig};
use clap::Parser;
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-correlate")]
#[command(about = "Cell/GPS correlation driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "correlator.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Validate the configuration and show what would be processed
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        if !perform_dry_run(&config) {
            eprintln!("❌ One or more configured inputs are missing");
            std::process::exit(1);
        }
        return;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let pipeline = CorrelationPipeline::new(LocalStorage::default(), config);
    let mut engine = CorrelationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Correlation completed successfully!");
            println!("✅ Results saved to: {}", summary.output_path);
            println!(
                "📍 Matched {}/{} observations",
                summary.matched, summary.observations
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

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  🛰  GPS track: {}", config.gps_path());
    if let Some(path) = config.ndjson_path() {
        tracing::info!("  📶 NDJSON: {}", path);
    }
    if let Some(path) = config.qmdl_path() {
        tracing::info!("  📦 QMDL: {}", path);
    }
    tracing::info!("  ⏱  Time threshold: {}s", config.time_threshold());
    tracing::info!(
        "  💾 Output: {} ({:?})",
        config.output_path(),
        config.output_format()
    );
}

/// Reports each configured input; false if any of them is missing.
fn perform_dry_run(config: &TomlConfig) -> bool {
    let inputs = [
        Some(("GPS track", config.gps_path())),
        config.ndjson_path().map(|p| ("NDJSON", p)),
        config.qmdl_path().map(|p| ("QMDL", p)),
    ];

    let mut all_found = true;
    for (label, path) in inputs.into_iter().flatten() {
        if Path::new(path).is_file() {
            tracing::info!("✅ {} found: {}", label, path);
        } else {
            tracing::warn!("⚠️  {} missing: {}", label, path);
            all_found = false;
        }
    }
    all_found
}
