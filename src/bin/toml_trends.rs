use clap::Parser;
use econ_trends::domain::model::Indicator;
use econ_trends::utils::{logger, validation::Validate};
use econ_trends::{run_stages, Stage, TrendsConfig};

#[derive(Parser)]
#[command(name = "toml-trends")]
#[command(about = "Run the full econ-trends sequence from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "econ-trends.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be produced without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TrendsConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.monitoring.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based econ-trends");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run_stages(&Stage::FULL_SEQUENCE, &config, monitor_enabled).await {
        Ok(outputs) => {
            println!("✅ econ-trends completed successfully!");
            for output in outputs {
                println!("📁 Output saved to: {}/{}", config.output.root, output);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ econ-trends failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TrendsConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Dataset: {}-{} (seed {})",
        config.dataset.start_year, config.dataset.end_year, config.dataset.seed
    );
    println!("  Output root: {}", config.output.root);
    println!("  Archive: {}", config.output.archive);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TrendsConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("⚙️ Stages (in order):");
    for (i, stage) in Stage::FULL_SEQUENCE.iter().enumerate() {
        println!("  {}. {}", i + 1, stage);
    }

    println!();
    println!("📊 Dashboard:");
    let options = &config.dashboard.options;
    println!("  Years: {}-{}", options.year_min, options.year_max);
    println!(
        "  Indicators: {}",
        options
            .indicators
            .iter()
            .map(Indicator::label)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Rolling window: {} months", options.rolling_window);
    println!("  Correlation matrix: {}", options.show_correlation);
    println!("  Projection: {} months", options.projection_months);

    println!();
    println!("💾 Files that would be written under {}:", config.output.root);
    for path in [
        &config.dataset.monthly_csv,
        &config.dataset.annual_csv,
        &config.analysis.chart,
        &config.analysis.summary,
        &config.report.output,
        &config.dashboard.html,
        &config.dashboard.filtered_csv,
    ] {
        println!("  {}", path);
    }
    if config.output.archive {
        println!("  results/<stage>_artifacts.zip");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
