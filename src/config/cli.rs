use crate::app::runner::Stage;
use crate::config::toml_config::TrendsConfig;
use crate::domain::model::Indicator;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "econ-trends")]
#[command(about = "Synthetic US macroeconomic trends: dataset, dashboard, analysis and PDF report")]
pub struct CliConfig {
    /// Optional TOML configuration file; CLI flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Root directory for all relative input/output paths
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Also bundle each command's artifacts into a ZIP archive
    #[arg(long, global = true)]
    pub archive: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU / memory usage per phase")]
    pub monitor: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write the synthetic monthly dataset and its annual aggregate as CSV
    Generate(GenerateArgs),
    /// Render the HTML dashboard and the filtered CSV export
    Dashboard(DashboardArgs),
    /// Summary statistics and GDP regression over the annual CSV
    Analyze(AnalyzeArgs),
    /// Build the PDF report from the latest analysis
    Report,
    /// Run generate, analyze, report and dashboard in order
    All,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub start_year: Option<i32>,

    #[arg(long)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DashboardArgs {
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub year_min: Option<i32>,

    #[arg(long)]
    pub year_max: Option<i32>,

    /// Comma separated, e.g. gdp,inflation,sp500
    #[arg(long, value_delimiter = ',')]
    pub indicators: Vec<Indicator>,

    /// Rolling average window in months (1-12)
    #[arg(long)]
    pub rolling_window: Option<usize>,

    #[arg(long)]
    pub no_correlation: bool,

    /// Projection horizon in months (0-24)
    #[arg(long)]
    pub projection_months: Option<usize>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeArgs {
    /// Annual CSV: Year,GDP,Inflation,Unemployment,InterestRate
    #[arg(long)]
    pub input: Option<String>,
}

impl Command {
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Command::Generate(_) => &[Stage::Generate],
            Command::Dashboard(_) => &[Stage::Dashboard],
            Command::Analyze(_) => &[Stage::Analyze],
            Command::Report => &[Stage::Report],
            Command::All => &Stage::FULL_SEQUENCE,
        }
    }
}

impl CliConfig {
    /// 載入 TOML（若有）後套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<TrendsConfig> {
        let mut config = match &self.config {
            Some(path) => TrendsConfig::from_file(path)?,
            None => TrendsConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TrendsConfig) {
        if let Some(root) = &self.root {
            config.output.root = root.clone();
        }
        if self.archive {
            config.output.archive = true;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
        if self.json_logs {
            config.monitoring.json_logs = true;
        }

        match &self.command {
            Command::Generate(args) => {
                if let Some(seed) = args.seed {
                    config.dataset.seed = seed;
                }
                if let Some(year) = args.start_year {
                    config.dataset.start_year = year;
                }
                if let Some(year) = args.end_year {
                    config.dataset.end_year = year;
                }
            }
            Command::Dashboard(args) => {
                if let Some(seed) = args.seed {
                    config.dataset.seed = seed;
                }
                let options = &mut config.dashboard.options;
                if let Some(year) = args.year_min {
                    options.year_min = year;
                }
                if let Some(year) = args.year_max {
                    options.year_max = year;
                }
                if !args.indicators.is_empty() {
                    options.indicators = args.indicators.clone();
                }
                if let Some(window) = args.rolling_window {
                    options.rolling_window = window;
                }
                if args.no_correlation {
                    options.show_correlation = false;
                }
                if let Some(months) = args.projection_months {
                    options.projection_months = months;
                }
            }
            Command::Analyze(args) => {
                if let Some(input) = &args.input {
                    config.analysis.input = input.clone();
                }
            }
            Command::Report | Command::All => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_overrides() {
        let cli = CliConfig::parse_from([
            "econ-trends",
            "dashboard",
            "--year-min",
            "2021",
            "--indicators",
            "unemployment,interest_rate",
            "--rolling-window",
            "6",
            "--no-correlation",
            "--archive",
        ]);
        let config = cli.resolve().unwrap();
        let options = &config.dashboard.options;
        assert_eq!(options.year_min, 2021);
        assert_eq!(options.year_max, 2025);
        assert_eq!(
            options.indicators,
            vec![Indicator::Unemployment, Indicator::InterestRate]
        );
        assert_eq!(options.rolling_window, 6);
        assert!(!options.show_correlation);
        assert!(config.output.archive);
    }

    #[test]
    fn test_generate_overrides() {
        let cli = CliConfig::parse_from(["econ-trends", "generate", "--seed", "9", "--root", "/tmp/x"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.dataset.seed, 9);
        assert_eq!(config.output.root, "/tmp/x");
    }

    #[test]
    fn test_all_runs_full_sequence() {
        let cli = CliConfig::parse_from(["econ-trends", "all", "--monitor"]);
        assert_eq!(cli.command.stages(), &Stage::FULL_SEQUENCE);
        assert!(cli.resolve().unwrap().monitoring_enabled());
    }

    #[test]
    fn test_invalid_indicator_rejected() {
        let result = CliConfig::try_parse_from(["econ-trends", "dashboard", "--indicators", "bitcoin"]);
        assert!(result.is_err());
    }
}
