use crate::domain::dashboard::DashboardOptions;
use crate::domain::synthetic::{DEFAULT_END_YEAR, DEFAULT_SEED, DEFAULT_START_YEAR};
use crate::utils::error::{Result, TrendsError};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// 整個工具的設定；每個區段都可省略，使用預設值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    pub dataset: DatasetConfig,
    pub dashboard: DashboardConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub seed: u64,
    pub start_year: i32,
    pub end_year: i32,
    pub monthly_csv: String,
    pub annual_csv: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            monthly_csv: "data/us_economic_monthly.csv".to_string(),
            annual_csv: "data/dummy_data_usa.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    #[serde(flatten)]
    pub options: DashboardOptions,
    pub html: String,
    pub filtered_csv: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            options: DashboardOptions::default(),
            html: "results/dashboard.html".to_string(),
            filtered_csv: "results/us_economic_filtered.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input: String,
    pub chart: String,
    pub summary: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: "data/dummy_data_usa.csv".to_string(),
            chart: "results/us_gdp_trend.svg".to_string(),
            summary: "results/us_gdp_analysis.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output: String,
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: "results/us_economic_report_2025.pdf".to_string(),
            title: "United States Economic Trends Report".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 所有相對路徑的根目錄
    pub root: String,
    /// 另外把每個 pipeline 的產出打包成 ZIP
    pub archive: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            archive: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"))
}

impl TrendsConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrendsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TrendsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RESULTS_DIR})；未設定的保留原字串
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TrendsError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        })
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for TrendsConfig {
    fn validate(&self) -> Result<()> {
        if self.dataset.start_year > self.dataset.end_year {
            return Err(TrendsError::InvalidConfigValueError {
                field: "dataset.start_year".to_string(),
                value: self.dataset.start_year.to_string(),
                reason: format!("must not be after end_year ({})", self.dataset.end_year),
            });
        }

        validate_path("output.root", &self.output.root)?;
        validate_path("dataset.monthly_csv", &self.dataset.monthly_csv)?;
        validate_path("dataset.annual_csv", &self.dataset.annual_csv)?;
        validate_path("dashboard.html", &self.dashboard.html)?;
        validate_path("dashboard.filtered_csv", &self.dashboard.filtered_csv)?;
        validate_path("analysis.chart", &self.analysis.chart)?;
        validate_path("analysis.summary", &self.analysis.summary)?;
        validate_path("report.output", &self.report.output)?;

        validate_file_extension("dataset.annual_csv", &self.dataset.annual_csv, &["csv"])?;
        validate_file_extension("analysis.input", &self.analysis.input, &["csv"])?;
        validate_file_extension("report.output", &self.report.output, &["pdf"])?;
        validate_non_empty_string("report.title", &self.report.title)?;

        self.dashboard.options.validate()
    }
}
