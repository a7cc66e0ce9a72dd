use crate::domain::statistics::StatsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendsError {
    #[error("Statistics error: {0}")]
    StatsError(#[from] StatsError),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Chart rendering error: {message}")]
    ChartError { message: String },

    #[error("PDF rendering error: {message}")]
    PdfError { message: String },

    #[error("Template rendering error: {message}")]
    TemplateError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// 錯誤分類，用於日誌與監控
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Statistics,
    Io,
    Rendering,
    Processing,
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,   // 可重試
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl TrendsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrendsError::ConfigError { .. }
            | TrendsError::ConfigValidationError { .. }
            | TrendsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TrendsError::StatsError(_) => ErrorCategory::Statistics,
            TrendsError::IoError(_) | TrendsError::ZipError(_) => ErrorCategory::Io,
            TrendsError::ChartError { .. }
            | TrendsError::PdfError { .. }
            | TrendsError::TemplateError { .. } => ErrorCategory::Rendering,
            TrendsError::CsvError(_)
            | TrendsError::SerializationError(_)
            | TrendsError::ProcessingError { .. }
            | TrendsError::ValidationError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Statistics | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Rendering => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TrendsError::StatsError(StatsError::EmptyInput) => {
                "Widen the selected year range so it contains at least one row"
            }
            TrendsError::StatsError(StatsError::ZeroVariance { .. }) => {
                "Select a range with more variation; constant series have no correlation or trend"
            }
            TrendsError::StatsError(_) => "Check the input series for invalid or mismatched values",
            TrendsError::CsvError(_) => {
                "Make sure the CSV has a header row followed by Year,GDP,Inflation,Unemployment,InterestRate"
            }
            TrendsError::IoError(_) => {
                "Check that the input file exists and the output directory is writable"
            }
            TrendsError::ZipError(_) => "Disable output.archive or free disk space and retry",
            TrendsError::SerializationError(_) => {
                "Re-run the analyze command to regenerate the analysis JSON"
            }
            TrendsError::ConfigError { .. }
            | TrendsError::ConfigValidationError { .. }
            | TrendsError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again (see --help)"
            }
            TrendsError::ChartError { .. }
            | TrendsError::PdfError { .. }
            | TrendsError::TemplateError { .. } => "Retry; if it persists, report the rendering error",
            TrendsError::ProcessingError { .. } | TrendsError::ValidationError { .. } => {
                "Check the input data and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrendsError::StatsError(e) => format!("Statistics could not be computed: {}", e),
            TrendsError::IoError(e) => format!("File operation failed: {}", e),
            TrendsError::CsvError(e) => format!("Could not read the CSV data: {}", e),
            TrendsError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Setting '{}' = '{}' is invalid: {}", field, value, reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrendsError>;
