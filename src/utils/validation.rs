use crate::utils::error::{Result, TrendsError};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TrendsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TrendsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(TrendsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(TrendsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrendsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TrendsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.directory", "results").is_ok());
        assert!(validate_path("output.directory", "").is_err());
        assert!(validate_path("output.directory", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("dashboard.rolling_window", 3, 1, 12).is_ok());
        assert!(validate_range("dashboard.rolling_window", 0, 1, 12).is_err());
        assert!(validate_range("dashboard.projection_months", 25, 0, 24).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("analysis.input", "data/usa.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("analysis.input", "data/USA.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("analysis.input", "data/usa.xlsx", &["csv"]).is_err());
        assert!(validate_file_extension("analysis.input", "data/usa", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("report.title", "Report").is_ok());
        assert!(validate_non_empty_string("report.title", "   ").is_err());
    }
}
