use crate::utils::error::{CorrelatorError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Longest accepted correlation window: one year.
pub const MAX_TIME_THRESHOLD: u64 = 86_400 * 365;

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CorrelatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CorrelatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_optional_path(field_name: &str, path: Option<&str>) -> Result<()> {
    match path {
        Some(p) => validate_path(field_name, p),
        None => Ok(()),
    }
}

/// At least one cellular source must be configured before the core runs.
pub fn validate_cell_sources(ndjson: Option<&str>, qmdl: Option<&str>) -> Result<()> {
    if ndjson.is_none() && qmdl.is_none() {
        return Err(CorrelatorError::ConfigError {
            message: "Must specify either an NDJSON or a QMDL source".to_string(),
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
        return Err(CorrelatorError::InvalidConfigValueError {
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
        assert!(validate_path("gps", "track.gps").is_ok());
        assert!(validate_path("gps", "").is_err());
        assert!(validate_path("gps", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_cell_sources() {
        assert!(validate_cell_sources(Some("a.ndjson"), None).is_ok());
        assert!(validate_cell_sources(None, Some("a.qmdl")).is_ok());
        assert!(matches!(
            validate_cell_sources(None, None),
            Err(CorrelatorError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("time_threshold", 30u64, 0, MAX_TIME_THRESHOLD).is_ok());
        assert!(validate_range("time_threshold", MAX_TIME_THRESHOLD + 1, 0, MAX_TIME_THRESHOLD).is_err());
    }
}
