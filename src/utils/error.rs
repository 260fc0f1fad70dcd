use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrelatorError {
    #[error("{kind} source unavailable at {}: {source}", path.display())]
    SourceUnavailable {
        kind: SourceKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, CorrelatorError>;

/// Which input a fatal read failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    GpsTrack,
    Structured,
    Binary,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::GpsTrack => write!(f, "GPS track"),
            SourceKind::Structured => write!(f, "NDJSON observation"),
            SourceKind::Binary => write!(f, "QMDL capture"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Bad input or configuration; fixable by the user
    High,
    /// Results could not be written
    Critical,
}

impl CorrelatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CorrelatorError::SourceUnavailable { .. } => ErrorCategory::Input,
            CorrelatorError::IoError(_)
            | CorrelatorError::CsvError(_)
            | CorrelatorError::SerializationError(_) => ErrorCategory::Output,
            CorrelatorError::ConfigError { .. }
            | CorrelatorError::InvalidConfigValueError { .. }
            | CorrelatorError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CorrelatorError::SourceUnavailable { kind, path, .. } => format!(
                "Check that the {} file '{}' exists and is readable",
                kind,
                path.display()
            ),
            CorrelatorError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            CorrelatorError::CsvError(_) | CorrelatorError::SerializationError(_) => {
                "Try a different output format or inspect the input data".to_string()
            }
            CorrelatorError::InvalidConfigValueError { field, .. }
            | CorrelatorError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            CorrelatorError::ConfigError { .. } => {
                "Specify at least one cellular source (--ndjson or --qmdl)".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }

    /// 對應程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
