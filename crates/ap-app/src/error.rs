//! Error types for the ap-app service layer.

use std::path::PathBuf;

/// Application error type shared by every front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write configuration file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Autopilot compilation failed: {0}")]
    Compile(String),

    #[error("Configuration '{0}' has no scenario to run")]
    NoScenario(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ap-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ap_config::ConfigError> for AppError {
    fn from(err: ap_config::ConfigError) -> Self {
        match err {
            ap_config::ConfigError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<ap_config::ValidationError> for AppError {
    fn from(err: ap_config::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ap_controls::ControlError> for AppError {
    fn from(err: ap_controls::ControlError) -> Self {
        AppError::Compile(err.to_string())
    }
}
