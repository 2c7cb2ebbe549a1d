//! ap-config: autopilot configuration file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{MAX_SCENARIO_STEPS, ValidationError, validate_config};

/// Newest configuration format version this crate reads and writes.
pub const LATEST_VERSION: u32 = 1;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ConfigResult<AutopilotConfig> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

/// Parse and validate a YAML document.
pub fn from_yaml_str(content: &str) -> ConfigResult<AutopilotConfig> {
    let config: AutopilotConfig = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_yaml(path: &std::path::Path, config: &AutopilotConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ConfigResult<AutopilotConfig> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

/// Parse and validate a JSON document.
pub fn from_json_str(content: &str) -> ConfigResult<AutopilotConfig> {
    let config: AutopilotConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_json(path: &std::path::Path, config: &AutopilotConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
