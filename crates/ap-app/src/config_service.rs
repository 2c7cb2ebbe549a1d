//! Configuration loading, saving, validation, and introspection.

use std::path::Path;

use ap_config::AutopilotConfig;
use ap_controls::{ComponentRegistry, PropertyTree};

use crate::compile::compile;
use crate::error::{AppError, AppResult};

/// Summary of a component for listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComponentSummary {
    pub name: String,
    pub kind: String,
    pub entry_count: usize,
    /// Distinct entry keys in first-seen order.
    pub keys: Vec<String>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a configuration file. `.json` files are read as JSON, anything else
/// as YAML.
pub fn load_config(path: &Path) -> AppResult<AutopilotConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = if is_json(path) {
        ap_config::from_json_str(&content)?
    } else {
        ap_config::from_yaml_str(&content)?
    };
    tracing::debug!(path = %path.display(), components = config.components.len(), "loaded configuration");
    Ok(config)
}

/// Save a configuration file in the format implied by its extension.
pub fn save_config(path: &Path, config: &AutopilotConfig) -> AppResult<()> {
    ap_config::validate_config(config)?;
    let content = if is_json(path) {
        serde_json::to_string_pretty(config)
            .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {e}")))?
    } else {
        serde_yaml::to_string(config)
            .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {e}")))?
    };

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Validate structure, then bind every component against a scratch property
/// tree so configuration errors surface before anything runs.
pub fn validate_config(config: &AutopilotConfig, registry: &ComponentRegistry) -> AppResult<()> {
    ap_config::validate_config(config)?;
    for component in &config.components {
        if !registry.contains(&component.kind) {
            return Err(AppError::Validation(format!(
                "Component '{}' has unknown type '{}'",
                component.name, component.kind
            )));
        }
    }
    compile(config, registry, &PropertyTree::new())?;
    Ok(())
}

/// List all components with summaries.
pub fn list_components(config: &AutopilotConfig) -> Vec<ComponentSummary> {
    config
        .components
        .iter()
        .map(|component| {
            let mut keys: Vec<String> = Vec::new();
            for entry in &component.entries {
                if !keys.contains(&entry.key) {
                    keys.push(entry.key.clone());
                }
            }
            ComponentSummary {
                name: component.name.clone(),
                kind: component.kind.clone(),
                entry_count: component.entries.len(),
                keys,
            }
        })
        .collect()
}
