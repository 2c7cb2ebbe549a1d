//! Structural validation of configuration documents.
//!
//! Only the document shape is checked here. Whether an entry means anything
//! to its component is decided when the component is built.

use std::collections::HashSet;

use crate::schema::{AutopilotConfig, ScenarioDef};

/// Upper bound on `duration_s / dt_s` for a replayed scenario.
pub const MAX_SCENARIO_STEPS: f64 = 1.0e7;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &AutopilotConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    let mut names = HashSet::new();
    for component in &config.components {
        if component.name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
                context: format!("component of type '{}'", component.kind),
            });
        }
        if component.kind.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "type".to_string(),
                context: format!("component '{}'", component.name),
            });
        }
        if !names.insert(component.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: component.name.clone(),
                context: "components".to_string(),
            });
        }
        if component.entries.iter().any(|e| e.key.trim().is_empty()) {
            return Err(ValidationError::MissingField {
                field: "entry key".to_string(),
                context: format!("component '{}'", component.name),
            });
        }
    }

    if let Some(scenario) = &config.scenario {
        validate_scenario(scenario)?;
    }

    Ok(())
}

fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    if !scenario.dt_s.is_finite() || scenario.dt_s <= 0.0 {
        return Err(invalid("scenario.dt_s", scenario.dt_s, "must be positive and finite"));
    }
    if !scenario.duration_s.is_finite() || scenario.duration_s < 0.0 {
        return Err(invalid(
            "scenario.duration_s",
            scenario.duration_s,
            "must be non-negative and finite",
        ));
    }
    let steps = scenario.duration_s / scenario.dt_s;
    if !steps.is_finite() || steps > MAX_SCENARIO_STEPS {
        return Err(invalid(
            "scenario.duration_s / scenario.dt_s",
            steps,
            &format!("step count must not exceed {MAX_SCENARIO_STEPS}"),
        ));
    }
    for (path, value) in &scenario.initial {
        if !value.is_finite() {
            return Err(invalid(&format!("scenario.initial.{path}"), *value, "must be finite"));
        }
    }
    for (idx, event) in scenario.events.iter().enumerate() {
        if !event.time_s.is_finite() || event.time_s < 0.0 {
            return Err(invalid(
                &format!("scenario.events[{idx}].time_s"),
                event.time_s,
                "must be non-negative and finite",
            ));
        }
        if !event.value.is_finite() {
            return Err(invalid(
                &format!("scenario.events[{idx}].value"),
                event.value,
                "must be finite",
            ));
        }
        if event.property.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "property".to_string(),
                context: format!("scenario.events[{idx}]"),
            });
        }
    }
    Ok(())
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
