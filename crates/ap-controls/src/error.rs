//! Error types for control system operations.

use ap_core::CoreError;
use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while configuring or assembling controllers.
///
/// Ticking a configured controller never fails; everything here surfaces at
/// bind time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A configuration entry could not be bound to a component.
    #[error("Configuration error in '{component}': {what}")]
    Configuration { component: String, what: String },

    /// A live input could not be resolved.
    #[error("Input unavailable: {what}")]
    InputUnavailable { what: String },

    /// No factory is registered for the requested component type.
    #[error("Unknown component type: {kind}")]
    UnknownComponentType { kind: String },

    /// Two components share a name.
    #[error("Duplicate component name: {name}")]
    DuplicateComponent { name: String },

    /// Numeric validation failure from the core helpers.
    #[error(transparent)]
    Numeric(#[from] CoreError),
}

impl ControlError {
    pub(crate) fn config(component: &str, what: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.to_string(),
            what: what.into(),
        }
    }
}
