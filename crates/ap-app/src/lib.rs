//! Shared application service layer for the autopilot tools.
//!
//! Front ends load a configuration, compile it into an [`ap_controls::Autopilot`]
//! and replay its scenario through the functions re-exported here.

pub mod compile;
pub mod config_service;
pub mod error;
pub mod run_service;

pub use compile::compile;
pub use config_service::{
    ComponentSummary, list_components, load_config, save_config, validate_config,
};
pub use error::{AppError, AppResult};
pub use run_service::{RunResult, TraceRow, run_scenario};
