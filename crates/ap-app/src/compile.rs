//! Build a runnable autopilot from a configuration document.

use ap_config::AutopilotConfig;
use ap_controls::{Autopilot, ComponentRegistry, PropertyTree};

use crate::error::{AppError, AppResult};

/// Build every configured component, bound to `props`, in file order.
pub fn compile(
    config: &AutopilotConfig,
    registry: &ComponentRegistry,
    props: &PropertyTree,
) -> AppResult<Autopilot> {
    let mut autopilot = Autopilot::new(config.name.clone());
    for def in &config.components {
        let entries = def.entry_pairs();
        let component = registry
            .build(&def.kind, &def.name, &entries, props)
            .map_err(|e| AppError::Compile(format!("component '{}': {e}", def.name)))?;
        autopilot.add(component)?;
        tracing::debug!(component = %def.name, kind = %def.kind, "compiled component");
    }
    Ok(autopilot)
}
