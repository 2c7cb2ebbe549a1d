//! Component framework shared by every autopilot element.
//!
//! A component is ticked once per scheduler step. Its enable gate decides
//! whether the tick runs the component's `update` or its `disabled` hook, and
//! the core tracks the enabled edge so `update` sees `first_time = true`
//! exactly once per enable transition.

use tracing::debug;

use crate::condition::Condition;
use crate::config::{self, ConfigNode};
use crate::error::{ControlError, ControlResult};
use crate::props::{PropertyNode, PropertyTree};

#[derive(Debug, Clone)]
enum EnableGate {
    Fixed(bool),
    Condition(Condition),
    /// Enabled when the property equals `value`, or is truthy without one.
    Property {
        node: PropertyNode,
        value: Option<f64>,
    },
}

impl EnableGate {
    fn is_open(&self) -> bool {
        match self {
            Self::Fixed(open) => *open,
            Self::Condition(condition) => condition.test(),
            Self::Property { node, value: None } => node.get_bool(),
            Self::Property {
                node,
                value: Some(value),
            } => node.get() == *value,
        }
    }
}

/// Name, debug flag and enable state common to all components.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    name: String,
    debug: bool,
    gate: EnableGate,
    enabled: bool,
}

impl ComponentCore {
    /// Create an always-enabled core.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            debug: false,
            gate: EnableGate::Fixed(true),
            enabled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Gate the component on a condition.
    pub fn set_enable_condition(&mut self, condition: Condition) {
        self.gate = EnableGate::Condition(condition);
    }

    /// Gate the component on a property, optionally matching a value.
    pub fn set_enable_property(&mut self, node: PropertyNode, value: Option<f64>) {
        self.gate = EnableGate::Property { node, value };
    }

    /// Whether the last tick ran enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Evaluate the gate for this tick.
    ///
    /// Returns `Some(first_time)` when enabled, `None` when disabled.
    pub fn poll(&mut self) -> Option<bool> {
        if self.gate.is_open() {
            let first_time = !self.enabled;
            self.enabled = true;
            if first_time && self.debug {
                debug!(component = %self.name, "enabled");
            }
            Some(first_time)
        } else {
            if self.enabled && self.debug {
                debug!(component = %self.name, "disabled");
            }
            self.enabled = false;
            None
        }
    }

    /// Handle the keys every component understands.
    ///
    /// Returns `Ok(false)` for keys it does not recognise.
    pub fn configure(
        &mut self,
        key: &str,
        node: &ConfigNode,
        props: &PropertyTree,
    ) -> ControlResult<bool> {
        match key {
            "name" => {
                self.name = config::as_str(node, &self.name, key)?.to_string();
            }
            "debug" => {
                self.debug = config::as_bool(node, &self.name, key)?;
            }
            "enable" => {
                self.gate = self.parse_gate(node, props)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parse_gate(&self, node: &ConfigNode, props: &PropertyTree) -> ControlResult<EnableGate> {
        match node {
            ConfigNode::Bool(open) => Ok(EnableGate::Fixed(*open)),
            ConfigNode::String(path) => Ok(EnableGate::Property {
                node: props.node(path),
                value: None,
            }),
            ConfigNode::Mapping(_) => {
                if let Some(condition) = node.get("condition") {
                    return Ok(EnableGate::Condition(Condition::from_config(
                        condition, props, &self.name,
                    )?));
                }
                let path = node.get("property").ok_or_else(|| {
                    ControlError::config(&self.name, "'enable' needs a condition or a property")
                })?;
                let value = node
                    .get("value")
                    .map(|v| config::as_f64(v, &self.name, "value"))
                    .transpose()?;
                Ok(EnableGate::Property {
                    node: props.node(config::as_str(path, &self.name, "property")?),
                    value,
                })
            }
            _ => Err(ControlError::config(
                &self.name,
                "'enable' must be a boolean, a property path or a mapping",
            )),
        }
    }
}

/// An element ticked by the autopilot scheduler.
pub trait Component {
    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Advance by `dt` seconds while enabled. `first_time` is true on the
    /// first tick after an enable transition.
    fn update(&mut self, first_time: bool, dt: f64);

    /// Called instead of `update` on every tick while disabled.
    fn disabled(&mut self, _dt: f64) {}

    fn name(&self) -> &str {
        self.core().name()
    }

    fn is_enabled(&self) -> bool {
        self.core().is_enabled()
    }

    /// One scheduler step: consult the enable gate and dispatch.
    fn tick(&mut self, dt: f64) {
        match self.core_mut().poll() {
            Some(first_time) => self.update(first_time, dt),
            None => self.disabled(dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        core: ComponentCore,
        calls: Vec<(&'static str, bool)>,
    }

    impl Component for Probe {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
        fn update(&mut self, first_time: bool, _dt: f64) {
            self.calls.push(("update", first_time));
        }
        fn disabled(&mut self, _dt: f64) {
            self.calls.push(("disabled", false));
        }
    }

    fn yaml(text: &str) -> ConfigNode {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn first_time_once_per_enable_edge() {
        let props = PropertyTree::new();
        let mut probe = Probe {
            core: ComponentCore::new("probe"),
            calls: Vec::new(),
        };
        probe
            .core
            .configure("enable", &yaml("/locks/heading"), &props)
            .unwrap();

        probe.tick(0.1);
        props.set_bool("/locks/heading", true);
        probe.tick(0.1);
        probe.tick(0.1);
        props.set_bool("/locks/heading", false);
        probe.tick(0.1);
        props.set_bool("/locks/heading", true);
        probe.tick(0.1);

        assert_eq!(
            probe.calls,
            vec![
                ("disabled", false),
                ("update", true),
                ("update", false),
                ("disabled", false),
                ("update", true),
            ]
        );
    }

    #[test]
    fn enable_property_value_match() {
        let props = PropertyTree::new();
        let mut core = ComponentCore::new("c");
        core.configure("enable", &yaml("{property: /mode, value: 3}"), &props)
            .unwrap();
        props.set("/mode", 2.0);
        assert_eq!(core.poll(), None);
        props.set("/mode", 3.0);
        assert_eq!(core.poll(), Some(true));
        assert!(core.is_enabled());
    }

    #[test]
    fn enable_condition_and_common_keys() {
        let props = PropertyTree::new();
        let mut core = ComponentCore::new("c");
        assert!(core.configure("name", &yaml("pitch hold"), &props).unwrap());
        assert!(core.configure("debug", &yaml("true"), &props).unwrap());
        assert!(core
            .configure("enable", &yaml("condition: {not: /locks/off}"), &props)
            .unwrap());
        assert!(!core.configure("Kp", &yaml("1.0"), &props).unwrap());

        assert_eq!(core.name(), "pitch hold");
        assert!(core.debug());
        assert_eq!(core.poll(), Some(true));
        props.set_bool("/locks/off", true);
        assert_eq!(core.poll(), None);
    }

    #[test]
    fn default_core_is_enabled_from_first_tick() {
        let mut core = ComponentCore::new("c");
        assert!(!core.is_enabled());
        assert_eq!(core.poll(), Some(true));
        assert_eq!(core.poll(), Some(false));
    }
}
