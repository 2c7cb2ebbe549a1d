//! Plumbing shared by analog (continuous-valued) components.
//!
//! An analog component reads a measurement (`input`) and a setpoint
//! (`reference`), and writes one value to one or more output properties,
//! clamped to live `[min, max]` bounds and optionally wrapped into a periodic
//! range.

use ap_core::wrap_periodic;

use crate::component::ComponentCore;
use crate::config::{self, ConfigNode};
use crate::error::{ControlError, ControlResult};
use crate::props::{PropertyNode, PropertyTree};
use crate::value::{InputValue, InputValueList, LiveValue};

/// Destination of a component's output.
pub trait OutputSink {
    /// Value currently in effect at the destination.
    fn read_current(&self) -> f64;

    /// Write a new value.
    fn write(&mut self, value: f64);
}

/// Output written to a set of properties.
#[derive(Debug, Clone, Default)]
pub struct PropertyOutputs {
    nodes: Vec<PropertyNode>,
}

impl PropertyOutputs {
    pub fn push(&mut self, node: PropertyNode) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(PropertyNode::path)
    }
}

impl OutputSink for PropertyOutputs {
    /// The first output is authoritative; `0.0` when there is none.
    fn read_current(&self) -> f64 {
        self.nodes.first().map_or(0.0, PropertyNode::get)
    }

    fn write(&mut self, value: f64) {
        for node in &self.nodes {
            node.set(value);
        }
    }
}

/// Wrap-around range for outputs such as headings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Periodical {
    pub min: f64,
    pub max: f64,
}

impl Periodical {
    pub fn new(min: f64, max: f64) -> ControlResult<Self> {
        if !(min < max) {
            return Err(ControlError::InvalidArg {
                what: "period min must be less than max",
            });
        }
        Ok(Self { min, max })
    }

    pub fn normalize(&self, value: f64) -> f64 {
        wrap_periodic(value, self.min, self.max)
    }
}

/// Inputs, bounds and outputs of an analog component.
#[derive(Debug, Clone)]
pub struct AnalogCore {
    core: ComponentCore,
    value_input: InputValueList,
    reference_input: InputValueList,
    min_input: InputValueList,
    max_input: InputValueList,
    outputs: PropertyOutputs,
    period: Option<Periodical>,
    shadow: bool,
    show_terms: bool,
}

impl AnalogCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ComponentCore::new(name),
            value_input: InputValueList::new(),
            reference_input: InputValueList::new(),
            min_input: InputValueList::new(),
            max_input: InputValueList::new(),
            outputs: PropertyOutputs::default(),
            period: None,
            shadow: false,
            show_terms: false,
        }
    }

    pub fn core(&self) -> &ComponentCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    pub fn add_input(&mut self, input: InputValue) {
        self.value_input.push(input);
    }

    pub fn add_reference(&mut self, reference: InputValue) {
        self.reference_input.push(reference);
    }

    pub fn add_min(&mut self, min: InputValue) {
        self.min_input.push(min);
    }

    pub fn add_max(&mut self, max: InputValue) {
        self.max_input.push(max);
    }

    pub fn add_output(&mut self, node: PropertyNode) {
        self.outputs.push(node);
    }

    pub fn set_period(&mut self, period: Option<Periodical>) {
        self.period = period;
    }

    pub fn set_shadow(&mut self, shadow: bool) {
        self.shadow = shadow;
    }

    pub fn set_show_terms(&mut self, show_terms: bool) {
        self.show_terms = show_terms;
    }

    /// Track the external output while disabled.
    pub fn shadow(&self) -> bool {
        self.shadow
    }

    pub fn show_terms(&self) -> bool {
        self.show_terms
    }

    pub fn outputs(&self) -> &PropertyOutputs {
        &self.outputs
    }

    pub fn has_input(&self) -> bool {
        !self.value_input.is_empty()
    }

    pub fn has_reference(&self) -> bool {
        !self.reference_input.is_empty()
    }

    /// Process value `y`.
    pub fn measurement(&self) -> f64 {
        self.value_input.read()
    }

    /// Setpoint `r`.
    pub fn setpoint(&self) -> f64 {
        self.reference_input.read()
    }

    /// Current `(min, max)` output bounds. Unconfigured bounds are infinite.
    pub fn output_bounds(&self) -> (f64, f64) {
        (
            self.min_input.read_or(f64::NEG_INFINITY),
            self.max_input.read_or(f64::INFINITY),
        )
    }

    /// Clamp to the current bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        let (min, max) = self.output_bounds();
        value.max(min).min(max)
    }

    /// Value currently in effect at the output.
    pub fn get_output_value(&self) -> f64 {
        self.outputs.read_current()
    }

    /// Clamp, wrap and write to every output.
    pub fn set_output_value(&mut self, value: f64) {
        let mut value = self.clamp(value);
        if let Some(period) = &self.period {
            value = period.normalize(value);
        }
        self.outputs.write(value);
    }

    /// Handle analog keys, then the common component keys.
    ///
    /// Returns `Ok(false)` for keys neither level recognises.
    pub fn configure(
        &mut self,
        key: &str,
        node: &ConfigNode,
        props: &PropertyTree,
    ) -> ControlResult<bool> {
        let name = self.core.name().to_string();
        match key {
            "input" => self.add_input(InputValue::from_config(node, props, &name)?),
            "reference" => self.add_reference(InputValue::from_config(node, props, &name)?),
            "min" | "u_min" => self.add_min(InputValue::from_config(node, props, &name)?),
            "max" | "u_max" => self.add_max(InputValue::from_config(node, props, &name)?),
            "output" => {
                for path in output_paths(node, &name)? {
                    self.add_output(props.node(path));
                }
            }
            "period" => {
                let min = node
                    .get("min")
                    .ok_or_else(|| ControlError::config(&name, "'period' needs min"))?;
                let max = node
                    .get("max")
                    .ok_or_else(|| ControlError::config(&name, "'period' needs max"))?;
                let period = Periodical::new(
                    config::as_f64(min, &name, "min")?,
                    config::as_f64(max, &name, "max")?,
                )
                .map_err(|e| ControlError::config(&name, e.to_string()))?;
                self.period = Some(period);
            }
            "shadow" => self.shadow = config::as_bool(node, &name, key)?,
            "show-terms" => self.show_terms = config::as_bool(node, &name, key)?,
            _ => return self.core.configure(key, node, props),
        }
        Ok(true)
    }
}

fn output_paths<'a>(node: &'a ConfigNode, component: &str) -> ControlResult<Vec<&'a str>> {
    match node {
        ConfigNode::String(path) => Ok(vec![path.as_str()]),
        ConfigNode::Sequence(items) => items
            .iter()
            .map(|item| config::as_str(item, component, "output"))
            .collect(),
        ConfigNode::Mapping(_) => {
            let property = node
                .get("property")
                .ok_or_else(|| ControlError::config(component, "'output' needs a property"))?;
            Ok(vec![config::as_str(property, component, "property")?])
        }
        _ => Err(ControlError::config(
            component,
            "'output' must be a property path or a list of paths",
        )),
    }
}
