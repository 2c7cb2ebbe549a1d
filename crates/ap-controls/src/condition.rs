//! Boolean conditions over the property tree.
//!
//! Conditions gate component enable state and select which of several input
//! values is active. They are bound to property nodes at configuration time,
//! so evaluating one never fails.
//!
//! ```yaml
//! condition:
//!   and:
//!     - property: /autopilot/locks/altitude-hold
//!     - not: { property: /autopilot/locks/passive }
//!     - greater-than: { property: /velocities/airspeed-kt, value: 60 }
//! ```

use crate::config::{self, ConfigNode};
use crate::error::{ControlError, ControlResult};
use crate::props::{PropertyNode, PropertyTree};

/// A condition bound to a property tree.
#[derive(Debug, Clone)]
pub enum Condition {
    /// True when the property is non-zero.
    Property(PropertyNode),
    /// Negation.
    Not(Box<Condition>),
    /// True when every child is true (and when there are none).
    And(Vec<Condition>),
    /// True when any child is true.
    Or(Vec<Condition>),
    /// Property equals a value.
    Equals { property: PropertyNode, value: f64 },
    /// Property strictly below a value.
    LessThan { property: PropertyNode, value: f64 },
    /// Property strictly above a value.
    GreaterThan { property: PropertyNode, value: f64 },
}

impl Condition {
    /// Evaluate against the current property values.
    pub fn test(&self) -> bool {
        match self {
            Self::Property(node) => node.get_bool(),
            Self::Not(inner) => !inner.test(),
            Self::And(all) => all.iter().all(Condition::test),
            Self::Or(any) => any.iter().any(Condition::test),
            Self::Equals { property, value } => property.get() == *value,
            Self::LessThan { property, value } => property.get() < *value,
            Self::GreaterThan { property, value } => property.get() > *value,
        }
    }

    /// Bind a condition from configuration.
    ///
    /// A bare string is shorthand for `property`. A mapping with several keys
    /// is an implicit `and` of each key.
    pub fn from_config(
        node: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Self> {
        if let Some(path) = node.as_str() {
            return Ok(Self::Property(props.node(path)));
        }
        let entries = match node {
            ConfigNode::Mapping(_) => config::entries_of(node, component)?,
            _ => {
                return Err(ControlError::config(
                    component,
                    "condition must be a property path or a mapping",
                ));
            }
        };

        let mut terms = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            terms.push(Self::term(key, value, props, component)?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Self::And(terms))
        }
    }

    fn term(
        key: &str,
        value: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Self> {
        match key {
            "property" => Ok(Self::Property(
                props.node(config::as_str(value, component, key)?),
            )),
            "not" => Ok(Self::Not(Box::new(Self::from_config(
                value, props, component,
            )?))),
            "and" => Ok(Self::And(Self::list(value, props, component)?)),
            "or" => Ok(Self::Or(Self::list(value, props, component)?)),
            "equals" | "less-than" | "greater-than" => {
                let (property, threshold) = Self::comparison(value, props, component, key)?;
                Ok(match key {
                    "equals" => Self::Equals {
                        property,
                        value: threshold,
                    },
                    "less-than" => Self::LessThan {
                        property,
                        value: threshold,
                    },
                    _ => Self::GreaterThan {
                        property,
                        value: threshold,
                    },
                })
            }
            other => Err(ControlError::config(
                component,
                format!("unknown condition '{other}'"),
            )),
        }
    }

    fn list(
        value: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Vec<Self>> {
        match value {
            ConfigNode::Sequence(items) => items
                .iter()
                .map(|item| Self::from_config(item, props, component))
                .collect(),
            _ => Err(ControlError::config(
                component,
                "'and'/'or' expect a list of conditions",
            )),
        }
    }

    fn comparison(
        value: &ConfigNode,
        props: &PropertyTree,
        component: &str,
        key: &str,
    ) -> ControlResult<(PropertyNode, f64)> {
        let property = value
            .get("property")
            .ok_or_else(|| ControlError::config(component, format!("'{key}' needs a property")))?;
        let threshold = value
            .get("value")
            .ok_or_else(|| ControlError::config(component, format!("'{key}' needs a value")))?;
        Ok((
            props.node(config::as_str(property, component, "property")?),
            config::as_f64(threshold, component, "value")?,
        ))
    }
}
