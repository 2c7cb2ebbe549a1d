//! Configuration entry helpers.
//!
//! Components are configured from an ordered sequence of `(key, node)` pairs.
//! A node is any YAML value: a scalar, a list, or a nested mapping. Keys may
//! repeat and arrive in any order.

use ap_core::ensure_finite;
use serde_yaml::Value;

use crate::error::{ControlError, ControlResult};

/// A configuration value or subtree.
pub type ConfigNode = Value;

/// One `(key, node)` configuration entry.
pub type ConfigEntry = (String, ConfigNode);

/// Flatten a node into ordered entries.
///
/// Accepts either a mapping (`{Kp: 1.0, Ti: 2.0}`) or a sequence of
/// single-key mappings (`[{Kp: 1.0}, {Kp: 2.0}]`), the latter being the only
/// way to repeat a key.
pub fn entries_of(node: &ConfigNode, component: &str) -> ControlResult<Vec<ConfigEntry>> {
    match node {
        Value::Mapping(map) => map
            .iter()
            .map(|(k, v)| Ok((key_string(k, component)?, v.clone())))
            .collect(),
        Value::Sequence(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Mapping(map) if map.len() == 1 => {
                        for (k, v) in map {
                            entries.push((key_string(k, component)?, v.clone()));
                        }
                    }
                    _ => {
                        return Err(ControlError::config(
                            component,
                            "each configuration entry must be a single-key mapping",
                        ));
                    }
                }
            }
            Ok(entries)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(ControlError::config(
            component,
            "expected a mapping or a list of entries",
        )),
    }
}

fn key_string(key: &Value, component: &str) -> ControlResult<String> {
    match key {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ControlError::config(
            component,
            "configuration keys must be non-empty strings",
        )),
    }
}

/// Read a finite number. Numeric strings are accepted.
pub fn as_f64(node: &ConfigNode, component: &str, key: &str) -> ControlResult<f64> {
    let value = match node {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ControlError::config(component, format!("'{key}' must be a number")))?;
    ensure_finite(value, "configuration value")
        .map_err(|_| ControlError::config(component, format!("'{key}' must be finite")))
}

/// Read a boolean. Numbers are true when non-zero.
pub fn as_bool(node: &ConfigNode, component: &str, key: &str) -> ControlResult<bool> {
    match node {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim() {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(ControlError::config(
                component,
                format!("'{key}' must be a boolean"),
            )),
        },
        // A bare key with no value switches a flag on.
        Value::Null => Ok(true),
        _ => Err(ControlError::config(
            component,
            format!("'{key}' must be a boolean"),
        )),
    }
}

/// Read a string.
pub fn as_str<'a>(node: &'a ConfigNode, component: &str, key: &str) -> ControlResult<&'a str> {
    node.as_str()
        .ok_or_else(|| ControlError::config(component, format!("'{key}' must be a string")))
}

/// If `node` is a mapping with exactly one string key, return that pair.
pub(crate) fn single_entry(node: &ConfigNode) -> Option<(&str, &ConfigNode)> {
    match node {
        Value::Mapping(map) if map.len() == 1 => {
            map.iter().next().and_then(|(k, v)| k.as_str().map(|k| (k, v)))
        }
        _ => None,
    }
}
