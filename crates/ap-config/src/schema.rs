//! Configuration schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutopilotConfig {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    /// Registered component type, e.g. `pid-controller`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Ordered configuration entries. Keys may repeat.
    #[serde(default)]
    pub entries: Vec<ConfigEntry>,
}

impl ComponentDef {
    /// Entries as `(key, value)` pairs in file order.
    pub fn entry_pairs(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect()
    }
}

/// One `key: value` entry, written as a single-key mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Mapping", into = "Mapping")]
pub struct ConfigEntry {
    pub key: String,
    pub value: Value,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl TryFrom<Mapping> for ConfigEntry {
    type Error = String;

    fn try_from(map: Mapping) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "configuration entry must have exactly one key, found {}",
                map.len()
            ));
        }
        let Some((key, value)) = map.into_iter().next() else {
            return Err("empty configuration entry".to_string());
        };
        let key = match key {
            Value::String(key) => key,
            other => return Err(format!("configuration key must be a string, found {other:?}")),
        };
        Ok(Self { key, value })
    }
}

impl From<ConfigEntry> for Mapping {
    fn from(entry: ConfigEntry) -> Self {
        let mut map = Mapping::new();
        map.insert(Value::String(entry.key), entry.value);
        map
    }
}

/// Fixed-step replay of the configured autopilot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub dt_s: f64,
    pub duration_s: f64,
    /// Property values set before the first step.
    #[serde(default)]
    pub initial: BTreeMap<String, f64>,
    #[serde(default)]
    pub events: Vec<EventDef>,
    /// Properties recorded after every step.
    #[serde(default)]
    pub trace: Vec<String>,
}

/// Set `property` to `value` once simulated time reaches `time_s`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDef {
    pub time_s: f64,
    pub property: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_order_and_repeats() {
        let yaml = r#"
type: pid-controller
name: pitch
entries:
  - Kp: 0.5
  - input: /y
  - Kp: { property: /gains/kp, condition: /gains/override }
"#;
        let def: ComponentDef = serde_yaml::from_str(yaml).unwrap();
        let keys: Vec<&str> = def.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Kp", "input", "Kp"]);
        assert_eq!(def.entries[0].value, Value::from(0.5));
        assert!(def.entries[2].value.is_mapping());
    }

    #[test]
    fn multi_key_entry_rejected() {
        let yaml = "type: pid-controller\nname: p\nentries:\n  - { Kp: 1.0, Ti: 2.0 }\n";
        assert!(serde_yaml::from_str::<ComponentDef>(yaml).is_err());
    }

    #[test]
    fn entry_serializes_as_single_key_map() {
        let entry = ConfigEntry::new("output", "/controls/elevator");
        let text = serde_yaml::to_string(&entry).unwrap();
        assert_eq!(text.trim(), "output: /controls/elevator");
    }
}
