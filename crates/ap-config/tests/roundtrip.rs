use std::path::Path;

use ap_config::schema::*;
use ap_config::{from_yaml_str, load_json, load_yaml, save_json, save_yaml};

const PITCH: &str = r#"
version: 1
name: pitch channel
components:
  - type: pid-controller
    name: pitch hold
    entries:
      - input: /orientation/pitch-deg
      - reference: /autopilot/settings/target-pitch-deg
      - output: /controls/flight/elevator
      - Kp: -0.05
      - Kp: { property: /autopilot/gains/pitch-kp, condition: /autopilot/gains/override }
      - Ti: 10.0
      - u_min: -1.0
      - u_max: 1.0
scenario:
  dt_s: 0.02
  duration_s: 2.0
  initial: { /orientation/pitch-deg: 1.5 }
  events:
    - { time_s: 1.0, property: /autopilot/settings/target-pitch-deg, value: 5.0 }
  trace: [ /controls/flight/elevator ]
"#;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("ap_config_{}_{name}", std::process::id()))
}

#[test]
fn parses_inline_document() {
    let config = from_yaml_str(PITCH).unwrap();
    assert_eq!(config.name, "pitch channel");
    let pid = &config.components[0];
    assert_eq!(pid.kind, "pid-controller");
    assert_eq!(pid.entries.len(), 8);
    assert_eq!(
        pid.entry_pairs().iter().filter(|(k, _)| k == "Kp").count(),
        2
    );
    let scenario = config.scenario.as_ref().unwrap();
    assert_eq!(scenario.initial.get("/orientation/pitch-deg"), Some(&1.5));
    assert_eq!(scenario.events.len(), 1);
}

#[test]
fn roundtrip_yaml() {
    let config = from_yaml_str(PITCH).unwrap();
    let path = temp_path("roundtrip.yaml");
    save_yaml(&path, &config).unwrap();
    let loaded = load_yaml(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(config, loaded);
}

#[test]
fn roundtrip_json() {
    let config = from_yaml_str(PITCH).unwrap();
    let path = temp_path("roundtrip.json");
    save_json(&path, &config).unwrap();
    let loaded = load_json(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(config, loaded);
}

#[test]
fn demo_configs_load() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    for name in ["pitch_hold.yaml", "heading_hold.yaml"] {
        let config = load_yaml(&root.join(name))
            .unwrap_or_else(|e| panic!("Failed to load {name}: {e}"));
        assert!(!config.components.is_empty(), "{name} has no components");
    }
}

#[test]
fn empty_document_is_valid() {
    let config = from_yaml_str("version: 1\nname: empty\n").unwrap();
    assert!(config.components.is_empty());
    assert!(config.scenario.is_none());
    assert_eq!(
        config,
        AutopilotConfig {
            version: 1,
            name: "empty".to_string(),
            components: vec![],
            scenario: None,
        }
    );
}
