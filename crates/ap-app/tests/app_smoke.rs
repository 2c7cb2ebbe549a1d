//! Smoke test for the ap-app service layer.

use std::path::PathBuf;

use ap_app::{list_components, load_config, save_config, validate_config};
use ap_controls::ComponentRegistry;

fn demo(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // repo root
    path.push("demos");
    path.push(name);
    path
}

#[test]
fn demos_load_and_validate() {
    let registry = ComponentRegistry::with_defaults();
    for name in ["pitch_hold.yaml", "heading_hold.yaml"] {
        let config = load_config(&demo(name)).unwrap_or_else(|e| panic!("{name}: {e}"));
        validate_config(&config, &registry).unwrap_or_else(|e| panic!("{name}: {e}"));
    }
}

#[test]
fn list_heading_components() {
    let config = load_config(&demo("heading_hold.yaml")).unwrap();
    let components = list_components(&config);
    let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["heading bug", "roll hold"]);

    let heading = &components[0];
    assert_eq!(heading.kind, "pid-controller");
    assert_eq!(heading.entry_count, 10);
    // Kp appears twice but is listed once.
    assert_eq!(heading.keys.iter().filter(|k| *k == "Kp").count(), 1);
}

#[test]
fn save_as_json_and_reload() {
    let config = load_config(&demo("pitch_hold.yaml")).unwrap();
    let path = std::env::temp_dir().join(format!("ap_app_smoke_{}.json", std::process::id()));
    save_config(&path, &config).unwrap();
    let reloaded = load_config(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(config, reloaded);
}

#[test]
fn missing_file_reports_path() {
    let err = load_config(&demo("does_not_exist.yaml")).unwrap_err();
    assert!(err.to_string().contains("does_not_exist.yaml"));
}
