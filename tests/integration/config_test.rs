use cycler::core::config::{merge_defaults, migrate};
use cycler::{Config, ConfigStore, StressLevel};
use serde_json::{json, Map, Value};
use std::fs;
use tempfile::TempDir;

const KEYS: [&str; 6] = [
    "upper_limit",
    "lower_limit",
    "pause_limit",
    "reset_limit",
    "cpu_stress",
    "gpu_stress",
];

fn full_record() -> Map<String, Value> {
    match json!({
        "upper_limit": 90,
        "lower_limit": 30,
        "pause_limit": 60,
        "reset_limit": 70,
        "cpu_stress": "low",
        "gpu_stress": "medium"
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn test_load_fills_every_missing_subset() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("battery_cycle_config.json"));
    let persisted = full_record();
    let defaults = serde_json::to_value(Config::default()).unwrap();

    for mask in 0u32..(1 << KEYS.len()) {
        let mut record = Map::new();
        for (i, key) in KEYS.iter().enumerate() {
            if mask & (1 << i) != 0 {
                record.insert(key.to_string(), persisted[*key].clone());
            }
        }
        fs::write(store.path(), Value::Object(record).to_string()).unwrap();

        let loaded = serde_json::to_value(store.load()).unwrap();
        for (i, key) in KEYS.iter().enumerate() {
            let expected = if mask & (1 << i) != 0 {
                &persisted[*key]
            } else {
                &defaults[*key]
            };
            assert_eq!(&loaded[*key], expected, "mask {:06b}, key {}", mask, key);
        }
    }
}

#[test]
fn test_load_migrates_legacy_booleans() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("battery_cycle_config.json"));
    fs::write(store.path(), r#"{"cpu_stress": false, "gpu_stress": true}"#).unwrap();

    let config = store.load();
    assert_eq!(config.cpu_stress, StressLevel::Off);
    assert_eq!(config.gpu_stress, StressLevel::High);
}

#[test]
fn test_migrate_twice_equals_once() {
    let legacy = match json!({ "cpu_stress": true, "gpu_stress": false, "upper_limit": 70 }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    let once = migrate(merge_defaults(legacy));
    assert_eq!(migrate(once.clone()), once);
}

#[test]
fn test_save_then_load_keeps_changes_and_unknown_keys() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("battery_cycle_config.json"));
    fs::write(store.path(), r#"{"upper_limit": 100, "notify": true}"#).unwrap();

    let mut config = store.load();
    config.lower_limit = 40;
    store.save(&config).unwrap();

    let reloaded = store.load();
    assert_eq!(reloaded.upper_limit, 100);
    assert_eq!(reloaded.lower_limit, 40);
    assert_eq!(reloaded.extra.get("notify"), Some(&json!(true)));
}

#[test]
fn test_invalid_field_does_not_discard_the_rest() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("battery_cycle_config.json"));
    fs::write(
        store.path(),
        r#"{"upper_limit": 90, "lower_limit": 30, "gpu_stress": "ultra", "notify": true}"#,
    )
    .unwrap();

    let config = store.load();
    assert_eq!(config.upper_limit, 90);
    assert_eq!(config.lower_limit, 30);
    assert_eq!(config.gpu_stress, StressLevel::Off);
    assert_eq!(config.extra.get("notify"), Some(&json!(true)));

    store.save(&config).unwrap();
    let saved: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(saved["upper_limit"], json!(90));
    assert_eq!(saved["lower_limit"], json!(30));
    assert_eq!(saved["gpu_stress"], json!("off"));
    assert_eq!(saved["notify"], json!(true));
}

#[test]
fn test_non_object_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("battery_cycle_config.json"));
    fs::write(store.path(), "[1, 2, 3]").unwrap();
    assert_eq!(store.load(), Config::default());
}

#[cfg(unix)]
#[test]
fn test_save_error_propagates() {
    let dir = TempDir::new().unwrap();
    // Parent "directory" is a regular file, so the write must fail
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    let store = ConfigStore::new(blocker.join("config.json"));

    assert!(store.save(&Config::default()).is_err());
}
