//! Tests for spiralkeep-core: configuration, storage, clocks, errors

use spiralkeep_core::config::LoggingConfig;
use spiralkeep_core::*;
use std::fs;
use tempfile::TempDir;

// ===========================================================================
// SpiralkeepConfig
// ===========================================================================

#[test]
fn config_defaults() {
    let config = SpiralkeepConfig::default();
    assert_eq!(config.storage.consciousness_key, "consciousness_state");
    assert_eq!(config.polls.default_duration_hours, 24);
    assert_eq!(config.events.default_duration_minutes, 60);
    assert_eq!(config.events.default_type, "general");
    assert_eq!(config.events.default_location, "virtual");
    assert_eq!(config.consensus.default_voting_period_days, 7);
    assert!((config.consensus.default_threshold - 0.67).abs() < f64::EPSILON);
    assert_eq!(config.activity.channel_input_limit, 50);
    assert_eq!(config.refresh.interval_ms, 5_000);
    assert!(!config.refresh.sweep_expired);
    assert!(config.seed_demo_data);
}

#[test]
fn config_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = SpiralkeepConfig::load(&dir.path().join("absent.toml"));
    assert_eq!(config.sync.platform, "native");
}

#[test]
fn config_garbage_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spiralkeep.toml");
    fs::write(&path, "this is = = not toml").unwrap();
    let config = SpiralkeepConfig::load(&path);
    assert_eq!(config.polls.default_duration_hours, 24);
}

#[test]
fn config_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spiralkeep.toml");
    fs::write(
        &path,
        "seed_demo_data = false\n\n[consensus]\ndefault_threshold = 0.5\n",
    )
    .unwrap();
    let config = SpiralkeepConfig::load(&path);
    assert!(!config.seed_demo_data);
    assert!((config.consensus.default_threshold - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.consensus.default_voting_period_days, 7);
    assert_eq!(config.events.upcoming_limit, 5);
}

#[test]
fn config_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spiralkeep.toml");
    let mut config = SpiralkeepConfig::default();
    config.sync.platform = "desktop".into();
    config.refresh.interval_ms = 250;
    config.save(&path).unwrap();

    let loaded = SpiralkeepConfig::load(&path);
    assert_eq!(loaded.sync.platform, "desktop");
    assert_eq!(loaded.refresh.interval_ms, 250);
    assert_eq!(loaded.refresh_interval(), std::time::Duration::from_millis(250));
    assert!(!path.with_extension("toml.tmp").exists());
}

#[test]
fn config_durations_fall_back_when_out_of_range() {
    let mut config = SpiralkeepConfig::default();
    assert_eq!(config.poll_duration(), chrono::Duration::hours(24));
    assert_eq!(config.voting_period(), chrono::Duration::days(7));

    config.polls.default_duration_hours = i64::MAX;
    config.events.default_duration_minutes = i64::MIN;
    config.consensus.default_voting_period_days = i64::MAX;
    config.activity.recent_window_hours = i64::MAX;
    assert_eq!(config.poll_duration(), chrono::Duration::hours(24));
    assert_eq!(config.event_duration(), chrono::Duration::minutes(60));
    assert_eq!(config.voting_period(), chrono::Duration::days(7));
    assert_eq!(config.recent_window(), chrono::Duration::hours(24));
}

#[test]
fn config_to_toml_mentions_sections() {
    let rendered = SpiralkeepConfig::default().to_toml();
    assert!(rendered.contains("[storage]"));
    assert!(rendered.contains("[consensus]"));
    assert!(rendered.contains("default_threshold"));
}

// ===========================================================================
// FileStore
// ===========================================================================

#[test]
fn file_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("data")).unwrap();
    assert!(store.get("consciousness_state").unwrap().is_none());

    store.set("consciousness_state", r#"{"a":1}"#).unwrap();
    assert_eq!(
        store.get("consciousness_state").unwrap().as_deref(),
        Some(r#"{"a":1}"#)
    );
    assert!(store.dir().join("consciousness_state.json").exists());
    assert!(!store.dir().join("consciousness_state.json.tmp").exists());
}

#[test]
fn file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        store.set("roadmap_pillars", "[]").unwrap();
    }
    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(store.get("roadmap_pillars").unwrap().as_deref(), Some("[]"));
}

#[test]
fn stores_work_behind_trait_object() {
    let store: std::sync::Arc<dyn KeyValueStore> = MemoryStore::shared();
    store.set("x", "y").unwrap();
    assert_eq!(store.get("x").unwrap().as_deref(), Some("y"));
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_display() {
    let e = Error::storage("consciousness_state", "disk full");
    assert_eq!(e.to_string(), "storage error: consciousness_state - disk full");
    let e = Error::InvalidThreshold(1.5);
    assert!(e.to_string().contains("1.5"));
}

#[test]
fn error_from_json() {
    let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
    let e: Error = parse.unwrap_err().into();
    assert!(matches!(e, Error::JsonError(_)));
}

// ===========================================================================
// Logging
// ===========================================================================

#[test]
fn logging_init_is_idempotent() {
    let config = LoggingConfig::default();
    let _first = logging::init(&config);
    assert!(!logging::init(&config));
}
