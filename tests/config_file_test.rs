//! Tests for loading and saving configuration files

use head_mouse::{
    config::{Config, EXAMPLE_CONFIG},
    error::AppError,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("head-mouse-{}-{name}", std::process::id()))
}

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("round-trip.yaml");

    let mut config = Config::default();
    config.camera.index = 2;
    config.camera.mirror = false;
    config.tracking.max_jump = 35;
    config.gestures.debounce_window_ms = 800;
    config.controls.speed = 8;
    config.controls.recalibrate = false;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.camera.index, 2);
    assert!(!loaded.camera.mirror);
    assert_eq!(loaded.tracking.max_jump, 35);
    assert_eq!(loaded.gestures.debounce_window().as_millis(), 800);
    assert_eq!(loaded.controls, config.controls);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_example_config_file_loads() {
    let path = temp_path("example.yaml");
    std::fs::write(&path, EXAMPLE_CONFIG).unwrap();

    let loaded = Config::from_file(&path);
    std::fs::remove_file(&path).ok();

    let loaded = loaded.unwrap();
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.camera.fps, 5.0);
    assert_eq!(loaded.camera.frame_delay_ms, 10);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let result = Config::from_file(temp_path("does-not-exist.yaml"));
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[test]
fn test_invalid_tracking_values_rejected() {
    let config = Config::from_yaml("tracking:\n  acceptance_threshold: 1.5\n").unwrap();
    assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

    let config = Config::from_yaml("calibration:\n  frames: 0\n").unwrap();
    assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

    let config = Config::from_yaml("camera:\n  fps: 0.0\n").unwrap();
    assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
}
