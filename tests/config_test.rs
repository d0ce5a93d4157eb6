//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use taxotree::config::{local_config_path, Settings};
use taxotree::domain::DEFAULT_VERSION;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(Some(dir.path())).expect("load settings");
    assert_eq!(settings.version, DEFAULT_VERSION);
    assert_eq!(settings.display.precision, 2);
    assert!(!settings.include_metadata);
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let local = r#"
label = "ESG Taxonomy"
include_metadata = true

[display]
precision = 3
"#;
    fs::write(local_config_path(dir.path()), local).unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.label, "ESG Taxonomy");
    assert!(settings.include_metadata);
    assert_eq!(settings.display.precision, 3);
    assert_eq!(settings.version, DEFAULT_VERSION);
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "label = [unclosed").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();
    assert!(err.to_string().starts_with("config error: parse"));
}
