//! Tests for bootstrap configuration and graceful degradation
//!
//! Tests that manipulate ROAMWISE_ROOT_FOLDER are marked with #[serial]
//! so they never run in parallel with each other.

use roamwise_common::config::{
    default_root_folder, load_config, load_toml_config, resolve_root_folder, TomlConfig,
    ROOT_FOLDER_ENV,
};
use roamwise_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = resolve_root_folder(None, &TomlConfig::default());

    assert_eq!(root, default_root_folder());
}

#[test]
#[serial]
fn test_resolver_cli_beats_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/roamwise-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/roamwise-toml")),
        ..TomlConfig::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/roamwise-cli")), &config);
    assert_eq!(root, PathBuf::from("/tmp/roamwise-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/roamwise-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/roamwise-toml")),
        ..TomlConfig::default()
    };

    let root = resolve_root_folder(None, &config);
    assert_eq!(root, PathBuf::from("/tmp/roamwise-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_blank_env_falls_through_to_toml() {
    env::set_var(ROOT_FOLDER_ENV, "   ");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/roamwise-toml")),
        ..TomlConfig::default()
    };

    let root = resolve_root_folder(None, &config);
    assert_eq!(root, PathBuf::from("/tmp/roamwise-toml"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_load_explicit_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        port = 6000
        request_deadline_secs = 15

        [logging]
        level = "debug"

        [generator]
        model = "test-model"
        api_key = "gen-key"
        "#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();

    assert_eq!(config.port, 6000);
    assert_eq!(config.request_deadline_secs, 15);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.generator.model, "test-model");
    assert_eq!(config.generator.api_key.as_deref(), Some("gen-key"));
    // Untouched section keeps its defaults
    assert_eq!(config.provider.result_limit, 30);
}

#[test]
fn test_missing_explicit_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_config_round_trips_through_toml() {
    let mut config = TomlConfig::default();
    config.provider.api_key = Some("provider-key".to_string());
    config.root_folder = Some(PathBuf::from("/srv/roamwise"));

    let text = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&text).unwrap();

    assert_eq!(parsed, config);
}
