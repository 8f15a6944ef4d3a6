//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate LXP_ROOT_FOLDER are marked with #[serial] so they
//! never race each other.

use lxp_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.root_folder.to_string_lossy().contains("lxp"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lxp-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/lxp-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lxp-from-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lxp-from-toml")),
        ..Default::default()
    };

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&toml)
        .with_cli_arg(Some(PathBuf::from("/tmp/lxp-from-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/lxp-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lxp-from-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lxp-from-toml")),
        ..Default::default()
    };

    let root_folder = RootFolderResolver::new("test-module").with_toml(&toml).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/lxp-from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_used_when_no_cli_or_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lxp-from-toml")),
        ..Default::default()
    };

    let root_folder = RootFolderResolver::new("test-module").with_toml(&toml).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/lxp-from-toml"));
}

#[test]
fn test_initializer_creates_directory() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("nested").join("lxp");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("lxp.db"));
}

#[test]
fn test_toml_partial_file_parses() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("lxp-ps.toml");
    std::fs::write(
        &path,
        r#"
managed_pod_url = "http://localhost:3000"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::from_file(&path).unwrap();
    assert_eq!(config.managed_pod_url.as_deref(), Some("http://localhost:3000"));
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
    assert!(config.root_folder.is_none());
    assert!(config.pod_timeout_secs.is_none());
}

#[test]
fn test_toml_invalid_file_is_config_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "pod_timeout_secs = \"soon\"").unwrap();

    let err = TomlConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, lxp_common::Error::Config(_)));
}
