//! Configuration loader tests

use crate::test_utils::isolated_loader;
use figment::providers::Serialized;
use std::fs;
use whh_domain::error::Error;
use whh_domain::value_objects::ConfigSnapshot;
use whh_infrastructure::config::{
    AppConfig, ConfigLoader, HarnessConfig, SnapshotSource, TimeoutPolicy,
};

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

#[test]
fn test_harness_defaults() {
    let config = isolated_loader::<HarnessConfig>().load().expect("defaults load");
    assert_eq!(config.readiness.timeout_secs, 20);
    assert_eq!(config.readiness.on_timeout, TimeoutPolicy::Abort);
    assert_eq!(config.subject.resource, "webfrontend");
    assert!(config.subject.exclude_keys.is_empty());
    assert_eq!(config.runtime.bind_host, "127.0.0.1");
    assert!(config.runtime.postgres_url.is_none());
}

#[test]
fn test_toml_file_overrides_defaults() {
    let (_dir, path) = write_config(
        r#"
[readiness]
timeout_secs = 5
on_timeout = "proceed"

[subject]
exclude_keys = ["SERVICES:apiservice:URL"]
"#,
    );

    let config = ConfigLoader::<HarnessConfig>::new()
        .with_env_prefix("WHH_TEST_ISOLATED")
        .with_config_path(&path)
        .load()
        .expect("load");
    assert_eq!(config.readiness.timeout_secs, 5);
    assert_eq!(config.readiness.on_timeout, TimeoutPolicy::Proceed);
    assert_eq!(config.subject.exclude_keys, ["SERVICES:apiservice:URL"]);
    assert_eq!(config.subject.resource, "webfrontend");
}

#[test]
fn test_added_source_overrides_file() {
    let (_dir, path) = write_config("[readiness]\ntimeout_secs = 5\n");

    let config = ConfigLoader::<HarnessConfig>::new()
        .with_env_prefix("WHH_TEST_ISOLATED")
        .with_config_path(&path)
        .with_source(Serialized::default("readiness.timeout_secs", 7))
        .load()
        .expect("load");
    assert_eq!(config.readiness.timeout_secs, 7);
}

#[test]
fn test_zero_timeout_is_rejected() {
    let (_dir, path) = write_config("[readiness]\ntimeout_secs = 0\n");
    let err = ConfigLoader::<HarnessConfig>::new()
        .with_env_prefix("WHH_TEST_ISOLATED")
        .with_config_path(&path)
        .load()
        .expect_err("zero timeout");
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_unknown_log_level_is_rejected() {
    let (_dir, path) = write_config("[logging]\nlevel = \"loud\"\n");
    let err = ConfigLoader::<HarnessConfig>::new()
        .with_env_prefix("WHH_TEST_ISOLATED")
        .with_config_path(&path)
        .load()
        .expect_err("bad level");
    assert!(err.to_string().contains("Invalid configuration"));
}

#[test]
fn test_malformed_toml_is_configuration_error() {
    let (_dir, path) = write_config("[readiness\ntimeout_secs = ");
    let err = ConfigLoader::<HarnessConfig>::new()
        .with_env_prefix("WHH_TEST_ISOLATED")
        .with_config_path(&path)
        .load()
        .expect_err("malformed");
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_snapshot_wins_over_subject_file() {
    let (_dir, path) = write_config(
        r#"
[connection_strings]
applicationDb = "from-file"

[database]
pool_size = 2
"#,
    );
    let snapshot: ConfigSnapshot = [
        ("CONNECTION_STRINGS__applicationDb", "memory://engine/applicationDb"),
        ("SERVICES__apiservice__URL", "http://127.0.0.1:5001"),
        ("SERVER__URLS", "http://127.0.0.1:5002"),
    ]
    .into_iter()
    .collect();

    let config = ConfigLoader::<AppConfig>::new()
        .with_env_prefix("WHH_TEST_ISOLATED")
        .with_config_path(&path)
        .with_source(SnapshotSource::new(snapshot))
        .load()
        .expect("load");

    assert_eq!(
        config.connection_string("applicationDb"),
        Some("memory://engine/applicationDb")
    );
    assert_eq!(config.service_url("apiservice"), Some("http://127.0.0.1:5001"));
    assert_eq!(config.server.urls.as_deref(), Some("http://127.0.0.1:5002"));
    assert_eq!(config.database.pool_size, 2);
    assert_eq!(config.database.name, "applicationDb");
}

#[test]
fn test_save_to_file_writes_loadable_toml() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("whh.toml");
    let mut config = HarnessConfig::default();
    config.readiness.timeout_secs = 9;

    let loader = ConfigLoader::<HarnessConfig>::new().with_env_prefix("WHH_TEST_ISOLATED");
    loader.save_to_file(&config, &path).expect("save");

    let loaded = loader.with_config_path(&path).load().expect("load");
    assert_eq!(loaded.readiness.timeout_secs, 9);
}

#[test]
fn test_mixed_case_file_keys_are_found() {
    let (_dir, path) = write_config(
        r#"
[connection_strings]
applicationDb = "memory://e/applicationDb"

[services.apiService]
url = "http://127.0.0.1:5001"
"#,
    );

    let config = isolated_loader::<AppConfig>()
        .with_config_path(&path)
        .load()
        .expect("load");

    assert_eq!(
        config.connection_string("applicationDb"),
        Some("memory://e/applicationDb")
    );
    assert_eq!(
        config.connection_string("APPLICATIONDB"),
        Some("memory://e/applicationDb")
    );
    assert_eq!(config.service_url("apiservice"), Some("http://127.0.0.1:5001"));
}

#[test]
fn test_file_keys_differing_only_by_case_are_rejected() {
    let (_dir, path) = write_config(
        r#"
[connection_strings]
applicationDb = "one"
applicationdb = "two"
"#,
    );

    let result = isolated_loader::<AppConfig>().with_config_path(&path).load();

    assert!(matches!(result, Err(Error::Configuration { .. })));
}
