//! Configuration use-cases over the config store port.

use std::path::PathBuf;

use mockall::mock;
use zcp_cli::application::ports::ConfigStore;
use zcp_cli::application::services::config_service::{load_config, set_config_value};
use zcp_cli::domain::config::ZcpConfig;
use zcp_cli::infra::config::YamlConfigStore;

mock! {
    pub Store {}
    impl ConfigStore for Store {
        fn load(&self) -> anyhow::Result<ZcpConfig>;
        fn save(&self, config: &ZcpConfig) -> anyhow::Result<()>;
        fn path(&self) -> anyhow::Result<PathBuf>;
    }
}

#[test]
fn test_set_config_value_persists_updated_config() {
    let mut store = MockStore::new();
    store.expect_load().times(1).returning(|| Ok(ZcpConfig::default()));
    store
        .expect_save()
        .withf(|cfg| cfg.get("region").as_deref() == Some("fra1"))
        .times(1)
        .returning(|_| Ok(()));

    let cfg = set_config_value(&store, "region", "fra1").expect("set");

    assert_eq!(cfg.get("region").as_deref(), Some("fra1"));
}

#[test]
fn test_set_config_value_unknown_key_touches_nothing() {
    let mut store = MockStore::new();
    store.expect_load().never();
    store.expect_save().never();

    let err = set_config_value(&store, "telemetry", "on").expect_err("unknown");

    assert!(err.to_string().contains("Unknown setting: telemetry"));
}

#[test]
fn test_set_config_value_invalid_value_touches_nothing() {
    let mut store = MockStore::new();
    store.expect_load().never();
    store.expect_save().never();

    let err = set_config_value(&store, "poll.process.timeout", "soon").expect_err("invalid");

    assert!(err.to_string().contains("Invalid value for poll.process.timeout"));
}

#[test]
fn test_load_config_propagates_store_error() {
    let mut store = MockStore::new();
    store
        .expect_load()
        .returning(|| Err(anyhow::anyhow!("config is not valid YAML")));

    assert!(load_config(&store).is_err());
}

#[test]
fn test_yaml_store_round_trips_through_service() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("zcp.yaml");
    let store = YamlConfigStore::at(&path);

    set_config_value(&store, "catalog.ttl", "120").expect("set");
    set_config_value(&store, "region", "fra1").expect("set");
    let reloaded = load_config(&store).expect("load");

    assert_eq!(store.path().expect("path"), path);
    assert_eq!(reloaded.get("catalog.ttl").as_deref(), Some("120"));
    assert_eq!(reloaded.get("region").as_deref(), Some("fra1"));
}
