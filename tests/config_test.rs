//! Configuration files and engine assembly

use newsrelay::{BackendRepository, ComponentStatus, Config, Engine, NntpError, Store};
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"{
    "debug": true,
    "database": "relay.db",
    "backends": [
        {"type": "nntp", "name": "eweka", "server": "news.eweka.nl", "port": 563,
         "tls": true, "user": "me", "pass": "secret", "sync_groups": 3},
        {"name": "local", "server": "localhost"}
    ],
    "services": [
        {"type": "nntp", "host": "0.0.0.0", "port": 1119}
    ],
    "users": [
        {"name": "reader", "pass": "hunter2"}
    ]
}"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(FULL_CONFIG);
    let config = Config::load(file.path()).unwrap();

    assert!(config.debug);
    assert_eq!(config.database, "relay.db");
    assert_eq!(config.backends.len(), 2);

    let eweka = &config.backends[0];
    assert_eq!(eweka.address(), "news.eweka.nl:563");
    assert!(eweka.tls);
    assert!(eweka.has_credentials());
    assert_eq!(eweka.sync_groups, 3);

    let local = &config.backends[1];
    assert_eq!(local.kind, "nntp");
    assert_eq!(local.address(), "localhost:119");
    assert!(!local.has_credentials());

    assert_eq!(config.services[0].address(), "0.0.0.0:1119");
    assert_eq!(config.users[0].name, "reader");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, NntpError::Config(_)));
}

#[test]
fn test_load_malformed_json() {
    let file = write_config("{ not json");
    assert!(matches!(
        Config::load(file.path()).unwrap_err(),
        NntpError::Json(_)
    ));
}

#[test]
fn test_empty_server_rejected() {
    let file = write_config(r#"{"backends":[{"name":"src","server":""}]}"#);
    assert!(matches!(
        Config::load(file.path()).unwrap_err(),
        NntpError::Config(_)
    ));
}

#[tokio::test]
async fn test_engine_from_config_seeds_users() {
    let config = Config::from_json(FULL_CONFIG).unwrap();
    let store = Store::open_in_memory().unwrap();

    let engine = Engine::from_config(&config, store.clone()).await.unwrap();

    assert!(store.verify_user("reader", "hunter2").await.unwrap());
    assert!(!store.verify_user("reader", "wrong").await.unwrap());

    let names: Vec<&str> = engine.backends().iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["eweka", "local"]);
    for backend in engine.backends() {
        assert_eq!(backend.kind(), "nntp");
        assert_eq!(backend.status().await, ComponentStatus::Down);
    }
}
