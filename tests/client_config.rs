//! Client configuration loading from disk

use std::io::Write;
use std::path::Path;

use revdoc::{ClientConfig, ConfigError, Database};
use tempfile::{NamedTempFile, TempDir};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"{
            "endpoint": "https://store.internal:8530",
            "database": "orders",
            "timeout_secs": 5,
            "user_agent": "orders-service/2.1"
        }"#,
    );

    let config = ClientConfig::load(file.path()).unwrap();
    assert_eq!(config.endpoint, "https://store.internal:8530");
    assert_eq!(config.database.as_deref(), Some("orders"));
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.user_agent, "orders-service/2.1");
    assert_eq!(config.base_url(), "https://store.internal:8530/_db/orders");
}

#[test]
fn test_load_empty_object_gives_defaults() {
    let file = write_config("{}");
    let config = ClientConfig::load(file.path()).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ClientConfig::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Read(_))));
}

#[test]
fn test_load_rejects_invalid_values() {
    let file = write_config(r#"{"endpoint": "", "timeout_secs": 1}"#);
    let result = ClientConfig::load(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            field: "endpoint",
            ..
        })
    ));

    let file = write_config(r#"{"timeout_secs": "soon"}"#);
    assert!(matches!(
        ClientConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_saved_config_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.json");
    let config = ClientConfig::with_endpoint("http://10.0.0.7:8529")
        .database("metrics")
        .timeout_secs(12);

    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    assert_eq!(ClientConfig::load(Path::new(&path)).unwrap(), config);
}

#[test]
fn test_connect_does_not_contact_store() {
    // no server on this address; building the client must still succeed
    let config = ClientConfig::with_endpoint("http://127.0.0.1:9").timeout_secs(1);
    let db = Database::connect(&config).unwrap();
    assert_eq!(db.transport().base_url(), "http://127.0.0.1:9");

    let invalid = ClientConfig::with_endpoint("127.0.0.1:8529");
    assert!(Database::connect(&invalid).is_err());
}
