//! Config file loading through the public API.

use std::fs;

use awssm::commands::resolve_secret;
use awssm::{AwssmError, Config};
use uuid::Uuid;

#[test]
fn test_load_from_path() {
    let dir = std::env::temp_dir().join(Uuid::new_v4().to_string());
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("awssm.kdl");
    fs::write(
        &path,
        "defaults profile=\"staging\" endpoint_url=\"http://localhost:4566\" default_secret=\"staging/app\"\n",
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.profile().as_deref(), Some("staging"));
    assert_eq!(
        config.endpoint_url().as_deref(),
        Some("http://localhost:4566")
    );
    assert!(config.verify_version());

    let secret = resolve_secret(None, &config).unwrap();
    assert_eq!(secret.as_str(), "staging/app");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_from_missing_path_is_config_error() {
    let path = std::env::temp_dir()
        .join(Uuid::new_v4().to_string())
        .join("awssm.kdl");
    let err = Config::load_from_path(&path).unwrap_err();
    assert!(matches!(err, AwssmError::Config(_)));
    assert!(err.is_configuration());
}
