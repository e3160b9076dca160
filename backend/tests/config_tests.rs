//! Config loading against the process environment.

mod support;

use std::fs;
use std::path::PathBuf;

use qa_service::config::{AppConfig, ConfigError, LogFormat};
use qa_service::db::RepositoryType;
use support::with_scoped_env;

const ENV_KEYS: &[&str] = &[
    "CONFIG_PATH",
    "PORT",
    "REPOSITORY_TYPE",
    "DATABASE_URL",
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_USER",
    "POSTGRES_DB",
    "POSTGRES_PASSWORD_FILE",
];

/// Clear every variable the loader reads, then apply `set`.
fn env_with<'a>(set: &[(&'a str, &'a str)]) -> Vec<(&'a str, Option<&'a str>)> {
    let mut changes: Vec<(&str, Option<&str>)> = ENV_KEYS
        .iter()
        .filter(|k| !set.iter().any(|(s, _)| s == *k))
        .map(|k| (*k, None))
        .collect();
    changes.extend(set.iter().map(|(k, v)| (*k, Some(*v))));
    changes
}

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("qa-service-{}-{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

fn sample_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/server.toml")
}

#[test]
fn test_sample_config_parses() {
    let config = AppConfig::from_file(sample_config()).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.shutdown_grace_secs, 30);
    assert_eq!(config.database.max_open_conns, 25);
    assert_eq!(config.log.format(), LogFormat::Json);
    assert_eq!(config.repository.repo_type, RepositoryType::Postgres);
}

#[test]
fn test_load_from_reads_port_and_repository_type() {
    let changes = env_with(&[("PORT", "8081"), ("REPOSITORY_TYPE", "local")]);
    let config = with_scoped_env(&changes, || AppConfig::load_from(sample_config())).unwrap();

    assert_eq!(config.server.port, 8081);
    assert_eq!(config.repository.repo_type, RepositoryType::Local);
}

#[test]
fn test_load_from_missing_port() {
    let changes = env_with(&[("REPOSITORY_TYPE", "local")]);
    let err = with_scoped_env(&changes, || AppConfig::load_from(sample_config())).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnv("PORT")));
}

#[test]
fn test_load_from_missing_file() {
    let changes = env_with(&[("PORT", "8080")]);
    let err = with_scoped_env(&changes, || {
        AppConfig::load_from("/definitely/not/here/server.toml")
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_postgres_dsn_from_env_and_secret_file() {
    let secret = write_temp("db-password", "s3cret\n");
    let secret_path = secret.to_string_lossy().into_owned();
    let changes = env_with(&[
        ("PORT", "8080"),
        ("POSTGRES_HOST", "db.internal"),
        ("POSTGRES_PORT", "6543"),
        ("POSTGRES_USER", "qa"),
        ("POSTGRES_DB", "qa_db"),
        ("POSTGRES_PASSWORD_FILE", &secret_path),
    ]);

    let config = with_scoped_env(&changes, || AppConfig::load_from(sample_config())).unwrap();
    let dsn = config.database.dsn().unwrap();
    fs::remove_file(&secret).ok();

    assert_eq!(
        dsn,
        "host=db.internal port=6543 user=qa password=s3cret dbname=qa_db sslmode=disable"
    );
    assert!(!format!("{:?}", config.database).contains("s3cret"));
}

#[test]
fn test_postgres_missing_secret_file() {
    let changes = env_with(&[
        ("PORT", "8080"),
        ("POSTGRES_HOST", "db"),
        ("POSTGRES_PORT", "5432"),
        ("POSTGRES_USER", "qa"),
        ("POSTGRES_DB", "qa_db"),
        ("POSTGRES_PASSWORD_FILE", "/definitely/not/here/secret"),
    ]);
    let config = with_scoped_env(&changes, || AppConfig::load_from(sample_config())).unwrap();
    assert!(matches!(
        config.database.dsn().unwrap_err(),
        ConfigError::Secret { .. }
    ));
}

#[test]
fn test_postgres_invalid_port() {
    let changes = env_with(&[
        ("PORT", "8080"),
        ("POSTGRES_HOST", "db"),
        ("POSTGRES_PORT", "not-a-port"),
        ("POSTGRES_USER", "qa"),
        ("POSTGRES_DB", "qa_db"),
    ]);
    let err = with_scoped_env(&changes, || AppConfig::load_from(sample_config())).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidEnv {
            key: "POSTGRES_PORT",
            ..
        }
    ));
}

#[test]
fn test_locate_honours_config_path() {
    let path = write_temp("located.toml", "env = \"staging\"\n");
    let path_str = path.to_string_lossy().into_owned();
    let changes = env_with(&[("CONFIG_PATH", &path_str), ("PORT", "8080"), ("REPOSITORY_TYPE", "local")]);

    let config = with_scoped_env(&changes, AppConfig::load).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.env, "staging");
    assert_eq!(config.server.port, 8080);
}
