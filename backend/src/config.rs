//! Service configuration.
//!
//! Settings come from three places, applied in order:
//!
//! 1. A TOML file (`CONFIG_PATH`, or the first `*.toml` in `./config/`)
//! 2. Environment variables, some of them required:
//!    - `PORT` (required)
//!    - `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_USER`, `POSTGRES_DB`
//!      (required for the Postgres backend unless `DATABASE_URL` is set)
//!    - `DATABASE_URL`, `POSTGRES_PASSWORD_FILE`, `REPOSITORY_TYPE` (optional)
//! 3. The database password, read from a mounted secret file when the
//!    connection string is built
//!
//! # Example file
//!
//! ```toml
//! env = "local"
//!
//! [server]
//! read_timeout_secs = 10
//! write_timeout_secs = 10
//!
//! [database]
//! max_open_conns = 25
//! max_idle_conns = 5
//!
//! [log]
//! level = "info"
//! format = "json"
//!
//! [repository]
//! type = "postgres"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::RepositoryType;

/// Errors raised while assembling [`AppConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to read password from secrets file {}: {source}", .path.display())]
    Secret {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment label, only used in log output
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    /// Taken from `PORT`
    #[serde(skip)]
    pub port: u16,
    /// Upper bound for receiving a request body
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Upper bound for producing a response
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
    /// How long in-flight requests may run after a shutdown signal
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

/// Database settings. Connection identity comes from the environment,
/// pool sizing from the file.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(skip)]
    pub host: String,
    #[serde(skip)]
    pub port: u16,
    #[serde(skip)]
    pub user: String,
    #[serde(skip)]
    pub name: String,
    /// Full connection string from `DATABASE_URL`; bypasses DSN construction
    #[serde(skip)]
    pub url: Option<String>,
    #[serde(default = "default_password_file")]
    pub password_file: PathBuf,
    #[serde(default = "default_max_open_conns")]
    pub max_open_conns: u32,
    #[serde(default = "default_max_idle_conns")]
    pub max_idle_conns: u32,
    #[serde(default = "default_conn_max_lifetime")]
    pub conn_max_lifetime_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// debug | info | warn | error; anything else means warn
    #[serde(default = "default_log_level")]
    pub level: String,
    /// json | text; anything else means json
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default)]
    pub repo_type: RepositoryType,
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

fn default_env() -> String {
    "local".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_read_timeout() -> u64 {
    10
}

fn default_write_timeout() -> u64 {
    10
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_password_file() -> PathBuf {
    PathBuf::from("/run/secrets/db-password")
}

fn default_max_open_conns() -> u32 {
    25
}

fn default_max_idle_conns() -> u32 {
    5
}

fn default_conn_max_lifetime() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
            read_timeout_secs: default_read_timeout(),
            write_timeout_secs: default_write_timeout(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 5432,
            user: String::new(),
            name: String::new(),
            url: None,
            password_file: default_password_file(),
            max_open_conns: default_max_open_conns(),
            max_idle_conns: default_max_idle_conns(),
            conn_max_lifetime_secs: default_conn_max_lifetime(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// `url` may embed a password.
impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("password_file", &self.password_file)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime_secs", &self.conn_max_lifetime_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl LogSettings {
    pub fn level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::WARN,
        }
    }

    pub fn format(&self) -> LogFormat {
        match self.format.to_lowercase().as_str() {
            "text" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

impl DatabaseSettings {
    /// Build the libpq connection string, reading the password from the secret file.
    ///
    /// `DATABASE_URL`, when set, is returned as is.
    pub fn dsn(&self) -> Result<String, ConfigError> {
        if let Some(ref url) = self.url {
            return Ok(url.clone());
        }

        let password = fs::read_to_string(&self.password_file).map_err(|source| {
            ConfigError::Secret {
                path: self.password_file.clone(),
                source,
            }
        })?;

        Ok(format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            self.host,
            self.port,
            self.user,
            password.trim(),
            self.name
        ))
    }

    /// Pool configuration for the Postgres backend.
    #[cfg(feature = "postgres-repo")]
    pub fn postgres_config(&self) -> Result<crate::db::PostgresConfig, ConfigError> {
        Ok(crate::db::PostgresConfig {
            database_url: self.dsn()?,
            max_open_conns: self.max_open_conns,
            max_idle_conns: self.max_idle_conns,
            conn_max_lifetime_sec: self.conn_max_lifetime_secs,
            connection_timeout_sec: self.connect_timeout_secs,
        })
    }
}

impl AppConfig {
    /// Locate, read, and complete the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::locate()?;
        Self::load_from(path)
    }

    /// Read `path` and complete it from the process environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Find the config file: `CONFIG_PATH` if set, else the first `*.toml`
    /// (by name) in `./config/`.
    pub fn locate() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }
        find_config_file(Path::new("config"))
    }

    /// Parse a TOML file without consulting the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Fill environment-sourced fields using `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.port = parse_var("PORT", &required(&lookup, "PORT")?)?;

        if let Some(value) = lookup("REPOSITORY_TYPE") {
            self.repository.repo_type = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "REPOSITORY_TYPE",
                value,
            })?;
        }

        if let Some(path) = lookup("POSTGRES_PASSWORD_FILE") {
            self.database.password_file = PathBuf::from(path);
        }

        self.database.url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        if self.repository.repo_type == RepositoryType::Postgres && self.database.url.is_none() {
            self.database.host = required(&lookup, "POSTGRES_HOST")?;
            self.database.port = parse_var("POSTGRES_PORT", &required(&lookup, "POSTGRES_PORT")?)?;
            self.database.user = required(&lookup, "POSTGRES_USER")?;
            self.database.name = required(&lookup, "POSTGRES_DB")?;
        }

        Ok(())
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingEnv(key))
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

fn find_config_file(dir: &Path) -> Result<PathBuf, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::NotFound(dir.join("*.toml")))
}
