//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `dsbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use dsbridge_adapter_storage_sqlite_sqlx::pool::DATABASE_URL_ENV;
use dsbridge_adapter_virtual::{VirtualConfig, VirtualScene, demo_scenes};
use dsbridge_app::integration::{
    ConnectionParams, DEFAULT_ALIAS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RETRY_DELAY,
    DEFAULT_STACK_DELAY,
};
use dsbridge_domain::connection::ConnectionSlug;

const DEMO_TOKEN: &str = "demo-token";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// One entry per digitalSTROM server.
    pub digitalstrom: Vec<DigitalStromConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// A digitalSTROM server entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigitalStromConfig {
    pub host: String,
    pub port: u16,
    /// App token; a server without one is skipped at startup.
    pub token: Option<String>,
    pub alias: String,
    /// Outbound stack delay in milliseconds.
    pub delay_ms: u64,
    /// Pause before the single setup retry, in milliseconds.
    pub retry_delay_ms: u64,
    /// Interval between setup attempts while the server is not ready.
    pub reschedule_secs: u64,
    /// Simulated server backing this entry.
    #[serde(rename = "virtual")]
    pub simulated: SimulatedConfig,
}

/// Settings of the simulated server behind a [`DigitalStromConfig`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatedConfig {
    /// Token the simulated server accepts. Defaults to the entry's token.
    pub token: Option<String>,
    pub scenes: Vec<VirtualScene>,
}

impl Config {
    /// Load configuration from `dsbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("dsbridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DSBRIDGE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("DSBRIDGE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("DSBRIDGE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var(DATABASE_URL_ENV) {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("DSBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let mut seen = HashSet::new();
        for entry in &self.digitalstrom {
            if entry.port == 0 {
                return Err(ConfigError::Validation(format!(
                    "digitalSTROM port of {} must be non-zero",
                    entry.host
                )));
            }
            let slug = entry.slug();
            if !seen.insert(slug.clone()) {
                return Err(ConfigError::Validation(format!(
                    "digitalSTROM server {slug} is configured twice"
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl DigitalStromConfig {
    #[must_use]
    pub fn slug(&self) -> ConnectionSlug {
        ConnectionSlug::new(&self.host, self.port)
    }

    #[must_use]
    pub fn reschedule(&self) -> Duration {
        Duration::from_secs(self.reschedule_secs)
    }

    /// Connection parameters handed to the integration.
    #[must_use]
    pub fn params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.host.clone(),
            port: self.port,
            token: self.token.clone(),
            alias: self.alias.clone(),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Settings of the simulated server.
    #[must_use]
    pub fn simulated(&self) -> VirtualConfig {
        VirtualConfig {
            apartment: self.alias.clone(),
            token: self
                .simulated
                .token
                .clone()
                .or_else(|| self.token.clone())
                .unwrap_or_default(),
            stack_delay: Duration::from_millis(self.delay_ms),
            scenes: self.simulated.scenes.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            digitalstrom: vec![DigitalStromConfig {
                token: Some(DEMO_TOKEN.to_string()),
                ..DigitalStromConfig::default()
            }],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:dsbridge.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "dsbridged=info,dsbridge_app=info,dsbridge_adapter_virtual=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for DigitalStromConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token: None,
            alias: DEFAULT_ALIAS.to_string(),
            delay_ms: u64::try_from(DEFAULT_STACK_DELAY.as_millis()).unwrap_or(u64::MAX),
            retry_delay_ms: u64::try_from(DEFAULT_RETRY_DELAY.as_millis()).unwrap_or(u64::MAX),
            reschedule_secs: 30,
            simulated: SimulatedConfig::default(),
        }
    }
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            token: None,
            scenes: demo_scenes(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
