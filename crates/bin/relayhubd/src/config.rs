//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `relayhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use relayhub_domain::device::Polarity;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub rtdb: RtdbConfig,
    pub ollama: OllamaConfig,
    pub relays: RelaysConfig,
    pub scheduler: SchedulerConfig,
    pub automation: AutomationConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
}

/// Which store backs relays, sensors, timers and settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Rtdb,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "rtdb" => Ok(Self::Rtdb),
            other => Err(ConfigError::Validation(format!(
                "unknown store backend `{other}` (expected `sqlite` or `rtdb`)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Realtime-Database REST configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RtdbConfig {
    /// Database root URL; required when the backend is `rtdb`.
    pub url: String,
    pub auth: Option<String>,
    pub timeout_secs: u64,
}

/// Language-model proxy configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelaysConfig {
    /// Relay board energises on a low level (stored `false` = ON).
    pub active_low: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_millis: u64,
}

/// Motion lighting and fire alert settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub enabled: bool,
    /// Whose settings drive the sensor watcher.
    pub user_id: String,
    pub poll_millis: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `relayhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("relayhub.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
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

    fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("RELAYHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("RELAYHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("RELAYHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("RELAYHUB_STORE") {
            self.store.backend = val.parse()?;
        }
        if let Some(val) = var("RELAYHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("RELAYHUB_RTDB_URL") {
            self.rtdb.url = val;
        }
        if let Some(val) = var("RELAYHUB_RTDB_AUTH") {
            self.rtdb.auth = Some(val);
        }
        if let Some(val) = var("RELAYHUB_OLLAMA_URL") {
            self.ollama.base_url = val;
        }
        if let Some(val) = var("RELAYHUB_OLLAMA_MODEL") {
            self.ollama.model = val;
        }
        if let Some(val) = var("RELAYHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.store.backend == StoreBackend::Rtdb && self.rtdb.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "rtdb.url is required when the store backend is `rtdb`".to_string(),
            ));
        }
        if self.scheduler.tick_millis == 0 {
            return Err(ConfigError::Validation(
                "scheduler.tick_millis must be non-zero".to_string(),
            ));
        }
        if self.automation.enabled && self.automation.poll_millis == 0 {
            return Err(ConfigError::Validation(
                "automation.poll_millis must be non-zero".to_string(),
            ));
        }
        if self.ollama.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ollama.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        Polarity::from_active_low(self.relays.active_low)
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.scheduler.tick_millis)
    }

    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.automation.poll_millis)
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
            url: relayhub_adapter_storage_sqlite_sqlx::pool::DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl Default for RtdbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth: None,
            timeout_secs: 10,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            model: relayhub_adapter_ollama::DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for RelaysConfig {
    fn default() -> Self {
        Self { active_low: true }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_millis: 1000 }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_id: "default".to_string(),
            poll_millis: 2000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "relayhubd=info,relayhub=info,tower_http=debug".to_string(),
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

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.database.url, "sqlite:relayhub.db?mode=rwc");
        assert_eq!(config.ollama.model, "phi3:latest");
        assert_eq!(config.polarity(), Polarity::ActiveLow);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.poll_period(), Duration::from_secs(2));
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [store]
            backend = 'rtdb'

            [rtdb]
            url = 'https://home.example.com'
            auth = 'secret'
            timeout_secs = 5

            [ollama]
            base_url = 'http://10.0.0.2:5001'
            model = 'llama3'
            timeout_secs = 30

            [relays]
            active_low = false

            [scheduler]
            tick_millis = 500

            [automation]
            enabled = false
            user_id = 'u42'
            poll_millis = 1000

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.store.backend, StoreBackend::Rtdb);
        assert_eq!(config.rtdb.auth.as_deref(), Some("secret"));
        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.polarity(), Polarity::ActiveHigh);
        assert_eq!(config.scheduler.tick_millis, 500);
        assert_eq!(config.automation.user_id, "u42");
        assert!(!config.automation.enabled);
        assert_eq!(config.logging.filter, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_apply_env_overrides_over_file_values() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("RELAYHUB_BIND", "127.0.0.1:8081"),
                ("RELAYHUB_STORE", "RTDB"),
                ("RELAYHUB_RTDB_URL", "https://home.example.com"),
                ("RELAYHUB_OLLAMA_MODEL", "mistral"),
                ("RELAYHUB_LOG", "warn"),
                ("RUST_LOG", "trace"),
            ]))
            .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.store.backend, StoreBackend::Rtdb);
        assert_eq!(config.rtdb.url, "https://home.example.com");
        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[("RELAYHUB_PORT", "eighty")]))
            .unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_unknown_store_backend() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(env(&[("RELAYHUB_STORE", "redis")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_require_rtdb_url_for_rtdb_backend() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Rtdb;
        assert!(config.validate().is_err());
        config.rtdb.url = "https://home.example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_zero_tick() {
        let mut config = Config::default();
        config.scheduler.tick_millis = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
