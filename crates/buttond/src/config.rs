//! Configuration file parsing and structures.
//!
//! buttond reads a single TOML file at startup. Everything in it is fixed for the
//! lifetime of the process.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;

/// Top-level configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub bus: BusConfig,
    pub fixtures: FixturesConfig,
    #[serde(default)]
    pub front_door: FrontDoorConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,

    /// Per-target levels, e.g. `"buttond::bus" = "debug"`
    #[serde(default)]
    pub overrides: HashMap<String, LogLevel>,
}

impl LoggingConfig {
    /// Build a tracing filter from the default level and the per-target overrides
    pub fn targets(&self) -> Targets {
        self.overrides
            .iter()
            .fold(Targets::new().with_default(self.level), |targets, (target, level)| {
                targets.with_target(target.clone(), *level)
            })
    }
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "buttond".to_string()
}

fn default_topic() -> String {
    "shack.input/type.binary.alias/+".to_string()
}

/// Event bus (MQTT) carrying button telemetry
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// MQTT broker hostname or IP address
    pub broker: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Topic filter the button envelopes are published under
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Optional username, only used together with a password
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Remote fixture service
#[derive(Debug, Clone, Deserialize)]
pub struct FixturesConfig {
    /// Root URL of the service, e.g. "http://192.168.88.30:3545"
    pub base_url: String,

    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FixturesConfig {
    /// Root of the versioned API, without a trailing slash
    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }
}

fn default_auto_off_secs() -> u64 {
    30 * 60
}

/// Front door zone
#[derive(Debug, Clone, Deserialize)]
pub struct FrontDoorConfig {
    /// Seconds after which the front door light is switched off again
    #[serde(default = "default_auto_off_secs")]
    pub auto_off_secs: u64,
}

impl Default for FrontDoorConfig {
    fn default() -> Self {
        Self {
            auto_off_secs: default_auto_off_secs(),
        }
    }
}

impl FrontDoorConfig {
    pub fn auto_off_delay(&self) -> Duration {
        Duration::from_secs(self.auto_off_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        toml::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [bus]
            broker = "192.168.88.30"

            [fixtures]
            base_url = "http://192.168.88.30:3545"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.bus.port, 1883);
        assert_eq!(config.bus.client_id, "buttond");
        assert_eq!(config.bus.topic, "shack.input/type.binary.alias/+");
        assert_eq!(config.fixtures.api_base(), "http://192.168.88.30:3545/api/v1");
        assert_eq!(config.fixtures.timeout_secs, 10);
        assert_eq!(config.front_door.auto_off_delay(), Duration::from_secs(1800));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [logging]
            level = "warn"

            [logging.overrides]
            "buttond::bus" = "trace"

            [bus]
            broker = "localhost"
            port = 11883
            client_id = "buttond-test"
            topic = "input/+"
            username = "shack"
            password = "hunter2"

            [fixtures]
            base_url = "http://localhost:3545/"
            api_prefix = "/api/v2/"
            timeout_secs = 3

            [front_door]
            auto_off_secs = 60
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(
            config.logging.overrides.get("buttond::bus"),
            Some(&LogLevel::Trace)
        );
        assert_eq!(config.bus.port, 11883);
        assert_eq!(config.bus.username.as_deref(), Some("shack"));
        assert_eq!(config.fixtures.api_base(), "http://localhost:3545/api/v2");
        assert_eq!(config.front_door.auto_off_delay(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_fixture_service() {
        let toml = r#"
            [bus]
            broker = "localhost"
        "#;

        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_targets_apply_overrides() {
        let logging = LoggingConfig {
            level: LogLevel::Warn,
            overrides: HashMap::from([("buttond::engine".to_string(), LogLevel::Debug)]),
        };

        let targets = logging.targets();
        assert!(targets.would_enable("buttond::engine::zones", &tracing::Level::DEBUG));
        assert!(!targets.would_enable("buttond::bus", &tracing::Level::INFO));
        assert!(targets.would_enable("buttond::bus", &tracing::Level::WARN));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buttond.toml");
        std::fs::write(
            &path,
            r#"
            [bus]
            broker = "localhost"

            [fixtures]
            base_url = "http://localhost:3545"
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.bus.broker, "localhost");

        let err = Config::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
