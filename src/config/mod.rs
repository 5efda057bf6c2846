//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::riot::{
    GatewayConfig, HttpTransportConfig, Platform, QueueType, QuotaLimits, Region, RetryPolicy,
};
use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Riot API key not set (expected in ${0})")]
    MissingApiKey(String),
}

/// Riot API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_api_domain")]
    pub api_domain: String,

    #[serde(default = "default_platform")]
    pub platform: Platform,

    /// Regional routing override. Derived from the platform when absent.
    #[serde(default)]
    pub region: Option<Region>,

    #[serde(default = "default_queue")]
    pub queue: QueueType,

    /// Per-attempt HTTP timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,

    /// How long a caller waits for a queued request, if bounded.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,

    #[serde(default = "default_short_cap")]
    pub per_second_cap: usize,

    #[serde(default = "default_long_cap")]
    pub per_two_minutes_cap: usize,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait applied to a 429 without a Retry-After header.
    #[serde(default = "default_retry_after")]
    pub default_retry_after_seconds: u64,
}

fn default_api_key_env() -> String {
    "RIOT_TOKEN".to_string()
}

fn default_api_domain() -> String {
    "api.riotgames.com".to_string()
}

fn default_platform() -> Platform {
    Platform::Eun1
}

fn default_queue() -> QueueType {
    QueueType::RankedSolo
}

fn default_http_timeout() -> u64 {
    30
}

fn default_short_cap() -> usize {
    20
}

fn default_long_cap() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_after() -> u64 {
    1
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_domain: default_api_domain(),
            platform: default_platform(),
            region: None,
            queue: default_queue(),
            http_timeout_seconds: default_http_timeout(),
            request_timeout_seconds: None,
            per_second_cap: default_short_cap(),
            per_two_minutes_cap: default_long_cap(),
            max_attempts: default_max_attempts(),
            default_retry_after_seconds: default_retry_after(),
        }
    }
}

impl RiotConfig {
    pub fn region(&self) -> Region {
        self.region.unwrap_or_else(|| self.platform.region())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingApiKey(self.api_key_env.clone())),
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            limits: QuotaLimits {
                short_cap: self.per_second_cap,
                long_cap: self.per_two_minutes_cap,
                ..QuotaLimits::default()
            },
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                default_delay: Duration::from_secs(self.default_retry_after_seconds),
            },
            request_timeout: self.request_timeout_seconds.map(Duration::from_secs),
        }
    }

    pub fn transport_config(&self, api_key: String) -> HttpTransportConfig {
        HttpTransportConfig {
            api_domain: self.api_domain.clone(),
            timeout: Duration::from_secs(self.http_timeout_seconds),
            ..HttpTransportConfig::new(api_key)
        }
    }
}

/// Analysis run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_matches_per_player")]
    pub matches_per_player: u32,

    /// Seconds before the HTTP surface reloads the artifact.
    #[serde(default = "default_freshness")]
    pub freshness_seconds: u64,

    /// Tier-list rows below this many games are hidden by the API.
    #[serde(default = "default_min_games")]
    pub min_games: u32,

    #[serde(default)]
    pub max_players: Option<usize>,
}

fn default_matches_per_player() -> u32 {
    10
}

fn default_freshness() -> u64 {
    600
}

fn default_min_games() -> u32 {
    10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            matches_per_player: default_matches_per_player(),
            freshness_seconds: default_freshness(),
            min_games: default_min_games(),
            max_players: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    /// `None` when any origin is allowed.
    pub fn cors_origin(&self) -> Option<&str> {
        match self.cors_origin.as_str() {
            "*" | "" => None,
            origin => Some(origin),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub riot: RiotConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            riot: RiotConfig::default(),
            analysis: AnalysisConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use validated defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.riot.per_second_cap == 0 || self.riot.per_two_minutes_cap == 0 {
            return Err(ConfigError::ValidationError(
                "Rate limit caps must be greater than 0".to_string(),
            ));
        }

        if self.riot.http_timeout_seconds == 0 || self.riot.request_timeout_seconds == Some(0) {
            return Err(ConfigError::ValidationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.riot.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "Retry attempts must be greater than 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.analysis.matches_per_player) {
            return Err(ConfigError::ValidationError(format!(
                "matches_per_player must be between 1 and 100, got {}",
                self.analysis.matches_per_player
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.riot.api_key_env, "RIOT_TOKEN");
        assert_eq!(config.riot.platform, Platform::Eun1);
        assert_eq!(config.riot.region(), Region::Europe);
        assert_eq!(config.analysis.matches_per_player, 10);
        assert_eq!(config.analysis.min_games, 10);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/var/lib/rift"

            [riot]
            platform = "kr"
            per_second_cap = 10

            [analysis]
            matches_per_player = 20
            max_players = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/rift"));
        assert_eq!(config.riot.platform, Platform::Kr);
        assert_eq!(config.riot.region(), Region::Asia);
        assert_eq!(config.riot.per_two_minutes_cap, 100);
        assert_eq!(config.analysis.max_players, Some(50));
        assert_eq!(config.server.host, "127.0.0.1");

        let gateway = config.riot.gateway_config();
        assert_eq!(gateway.limits.short_cap, 10);
        assert_eq!(gateway.limits.long_window, Duration::from_secs(120));
        assert_eq!(gateway.retry.max_attempts, 3);
        assert_eq!(gateway.request_timeout, None);
    }

    #[test]
    fn test_region_override() {
        let config = AppConfig::from_toml("[riot]\nplatform = \"oc1\"\nregion = \"americas\"").unwrap();
        assert_eq!(config.riot.region(), Region::Americas);
    }

    #[test]
    fn test_invalid_zero_cap() {
        let mut config = AppConfig::default();
        config.riot.per_second_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_zero_timeout() {
        let mut config = AppConfig::default();
        config.riot.request_timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_zero_attempts() {
        let mut config = AppConfig::default();
        config.riot.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_match_page_size() {
        let mut config = AppConfig::default();
        config.analysis.matches_per_player = 101;
        assert!(config.validate().is_err());
        config.analysis.matches_per_player = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[riot\nplatform = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_missing_api_key() {
        let riot = RiotConfig {
            api_key_env: "RIFT_META_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(riot.api_key(), Err(ConfigError::MissingApiKey(var)) if var == "RIFT_META_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_transport_config() {
        let riot = RiotConfig {
            api_domain: "example.test".to_string(),
            http_timeout_seconds: 5,
            ..Default::default()
        };
        let transport = riot.transport_config("RGAPI-key".to_string());
        assert_eq!(transport.api_key, "RGAPI-key");
        assert_eq!(transport.api_domain, "example.test");
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_cors_origin() {
        let mut server = ServerConfig::default();
        assert_eq!(server.cors_origin(), None);
        server.cors_origin = "http://localhost:3000".to_string();
        assert_eq!(server.cors_origin(), Some("http://localhost:3000"));
    }
}
