use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::time::Duration;
use stockkpi::providers::{
    DEFAULT_ALPHA_VANTAGE_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_YAHOO_BASE_URL,
    DEFAULT_YAHOO_SESSION_URL, ProviderSettings,
};
use thiserror::Error;

pub const DEFAULT_SERVICE_NAME: &str = "stock-kpi-dashboard";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_RATE_LIMIT_PER_SECOND: u64 = 2;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// Per-IP request budget for the /api routes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst_size: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            per_second: DEFAULT_RATE_LIMIT_PER_SECOND,
            burst_size: DEFAULT_RATE_LIMIT_BURST,
        }
    }
}

// YAML-serializable configuration structure; omitted keys take defaults
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfigYaml {
    pub service_name: Option<String>,
    pub environment: Option<String>,
    pub port: Option<u16>,
    pub alpha_vantage_api_key: Option<String>,
    pub yahoo_base_url: Option<String>,
    pub yahoo_session_url: Option<String>,
    pub alpha_vantage_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub rate_limit_per_second: Option<u64>,
    pub rate_limit_burst: Option<u32>,
}

// Holds application-wide settings
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub port: u16,
    pub providers: ProviderSettings,
    pub rate_limit: RateLimit,
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            Self::from_env()
        }
    }

    pub fn from_yaml(file_path: &str) -> Result<Self, ConfigError> {
        let yaml_content = fs::read_to_string(file_path).map_err(|source| ConfigError::Read {
            path: file_path.to_string(),
            source,
        })?;

        let yaml_config: ConfigYaml =
            serde_yaml::from_str(&yaml_content).map_err(|source| ConfigError::Parse {
                path: file_path.to_string(),
                source,
            })?;

        Self::from_yaml_config(yaml_config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Numbers that fail to parse fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse().ok());

        Self::from_yaml_config(ConfigYaml {
            service_name: lookup("SERVICE_NAME"),
            environment: lookup("ENVIRONMENT"),
            port: parsed("PORT").and_then(|p: u64| u16::try_from(p).ok()),
            alpha_vantage_api_key: lookup("ALPHA_VANTAGE_API_KEY"),
            yahoo_base_url: lookup("YAHOO_BASE_URL"),
            yahoo_session_url: lookup("YAHOO_SESSION_URL"),
            alpha_vantage_base_url: lookup("ALPHA_VANTAGE_BASE_URL"),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS"),
            rate_limit_per_second: parsed("RATE_LIMIT_PER_SECOND"),
            rate_limit_burst: parsed("RATE_LIMIT_BURST").and_then(|b: u64| u32::try_from(b).ok()),
        })
    }

    fn from_yaml_config(yaml: ConfigYaml) -> Result<Self, ConfigError> {
        let non_blank = |value: Option<String>| value.filter(|s| !s.trim().is_empty());

        // An explicitly empty session URL disables the crumb handshake
        let yahoo_session_url = match yaml.yahoo_session_url {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url),
            None => Some(DEFAULT_YAHOO_SESSION_URL.to_string()),
        };

        let rate_limit = RateLimit {
            per_second: yaml.rate_limit_per_second.unwrap_or(DEFAULT_RATE_LIMIT_PER_SECOND),
            burst_size: yaml.rate_limit_burst.unwrap_or(DEFAULT_RATE_LIMIT_BURST),
        };
        if rate_limit.per_second == 0 || rate_limit.burst_size == 0 {
            return Err(ConfigError::Invalid(
                "rate limit period and burst size must be positive".to_string(),
            ));
        }

        let timeout_secs = yaml.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid("request timeout must be positive".to_string()));
        }

        Ok(Self {
            service_name: non_blank(yaml.service_name)
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            environment: non_blank(yaml.environment)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            port: yaml.port.unwrap_or(DEFAULT_PORT),
            providers: ProviderSettings {
                yahoo_base_url: non_blank(yaml.yahoo_base_url)
                    .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
                yahoo_session_url,
                alpha_vantage_base_url: non_blank(yaml.alpha_vantage_base_url)
                    .unwrap_or_else(|| DEFAULT_ALPHA_VANTAGE_BASE_URL.to_string()),
                alpha_vantage_api_key: non_blank(yaml.alpha_vantage_api_key),
                timeout: Duration::from_secs(timeout_secs),
            },
            rate_limit,
        })
    }
}
