use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: {key} must be valid (got {value:?})")]
    Invalid { key: &'static str, value: String },

    #[error("Config error: {0} must be greater than zero")]
    Zero(&'static str),

    #[error("Config error: HTTP base URL must start with http:// or https:// (got {0:?})")]
    BaseUrl(String),
}

// --- CONFIG AGGREGATOR ---

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Environment (and `.env`) over built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Ok(Self {
            server: ServerConfig::load()?,
            store: StoreConfig::load()?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.server.http_base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::BaseUrl(base.clone()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Zero("MAX_BODY_BYTES"));
        }
        if self.store.ring_capacity == 0 {
            return Err(ConfigError::Zero("STORE_RING_CAPACITY"));
        }
        if self.store.max_tenants == 0 {
            return Err(ConfigError::Zero("STORE_MAX_TENANTS"));
        }
        if self.store.ttl.is_zero() {
            return Err(ConfigError::Zero("STORE_TTL_SECS"));
        }
        if self.store.sweep_interval.is_zero() {
            return Err(ConfigError::Zero("STORE_SWEEP_INTERVAL_SECS"));
        }
        Ok(())
    }
}

// --- MODULES ---

// SERVER
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_address: String,
    /// Public URL the service is reached at; prefixes every link handed to clients
    pub http_base_url: String,
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl ServerConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            listen_address: get_env("LISTEN_ADDRESS", "127.0.0.1:1234")?,
            http_base_url:  get_env("HTTP_BASE_URL", "http://localhost:1234")?,
            max_body_bytes: get_env("MAX_BODY_BYTES", "1048576")?, // 1MB
            log_level:      get_env("PREVIEW_LOG", "info")?,
        })
    }

    /// Absolute URL for a path on this service.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_base_url.trim_end_matches('/'), path)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:1234".to_string(),
            http_base_url: "http://localhost:1234".to_string(),
            max_body_bytes: 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

// STORE
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Requests kept per endpoint
    pub ring_capacity: usize,
    /// Live endpoints kept at once
    pub max_tenants: usize,
    /// Idle time after which an endpoint's history is dropped
    pub ttl: Duration,
    pub sweep_interval: Duration,
    /// Whether viewing an endpoint counts as activity
    pub touch_on_read: bool,
}

impl StoreConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            ring_capacity:  get_env("STORE_RING_CAPACITY", "10")?,
            max_tenants:    get_env("STORE_MAX_TENANTS", "100")?,
            ttl:            Duration::from_secs(get_env("STORE_TTL_SECS", "1800")?), // 30 minutes
            sweep_interval: Duration::from_secs(get_env("STORE_SWEEP_INTERVAL_SECS", "60")?),
            touch_on_read:  get_env("STORE_TOUCH_ON_READ", "true")?,
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ring_capacity: 10,
            max_tenants: 100,
            ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            touch_on_read: true,
        }
    }
}

// --- PRIVATE HELPER ---

fn get_env<T: std::str::FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.store.ring_capacity, 10);
        assert_eq!(config.store.max_tenants, 100);
        assert_eq!(config.store.ttl, Duration::from_secs(1800));
        assert!(config.store.touch_on_read);
    }

    #[test]
    fn rejects_zero_capacity_and_bad_base_url() {
        let mut config = Config::default();
        config.store.max_tenants = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Zero("STORE_MAX_TENANTS"))));

        let mut config = Config::default();
        config.server.http_base_url = "localhost:1234".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::BaseUrl(_))));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let server = ServerConfig {
            http_base_url: "https://hooks.example.com/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(server.url("/view/abc"), "https://hooks.example.com/view/abc");
    }

    #[test]
    fn get_env_reports_unparseable_values() {
        let err = get_env::<usize>("PREVIEW_TEST_UNSET_KEY_FOR_PARSE", "ten").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PREVIEW_TEST_UNSET_KEY_FOR_PARSE", .. }));
    }
}
