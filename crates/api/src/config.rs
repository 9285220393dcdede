//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::{DEFAULT_TIMEOUT, ServiceConfig, UnknownItemPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string (unset: in-memory stores)
/// - `STORE_TIMEOUT_MS`: deadline for every store call (default: `5000`)
/// - `UNKNOWN_ITEM_POLICY`: `reject` or `exclude` (default: `reject`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub store_timeout: Duration,
    pub unknown_items: UnknownItemPolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            store_timeout: std::env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
            unknown_items: std::env::var("UNKNOWN_ITEM_POLICY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings handed to the order service.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            timeout: self.store_timeout,
            unknown_items: self.unknown_items,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            store_timeout: DEFAULT_TIMEOUT,
            unknown_items: UnknownItemPolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.unknown_items, UnknownItemPolicy::Reject);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_service_config() {
        let config = Config {
            store_timeout: Duration::from_millis(250),
            unknown_items: UnknownItemPolicy::Exclude,
            ..Config::default()
        };

        let service = config.service_config();
        assert_eq!(service.timeout, Duration::from_millis(250));
        assert_eq!(service.unknown_items, UnknownItemPolicy::Exclude);
    }
}
