//! Application configuration loaded from environment variables.

use std::time::Duration;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `"0.0.0.0"`)
/// - `PORT`: listen port (default `3000`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `LOG_FORMAT`: `json` for structured output, anything else for text
/// - `DATABASE_URL`: Postgres event store when set, in-memory otherwise
/// - `REACTION_POLL_INTERVAL_MS`: how often event reactions poll the log (default `500`)
/// - `CURRENCY`: currency sent to the payment provider (default `"usd"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub reaction_poll_interval: Duration,
    pub currency: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            reaction_poll_interval: lookup("REACTION_POLL_INTERVAL_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.reaction_poll_interval),
            currency: lookup("CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or(defaults.currency),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            reaction_poll_interval: Duration::from_millis(500),
            currency: "usd".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.database_url.is_none());
        assert_eq!(config.reaction_poll_interval, Duration::from_millis(500));
        assert_eq!(config.currency, "usd");
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
    fn reads_every_variable() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://shop@localhost/shop"),
            ("REACTION_POLL_INTERVAL_MS", "50"),
            ("CURRENCY", "EUR"),
        ]);

        assert_eq!(config.addr(), "127.0.0.1:8081");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://shop@localhost/shop")
        );
        assert_eq!(config.reaction_poll_interval, Duration::from_millis(50));
        assert_eq!(config.currency, "eur");
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = config_from(&[
            ("PORT", "http"),
            ("REACTION_POLL_INTERVAL_MS", "soon"),
            ("DATABASE_URL", "  "),
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.reaction_poll_interval, Duration::from_millis(500));
        assert!(config.database_url.is_none());
    }
}
