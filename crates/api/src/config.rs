//! Application configuration loaded from environment variables.

use reporting::ReportClock;
use sales::StockPolicy;
use thiserror::Error;

/// A configuration value could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables (after an optional `.env` file):
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8080`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL` or `DB_CONN`: Postgres URL; unset runs on the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `STOCK_POLICY`: `reject` or `allow-negative` (default: `reject`)
/// - `REPORT_UTC_OFFSET`: e.g. `+07:00`; unset reports in server local time
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub stock_policy: StockPolicy,
    pub report_clock: ReportClock,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid("PORT", &raw, e))?,
            None => defaults.port,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(invalid("LOG_FORMAT", &raw, "expected 'text' or 'json'")),
            },
            None => defaults.log_format,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => return Err(invalid("DATABASE_MAX_CONNECTIONS", &raw, "must be > 0")),
                Ok(n) => n,
                Err(e) => return Err(invalid("DATABASE_MAX_CONNECTIONS", &raw, e)),
            },
            None => defaults.database_max_connections,
        };

        let stock_policy = match get("STOCK_POLICY") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| invalid("STOCK_POLICY", &raw, e))?,
            None => defaults.stock_policy,
        };

        let report_clock = match get("REPORT_UTC_OFFSET") {
            Some(raw) => raw
                .parse()
                .map_err(|e: reporting::ReportError| invalid("REPORT_UTC_OFFSET", &raw, e))?,
            None => defaults.report_clock,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            database_url: get("DATABASE_URL").or_else(|| get("DB_CONN")),
            database_max_connections,
            stock_policy,
            report_clock,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(name: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            database_max_connections: 5,
            stock_policy: StockPolicy::Reject,
            report_clock: ReportClock::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::FixedOffset;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.stock_policy, StockPolicy::Reject);
        assert_eq!(config.report_clock, ReportClock::Local);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("LOG_FORMAT", "JSON"),
            ("DB_CONN", "postgres://pos@localhost/pos"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("STOCK_POLICY", "allow-negative"),
            ("REPORT_UTC_OFFSET", "+07:00"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://pos@localhost/pos")
        );
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.stock_policy, StockPolicy::AllowNegative);
        assert_eq!(
            config.report_clock,
            ReportClock::Fixed(FixedOffset::east_opt(7 * 3600).unwrap())
        );
    }

    #[test]
    fn test_database_url_wins_over_alias() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://primary"),
            ("DB_CONN", "postgres://alias"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://primary"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", ""), ("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (name, value) in [
            ("PORT", "eighty"),
            ("LOG_FORMAT", "xml"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("STOCK_POLICY", "maybe"),
            ("REPORT_UTC_OFFSET", "Asia/Jakarta"),
        ] {
            let err = config_from(&[(name, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { name: n, .. } if *n == name),
                "{name}={value} gave {err}"
            );
        }
    }
}
