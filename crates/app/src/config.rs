//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unknown LOG_FORMAT '{other}'"))),
        }
    }
}

/// Evaluation configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `PROMOTIONS_PATH`: promotion catalogue (default: `"promotions.json"`)
/// - `CART_PATH`: cart to evaluate (default: `"cart.json"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `EXPIRING_SOON_DAYS`: horizon of the expiring-soon listing (default: `7`)
#[derive(Debug, Clone)]
pub struct Config {
    pub promotions_path: PathBuf,
    pub cart_path: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    pub expiring_soon_days: i64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// Fails if `LOG_FORMAT` or `EXPIRING_SOON_DAYS` is set to something unreadable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let expiring_soon_days = match lookup("EXPIRING_SOON_DAYS") {
            Some(value) => value.trim().parse().map_err(|_| {
                AppError::Config(format!("EXPIRING_SOON_DAYS must be a whole number, got '{value}'"))
            })?,
            None => defaults.expiring_soon_days,
        };

        if expiring_soon_days < 0 {
            return Err(AppError::Config(
                "EXPIRING_SOON_DAYS must not be negative".to_string(),
            ));
        }

        Ok(Self {
            promotions_path: lookup("PROMOTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.promotions_path),
            cart_path: lookup("CART_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cart_path),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            expiring_soon_days,
        })
    }

    /// Returns the expiring-soon horizon as a duration.
    pub fn expiring_soon_within(&self) -> chrono::Duration {
        chrono::Duration::days(self.expiring_soon_days)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            promotions_path: PathBuf::from("promotions.json"),
            cart_path: PathBuf::from("cart.json"),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            expiring_soon_days: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.promotions_path, PathBuf::from("promotions.json"));
        assert_eq!(config.cart_path, PathBuf::from("cart.json"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.expiring_soon_days, 7);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cart_path, PathBuf::from("cart.json"));
        assert_eq!(config.expiring_soon_within(), chrono::Duration::days(7));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PROMOTIONS_PATH", "/tmp/catalog.json"),
            ("CART_PATH", "/tmp/cart.json"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
            ("EXPIRING_SOON_DAYS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.promotions_path, PathBuf::from("/tmp/catalog.json"));
        assert_eq!(config.cart_path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.expiring_soon_days, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("EXPIRING_SOON_DAYS", "soon")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("EXPIRING_SOON_DAYS", "-1")])),
            Err(AppError::Config(_))
        ));
    }
}
