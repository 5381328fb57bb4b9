//! Configuration structures for the daily offering system.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time_slot::parse_timezone;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trading calendar configuration.
    pub trading: TradingConfig,
    /// Storage configuration.
    pub store: StoreConfig,
}

impl Config {
    /// Parse a JSON document; missing sections fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.trading_timezone()?;
        if config
            .store
            .database_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(Error::config("store.database_path must not be empty"));
        }
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Resolve the configured trading timezone.
    pub fn trading_timezone(&self) -> Result<Tz> {
        parse_timezone(&self.trading.timezone)
    }
}

/// Trading calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// IANA zone governing civil-day boundaries.
    pub timezone: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            timezone: "CET".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.trading.timezone, "CET");
        assert_eq!(config.trading_timezone().unwrap(), Tz::CET);
        assert!(config.store.database_path.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"store": {"database_path": "offering.db"}}"#).unwrap();
        assert_eq!(config.trading.timezone, "CET");
        assert_eq!(
            config.store.database_path.as_deref(),
            Some(Path::new("offering.db"))
        );
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let result = Config::from_json_str(r#"{"trading": {"timezone": "Mars/Olympus"}}"#);
        assert!(matches!(result, Err(Error::UnknownTimezone(_))));
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let result = Config::from_json_str(r#"{"store": {"database_path": ""}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
