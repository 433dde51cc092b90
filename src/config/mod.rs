//! Configuration for embedding hosts.
//!
//! TOML-backed, with validated defaults: the per-operation store deadline,
//! the object-store data directory, and the base log level. Hosts load this
//! once at startup and feed the pieces to [`crate::world::ObjectAccess`] and
//! the store they open.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Deadline, in milliseconds, shared by all store calls within one
    /// access-service operation.
    pub op_deadline_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the sled object store.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level: error, warn, info, debug or trace.
    pub level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            op_deadline_ms: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/world".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("cannot read config file {}: {}", path, e))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write a default configuration file for `init`-style tooling.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.runtime.op_deadline_ms == 0 {
            return Err(anyhow!("runtime.op_deadline_ms must be greater than zero"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(anyhow!("unknown logging.level: {}", other)),
        }
    }

    /// The operation deadline as a [`Duration`].
    pub fn op_deadline(&self) -> Duration {
        Duration::from_millis(self.runtime.op_deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().expect("default config valid");
        assert_eq!(config.op_deadline(), Duration::from_millis(5000));
    }

    #[test]
    fn rejects_zero_deadline() {
        let mut config = Config::default();
        config.runtime.op_deadline_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let path = path.to_str().expect("utf8 path").to_string();

        tokio_test::block_on(async {
            Config::create_default(&path).await.expect("write default");
            let config = Config::load(&path).await.expect("load");
            assert_eq!(config.runtime.op_deadline_ms, 5000);
            assert_eq!(config.logging.level, "info");
        });
    }

    #[test]
    fn parses_partial_files() {
        let config: Config = toml::from_str("[runtime]\nop_deadline_ms = 250\n").expect("parse");
        assert_eq!(config.runtime.op_deadline_ms, 250);
        assert_eq!(config.storage.data_dir, "data/world");
    }
}
