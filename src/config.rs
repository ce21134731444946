//! Store configuration

use std::time::Duration;

use serde::Deserialize;

/// Connection settings for [`crate::Database`].
///
/// Loaded from built-in defaults overlaid by `LEDGER_*` environment variables,
/// e.g. `LEDGER_DATABASE_PATH`, `LEDGER_MAX_CONNECTIONS`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database_path: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "./data/ledger.sqlite".to_string(),
            max_connections: 8,
            connect_timeout_ms: 5_000,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("database_path", defaults.database_path)?
            .set_default("max_connections", defaults.max_connections)?
            .set_default("connect_timeout_ms", defaults.connect_timeout_ms)?
            .set_default("busy_timeout_ms", defaults.busy_timeout_ms)?
            .add_source(config::Environment::with_prefix("LEDGER").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
