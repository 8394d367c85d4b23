use std::env;
use std::time::Duration;

use crate::error::{Result, ShardlineError};

/// Interactions must be answered within this window.
pub const DEFAULT_INTERACTION_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Total shard count of the gateway connection.
    pub total_shards: u32,

    /// How long an interaction id stays in the unreplied set.
    pub interaction_window: Duration,

    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_shards: 1,
            interaction_window: DEFAULT_INTERACTION_WINDOW,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            total_shards: parse_env("SHARDLINE_TOTAL_SHARDS")?.unwrap_or(defaults.total_shards),
            interaction_window: parse_env("SHARDLINE_INTERACTION_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.interaction_window),
            log_json: parse_env("SHARDLINE_LOG_JSON")?.unwrap_or(defaults.log_json),
        };

        if config.total_shards == 0 {
            return Err(ShardlineError::Config(
                "SHARDLINE_TOTAL_SHARDS must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total_shards = self.total_shards,
            interaction_window_secs = self.interaction_window.as_secs(),
            log_json = self.log_json,
            "Config loaded"
        );
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ShardlineError::Config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
