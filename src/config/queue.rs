//! Queue configuration structure and loaders.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of environment variables read by [`QueueConfig::from_env`].
pub const ENV_PREFIX: &str = "MUSH_QUEUE_";

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// An environment variable held a value of the wrong type.
    #[error("invalid value for {key}: {value}")]
    Env {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
    },
    /// A field failed validation.
    #[error("{0}")]
    Invalid(String),
}

/// Command queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Deposit charged per queued command, refunded when it runs or is cancelled.
    pub wait_cost: u32,
    /// One queued command in `machine_cost` pays one extra coin. Zero disables it.
    pub machine_cost: u32,
    /// Outstanding-entry quota for ordinary principals.
    pub queue_max: u32,
    /// Size of the identifier space; ids run `1..=max_ids`.
    pub max_ids: u32,
    /// Largest payload (command, arguments and registers) accepted, in bytes.
    pub max_payload_bytes: usize,
    /// Commands run per service pass when there was no network activity.
    pub queue_chunk: usize,
    /// Commands run per service pass when there was network activity.
    pub active_queue_chunk: usize,
    /// Longest idle sleep between service passes, in seconds.
    pub service_ceiling_secs: i64,
    /// Whether the service operations promote and run entries at all.
    pub dequeue_enabled: bool,
    /// Interval of the runtime driver's tick, in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            wait_cost: 10,
            machine_cost: 64,
            queue_max: 100,
            max_ids: 10_000,
            max_payload_bytes: i32::MAX as usize,
            queue_chunk: 10,
            active_queue_chunk: 10,
            service_ceiling_secs: 1000,
            dequeue_enabled: true,
            tick_interval_ms: 1000,
        }
    }
}

impl QueueConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ids == 0 {
            return Err(ConfigError::Invalid("max_ids must be greater than 0".into()));
        }
        if self.queue_max == 0 {
            return Err(ConfigError::Invalid("queue_max must be greater than 0".into()));
        }
        if self.queue_chunk == 0 || self.active_queue_chunk == 0 {
            return Err(ConfigError::Invalid("queue chunks must be greater than 0".into()));
        }
        if self.service_ceiling_secs <= 0 {
            return Err(ConfigError::Invalid(
                "service_ceiling_secs must be greater than 0".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be greater than 0".into()));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from defaults overridden by `MUSH_QUEUE_*` environment
    /// variables, loading a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error for unparsable variables or invalid values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from defaults overridden by values returned from `lookup`,
    /// keyed by the full variable name (`MUSH_QUEUE_WAIT_COST`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error for unparsable values or invalid configuration.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        override_from(&lookup, "WAIT_COST", &mut cfg.wait_cost)?;
        override_from(&lookup, "MACHINE_COST", &mut cfg.machine_cost)?;
        override_from(&lookup, "QUEUE_MAX", &mut cfg.queue_max)?;
        override_from(&lookup, "MAX_IDS", &mut cfg.max_ids)?;
        override_from(&lookup, "MAX_PAYLOAD_BYTES", &mut cfg.max_payload_bytes)?;
        override_from(&lookup, "QUEUE_CHUNK", &mut cfg.queue_chunk)?;
        override_from(&lookup, "ACTIVE_QUEUE_CHUNK", &mut cfg.active_queue_chunk)?;
        override_from(&lookup, "SERVICE_CEILING_SECS", &mut cfg.service_ceiling_secs)?;
        override_from(&lookup, "DEQUEUE_ENABLED", &mut cfg.dequeue_enabled)?;
        override_from(&lookup, "TICK_INTERVAL_MS", &mut cfg.tick_interval_ms)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn override_from<F, T>(lookup: &F, name: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let key = format!("{ENV_PREFIX}{name}");
    if let Some(value) = lookup(&key) {
        *slot = value.trim().parse().map_err(|_| ConfigError::Env {
            key: key.clone(),
            value,
        })?;
    }
    Ok(())
}
