//! Trainer configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TrainerError, TrainerResult};

/// Runtime configuration for the trainer.
///
/// Loadable from a TOML or JSON file, overridable through `ENCORE_*`
/// environment variables; every field has a usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Where the state snapshot lives.
    pub snapshot_path: PathBuf,
    /// Answers at or under this many seconds rate as easy.
    pub fast_answer_secs: u32,
    /// Answers at or under this many seconds rate as good; slower is hard.
    pub medium_answer_secs: u32,
    /// Run parameter optimization every this many recorded answers.
    pub optimize_batch: usize,
    /// Whether planned-only anime count as owned.
    pub include_planned: bool,
    /// Target recall probability the scheduler aims for.
    pub desired_retention: f32,
    /// How long to wait for an upstream reply before giving up.
    pub request_timeout_secs: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            fast_answer_secs: 10,
            medium_answer_secs: 15,
            optimize_batch: 50,
            include_planned: false,
            desired_retention: 0.9,
            request_timeout_secs: 5,
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".encore")
        .join("trainer.json")
}

impl TrainerConfig {
    /// Load configuration from a TOML or JSON file, by extension.
    pub fn from_file(path: impl AsRef<Path>) -> TrainerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents)
                .map_err(|e| TrainerError::Configuration(e.to_string()))?,
            Some("json") => serde_json::from_str(&contents)?,
            other => {
                return Err(TrainerError::Configuration(format!(
                    "unsupported config extension: {:?}",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from defaults plus `ENCORE_*` environment
    /// variable overrides.
    pub fn from_env() -> TrainerResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ENCORE_SNAPSHOT_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(v) = parse_env("ENCORE_FAST_ANSWER_SECS")? {
            config.fast_answer_secs = v;
        }
        if let Some(v) = parse_env("ENCORE_MEDIUM_ANSWER_SECS")? {
            config.medium_answer_secs = v;
        }
        if let Some(v) = parse_env("ENCORE_OPTIMIZE_BATCH")? {
            config.optimize_batch = v;
        }
        if let Some(v) = parse_env("ENCORE_DESIRED_RETENTION")? {
            config.desired_retention = v;
        }
        if let Some(v) = parse_env("ENCORE_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("ENCORE_INCLUDE_PLANNED") {
            config.include_planned = matches!(v.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject value combinations the trainer cannot run with.
    pub fn validate(&self) -> TrainerResult<()> {
        if self.fast_answer_secs > self.medium_answer_secs {
            return Err(TrainerError::Configuration(format!(
                "fast_answer_secs ({}) must not exceed medium_answer_secs ({})",
                self.fast_answer_secs, self.medium_answer_secs
            )));
        }
        if self.optimize_batch == 0 {
            return Err(TrainerError::Configuration(
                "optimize_batch must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.desired_retention) {
            return Err(TrainerError::Configuration(format!(
                "desired_retention must be within [0, 1], got {}",
                self.desired_retention
            )));
        }
        Ok(())
    }

    /// The correlation timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> TrainerResult<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| TrainerError::Configuration(format!("invalid value for {}: {}", key, value))),
        Err(_) => Ok(None),
    }
}
