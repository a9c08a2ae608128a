// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher engine configuration
//!
//! Loaded from the `[watcher]` table of a TOML file. Durations are written in
//! humantime form (`"30s"`, `"2h"`).

use crate::id::Tenant;
use crate::tracked::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn default_parallelism() -> u32 {
    1
}

fn default_sleep() -> Duration {
    Duration::from_secs(60)
}

fn default_max_retries() -> u32 {
    3
}

fn default_ban_duration() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

/// Options recognized by the watcher engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherConfig {
    /// Tenant key used to namespace tracked state
    pub worker_name: String,
    /// Max resources in flight at once within a run
    #[serde(default = "default_parallelism")]
    pub degree_of_parallelism: u32,
    /// Process every matching resource regardless of tracked state
    #[serde(default)]
    pub ignore_state: bool,
    /// Idle time between scheduled runs
    #[serde(default = "default_sleep", with = "humantime_serde")]
    pub sleep: Duration,
    /// Failures tolerated before a resource is banned
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub skip_resources_older_than_days: Option<u32>,
    #[serde(default = "default_ban_duration", with = "humantime_serde")]
    pub ban_duration: Duration,
    #[serde(default, with = "humantime_serde")]
    pub run_duration_notification_limit: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub resource_duration_notification_limit: Option<Duration>,
}

impl WatcherConfig {
    pub fn new(worker_name: impl Into<String>) -> Self {
        Self {
            worker_name: worker_name.into(),
            degree_of_parallelism: default_parallelism(),
            ignore_state: false,
            sleep: default_sleep(),
            max_retries: default_max_retries(),
            skip_resources_older_than_days: None,
            ban_duration: default_ban_duration(),
            run_duration_notification_limit: None,
            resource_duration_notification_limit: None,
        }
    }

    pub fn with_parallelism(mut self, degree: u32) -> Self {
        self.degree_of_parallelism = degree;
        self
    }

    pub fn with_ignore_state(mut self, ignore: bool) -> Self {
        self.ignore_state = ignore;
        self
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_ban_duration(mut self, ban_duration: Duration) -> Self {
        self.ban_duration = ban_duration;
        self
    }

    pub fn with_skip_older_than_days(mut self, days: u32) -> Self {
        self.skip_resources_older_than_days = Some(days);
        self
    }

    pub fn with_run_duration_limit(mut self, limit: Duration) -> Self {
        self.run_duration_notification_limit = Some(limit);
        self
    }

    pub fn with_resource_duration_limit(mut self, limit: Duration) -> Self {
        self.resource_duration_notification_limit = Some(limit);
        self
    }

    /// Parse and validate a `WatcherConfig` from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "worker_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.degree_of_parallelism == 0 {
            return Err(ConfigError::Invalid {
                field: "degree_of_parallelism",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.ban_duration.is_zero() {
            return Err(ConfigError::Invalid {
                field: "ban_duration",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn tenant(&self) -> Tenant {
        Tenant::new(self.worker_name.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ban_duration: self.ban_duration,
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
