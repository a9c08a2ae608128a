// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file
//!
//! ```toml
//! [watcher]
//! worker_name = "reports"
//! degree_of_parallelism = 4
//! sleep = "5m"
//!
//! [source]
//! directory = "incoming"
//! extensions = ["csv"]
//! recursive = true
//!
//! [output]
//! directory = "archive"
//!
//! [state]            # optional, defaults to the per-user state dir
//! directory = "state"
//!
//! [notify]           # optional, breaches are logged otherwise
//! command = "logger -t rwd \"$RW_KIND $RW_ELAPSED_MS\""
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use rw_adapters::DirectoryFilter;
use rw_core::{ConfigError, WatcherConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub directory: PathBuf,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub recursive: bool,
}

impl SourceConfig {
    pub fn filter(&self) -> DirectoryFilter {
        DirectoryFilter {
            extensions: self.extensions.clone(),
            name_prefix: self.name_prefix.clone(),
            recursive: self.recursive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    pub watcher: WatcherConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}

impl DaemonConfig {
    /// Parse and validate; relative paths are resolved against `base`
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.watcher.validate()?;
        if config.notify.as_ref().is_some_and(|n| n.command.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "notify.command",
                reason: "must not be empty".to_string(),
            });
        }
        config.source.directory = resolve(base, &config.source.directory);
        config.output.directory = resolve(base, &config.output.directory);
        config.state.directory = config.state.directory.map(|dir| resolve(base, &dir));
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
