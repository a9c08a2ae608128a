// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command notifier
//!
//! Runs `sh -c <command>` once per breach with the breach described in
//! `RW_*` environment variables:
//!
//! | Variable          | Value                            |
//! |-------------------|----------------------------------|
//! | `RW_KIND`         | `run` or `resource`              |
//! | `RW_TENANT`       | watcher name                     |
//! | `RW_RUN_ID`       | run id (run breaches only)       |
//! | `RW_RESOURCE_ID`  | resource id (resource breaches)  |
//! | `RW_ELAPSED_MS`   | observed duration                |
//! | `RW_LIMIT_MS`     | configured limit                 |

use super::{DurationBreach, Notifier, NotifyError};
use async_trait::async_trait;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

pub(crate) fn breach_env(breach: &DurationBreach) -> Vec<(&'static str, String)> {
    let mut env = vec![
        ("RW_KIND", breach.kind().to_string()),
        ("RW_TENANT", breach.tenant().to_string()),
        ("RW_ELAPSED_MS", breach.elapsed().as_millis().to_string()),
        ("RW_LIMIT_MS", breach.limit().as_millis().to_string()),
    ];
    match breach {
        DurationBreach::Run { run_id, .. } => env.push(("RW_RUN_ID", run_id.to_string())),
        DurationBreach::Resource { resource_id, .. } => {
            env.push(("RW_RESOURCE_ID", resource_id.to_string()))
        }
    }
    env
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, breach: &DurationBreach) -> Result<(), NotifyError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .envs(breach_env(breach))
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::Failed(format!(
                "command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
