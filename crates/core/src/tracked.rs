// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable per-resource tracking state and its transitions
//!
//! A `TrackedState` is created on first sighting, read before every decision
//! and rewritten after every attempt. The transition is pure: the engine
//! persists whatever it returns.

use crate::resource::ChangeStamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Failure threshold and ban length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub ban_duration: Duration,
}

impl RetryPolicy {
    /// Expiry of a ban entered at `now`
    pub fn ban_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ban_duration)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Bookkeeping for one `(tenant, resource id)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedState {
    /// Change stamp of the last successful or no-change attempt
    #[serde(default)]
    pub last_modified: Option<ChangeStamp>,
    /// Checksum of the last successfully processed payload
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub banned_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retrieved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of one fetch + process attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOutcome {
    /// All processors completed
    Succeeded { checksum: Option<String> },
    /// Fetcher reported identical content despite a new stamp
    Unchanged,
    /// Fetch or a processor failed (includes cancellation and panics)
    Failed { error: String },
}

impl ResourceOutcome {
    pub fn failed(error: impl fmt::Display) -> Self {
        ResourceOutcome::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResourceOutcome::Failed { .. })
    }
}

impl fmt::Display for ResourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceOutcome::Succeeded { .. } => write!(f, "succeeded"),
            ResourceOutcome::Unchanged => write!(f, "unchanged"),
            ResourceOutcome::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// A ban entered (or renewed) by a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanEntered {
    pub until: DateTime<Utc>,
    pub retry_count: u32,
}

impl TrackedState {
    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        self.banned_until.is_some_and(|until| now < until)
    }

    /// Compute the state that follows an attempt
    ///
    /// `stamp` is the change stamp observed at decision time. A failure never
    /// moves `last_modified`, so once a ban lifts the resource is retried even
    /// if its stamp did not change in the meantime.
    pub fn transition(
        &self,
        outcome: &ResourceOutcome,
        stamp: &ChangeStamp,
        policy: &RetryPolicy,
        now: DateTime<Utc>,
    ) -> (Self, Option<BanEntered>) {
        match outcome {
            ResourceOutcome::Succeeded { checksum } => {
                let next = TrackedState {
                    last_modified: Some(stamp.clone()),
                    checksum: checksum.clone(),
                    retry_count: 0,
                    banned_until: None,
                    retrieved_at: Some(now),
                    last_error: None,
                    updated_at: Some(now),
                };
                (next, None)
            }

            ResourceOutcome::Unchanged => {
                let next = TrackedState {
                    last_modified: Some(stamp.clone()),
                    retrieved_at: Some(now),
                    updated_at: Some(now),
                    ..self.clone()
                };
                (next, None)
            }

            ResourceOutcome::Failed { error } => {
                let retry_count = self.retry_count.saturating_add(1);
                let ban = (retry_count > policy.max_retries).then(|| BanEntered {
                    until: policy.ban_until(now),
                    retry_count,
                });
                let next = TrackedState {
                    retry_count,
                    banned_until: ban.map(|b| b.until).or(self.banned_until),
                    last_error: Some(error.clone()),
                    updated_at: Some(now),
                    ..self.clone()
                };
                (next, ban)
            }
        }
    }
}

#[cfg(test)]
#[path = "tracked_tests.rs"]
mod tests;
