// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource skip/process classification
//!
//! Checks run in a fixed order: age cutoff (unconditional), ban, unchanged.
//! `ignore_state` suppresses the ban and unchanged skips but never the age
//! cutoff.

use crate::config::WatcherConfig;
use crate::resource::ResourceMetadata;
use crate::tracked::TrackedState;
use chrono::{DateTime, Utc};
use std::fmt;

/// Why a resource is left alone this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooOld {
        latest: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    },
    Banned {
        until: DateTime<Utc>,
    },
    Unchanged,
}

/// Why a resource is attempted this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessReason {
    FirstSighting,
    Modified,
    RetryPending { retry_count: u32 },
    BanExpired,
    /// Would have been skipped, but `ignore_state` is set
    Forced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Process(ProcessReason),
}

impl Decision {
    pub fn should_process(&self) -> bool {
        matches!(self, Decision::Process(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooOld { latest, cutoff } => {
                write!(f, "too old ({} < {})", latest, cutoff)
            }
            SkipReason::Banned { until } => write!(f, "banned until {}", until),
            SkipReason::Unchanged => write!(f, "unchanged"),
        }
    }
}

impl fmt::Display for ProcessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessReason::FirstSighting => write!(f, "new"),
            ProcessReason::Modified => write!(f, "modified"),
            ProcessReason::RetryPending { retry_count } => write!(f, "retry #{}", retry_count),
            ProcessReason::BanExpired => write!(f, "ban expired"),
            ProcessReason::Forced => write!(f, "forced"),
        }
    }
}

/// Classifies resources against their tracked state
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    ignore_state: bool,
    skip_older_than: Option<chrono::Duration>,
}

impl DecisionEngine {
    pub fn new(config: &WatcherConfig) -> Self {
        Self {
            ignore_state: config.ignore_state,
            skip_older_than: config
                .skip_resources_older_than_days
                .map(|days| chrono::Duration::days(i64::from(days))),
        }
    }

    /// Age cutoff check, run before tracked state is looked up
    pub fn too_old(&self, meta: &ResourceMetadata, now: DateTime<Utc>) -> Option<SkipReason> {
        let window = self.skip_older_than?;
        let latest = meta.latest_modified()?;
        let cutoff = now.checked_sub_signed(window)?;
        (latest < cutoff).then_some(SkipReason::TooOld { latest, cutoff })
    }

    pub fn decide(
        &self,
        meta: &ResourceMetadata,
        state: Option<&TrackedState>,
        now: DateTime<Utc>,
    ) -> Decision {
        if let Some(reason) = self.too_old(meta, now) {
            return Decision::Skip(reason);
        }

        let Some(state) = state else {
            return Decision::Process(ProcessReason::FirstSighting);
        };

        let banned = state.banned_until.filter(|until| now < *until);
        let unchanged =
            state.retry_count == 0 && state.last_modified.as_ref() == Some(&meta.stamp);

        if let Some(until) = banned {
            if !self.ignore_state {
                return Decision::Skip(SkipReason::Banned { until });
            }
            return Decision::Process(ProcessReason::Forced);
        }
        if unchanged {
            if !self.ignore_state {
                return Decision::Skip(SkipReason::Unchanged);
            }
            return Decision::Process(ProcessReason::Forced);
        }

        let reason = if state.banned_until.is_some() {
            ProcessReason::BanExpired
        } else if state.retry_count > 0 {
            ProcessReason::RetryPending {
                retry_count: state.retry_count,
            }
        } else if state.last_modified.is_none() {
            ProcessReason::FirstSighting
        } else {
            ProcessReason::Modified
        };
        Decision::Process(reason)
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
