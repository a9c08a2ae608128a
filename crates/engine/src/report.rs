// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run counters

use rw_core::{ResourceOutcome, RunId, SkipReason};
use std::fmt;
use std::time::Duration;

/// Summary of one completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    /// Entries returned by the lister
    pub listed: usize,
    /// Entries rejected by metadata predicates
    pub filtered_out: usize,
    /// Repeated resource ids dropped after the first
    pub duplicates: usize,
    pub skipped_too_old: usize,
    pub skipped_banned: usize,
    pub skipped_unchanged: usize,
    /// Resources dispatched for fetch + process
    pub processed: usize,
    pub succeeded: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// Failures that entered or renewed a ban
    pub newly_banned: usize,
    /// Outcomes that could not be written to the state store
    pub persist_failures: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            listed: 0,
            filtered_out: 0,
            duplicates: 0,
            skipped_too_old: 0,
            skipped_banned: 0,
            skipped_unchanged: 0,
            processed: 0,
            succeeded: 0,
            unchanged: 0,
            failed: 0,
            newly_banned: 0,
            persist_failures: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_too_old + self.skipped_banned + self.skipped_unchanged
    }

    pub(crate) fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::TooOld { .. } => self.skipped_too_old += 1,
            SkipReason::Banned { .. } => self.skipped_banned += 1,
            SkipReason::Unchanged => self.skipped_unchanged += 1,
        }
    }

    pub(crate) fn record_outcome(&mut self, outcome: &ResourceOutcome) {
        match outcome {
            ResourceOutcome::Succeeded { .. } => self.succeeded += 1,
            ResourceOutcome::Unchanged => self.unchanged += 1,
            ResourceOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: listed {}, processed {} (ok {}, unchanged {}, failed {}), skipped {}, banned {}, {}ms",
            self.run_id,
            self.listed,
            self.processed,
            self.succeeded,
            self.unchanged,
            self.failed,
            self.skipped(),
            self.newly_banned,
            self.elapsed.as_millis()
        )
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
