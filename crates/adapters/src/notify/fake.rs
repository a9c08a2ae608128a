// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notifier for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DurationBreach, Notifier, NotifyError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Fake notifier that records every breach
#[derive(Clone, Default)]
pub struct FakeNotifier {
    breaches: Arc<Mutex<Vec<DurationBreach>>>,
    failing: Arc<AtomicBool>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record breaches but report a failure for each one
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all recorded breaches
    pub fn breaches(&self) -> Vec<DurationBreach> {
        self.breaches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, breach: &DurationBreach) -> Result<(), NotifyError> {
        self.breaches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(breach.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Failed("fake notifier failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
