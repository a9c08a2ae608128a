// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling loop around a [`Watcher`]
//!
//! Runs are strictly sequential: one run, then `sleep`, then the next run.
//! Cancellation is checked at the top of each iteration and during the sleep.

use crate::error::EngineError;
use crate::report::RunReport;
use crate::watcher::Watcher;
use rw_adapters::{MetadataLister, PayloadFetcher};
use rw_core::{Clock, FilterOverride, RunIdGen};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Running,
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start/stop lifecycle for a watcher's polling loop
pub struct WatcherService<L, F, C, I>
where
    L: MetadataLister,
    F: PayloadFetcher,
{
    watcher: Arc<Watcher<L, F, C, I>>,
    running: Mutex<Option<RunningLoop>>,
}

impl<L, F, C, I> WatcherService<L, F, C, I>
where
    L: MetadataLister,
    F: PayloadFetcher,
    C: Clock,
    I: RunIdGen,
{
    pub fn new(watcher: Watcher<L, F, C, I>) -> Self {
        Self {
            watcher: Arc::new(watcher),
            running: Mutex::new(None),
        }
    }

    pub fn watcher(&self) -> &Watcher<L, F, C, I> {
        &self.watcher
    }

    pub fn state(&self) -> ServiceState {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        match running.as_ref() {
            Some(running) if !running.handle.is_finished() => ServiceState::Running,
            _ => ServiceState::Stopped,
        }
    }

    /// Launch the polling loop on a background task
    pub fn start(&self) -> Result<(), EngineError> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(EngineError::AlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(Arc::clone(&self.watcher), cancel.clone()));
        *running = Some(RunningLoop { cancel, handle });
        tracing::info!(tenant = %self.watcher.tenant(), "watcher started");
        Ok(())
    }

    /// Cancel the loop and wait for the current run to wind down
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(running) = running else {
            return;
        };
        running.cancel.cancel();
        if let Err(e) = running.handle.await {
            tracing::error!(error = %e, "watcher loop ended abnormally");
        }
        tracing::info!(tenant = %self.watcher.tenant(), "watcher stopped");
    }

    /// Perform a single run outside the loop
    ///
    /// Does not change the service state and may overlap a running loop only
    /// if the caller chooses to.
    pub async fn run_once(
        &self,
        overrides: Option<FilterOverride<'_, L::Filter>>,
        cancel: &CancellationToken,
    ) -> Result<RunReport, EngineError> {
        self.watcher.run_once(overrides, cancel).await
    }

    /// Run the polling loop on the current task until `cancel` fires
    pub async fn run_and_block(&self, cancel: &CancellationToken) {
        run_loop(Arc::clone(&self.watcher), cancel.clone()).await
    }
}

async fn run_loop<L, F, C, I>(watcher: Arc<Watcher<L, F, C, I>>, cancel: CancellationToken)
where
    L: MetadataLister,
    F: PayloadFetcher,
    C: Clock,
    I: RunIdGen,
{
    let sleep = watcher.config().sleep;
    loop {
        if cancel.is_cancelled() {
            break;
        }

        match watcher.run_once(None, &cancel).await {
            Ok(report) => tracing::info!(tenant = %watcher.tenant(), "{}", report),
            Err(EngineError::Cancelled) => break,
            // Already logged inside the run span; wait for the next cycle
            Err(_) => {}
        }

        tokio::select! {
            _ = tokio::time::sleep(sleep) => {}
            _ = cancel.cancelled() => break,
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
