// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-concurrency dispatch of resource attempts
//!
//! Every dispatched resource goes through fetch, the processors in order,
//! the state transition and a write-through `put`, in that order. At most
//! `parallelism` resources are in flight. Each attempt runs on its own task so
//! a panicking collaborator is caught at the resource boundary, and an
//! attempt still running when the run is cancelled is aborted and recorded
//! as a failure.

use rw_adapters::{DurationBreach, FetchOutcome, Notifier, PayloadFetcher, Processor};
use rw_core::{
    BanEntered, Clock, ProcessReason, ResourceId, ResourceMetadata, ResourceOutcome, RetryPolicy,
    RunId, Tenant, TrackedState,
};
use rw_storage::TrackedStateStore;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Error recorded for an attempt aborted by run cancellation
pub(crate) const CANCELLED: &str = "cancelled";

/// One resource selected for processing, with the state read at decision time
#[derive(Debug, Clone)]
pub(crate) struct WorkItem {
    pub meta: ResourceMetadata,
    pub state: Option<TrackedState>,
    pub reason: ProcessReason,
}

/// What happened to one dispatched resource
#[derive(Debug)]
pub(crate) struct AttemptResult {
    pub resource_id: ResourceId,
    pub outcome: ResourceOutcome,
    pub ban: Option<BanEntered>,
    pub persisted: bool,
}

/// Shared by every attempt of one run
pub(crate) struct AttemptContext<F: PayloadFetcher, C> {
    pub tenant: Tenant,
    pub run_id: RunId,
    pub fetcher: Arc<F>,
    pub processors: Arc<[Arc<dyn Processor<F::Resource>>]>,
    pub store: Arc<dyn TrackedStateStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: C,
    pub policy: RetryPolicy,
    pub resource_limit: Option<Duration>,
    /// Withhold tracked state from the fetcher so checksum shortcuts cannot
    /// skip the processors
    pub ignore_state: bool,
}

pub(crate) struct Dispatcher<F: PayloadFetcher, C> {
    context: Arc<AttemptContext<F, C>>,
    parallelism: usize,
}

impl<F, C> Dispatcher<F, C>
where
    F: PayloadFetcher,
    C: Clock,
{
    pub fn new(context: AttemptContext<F, C>, parallelism: u32) -> Self {
        Self {
            context: Arc::new(context),
            parallelism: usize::try_from(parallelism).unwrap_or(usize::MAX).max(1),
        }
    }

    /// Run every item; returns once all started attempts have settled
    ///
    /// Items still waiting for a slot when `cancel` fires are not started.
    pub async fn dispatch(
        &self,
        items: Vec<WorkItem>,
        cancel: &CancellationToken,
    ) -> Vec<AttemptResult> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut attempts = JoinSet::new();
        let total = items.len();

        for item in items {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let context = Arc::clone(&self.context);
            let cancel = cancel.clone();
            attempts.spawn(
                async move {
                    let _permit = permit;
                    context.attempt(item, cancel).await
                }
                .in_current_span(),
            );
        }

        let started = attempts.len();
        if started < total {
            tracing::info!(not_started = total - started, "run cancelled before dispatch finished");
        }

        let mut results = Vec::with_capacity(started);
        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(error = %e, "resource worker did not complete"),
            }
        }
        results
    }
}

impl<F, C> AttemptContext<F, C>
where
    F: PayloadFetcher,
    C: Clock,
{
    async fn attempt(self: Arc<Self>, item: WorkItem, cancel: CancellationToken) -> AttemptResult {
        let span = tracing::info_span!("watcher.resource", resource_id = %item.meta.id);
        async move {
            tracing::debug!(reason = %item.reason, "processing");
            let started = self.clock.now();

            let handle = tokio::spawn({
                let context = Arc::clone(&self);
                let meta = item.meta.clone();
                let last = if self.ignore_state {
                    None
                } else {
                    item.state.clone()
                };
                let cancel = cancel.clone();
                async move { context.fetch_and_process(&meta, last.as_ref(), &cancel).await }
                    .in_current_span()
            });
            let abort = handle.abort_handle();

            let outcome = tokio::select! {
                biased;
                joined = handle => match joined {
                    Ok(outcome) => outcome,
                    Err(e) if e.is_panic() => {
                        ResourceOutcome::failed(format!("panicked: {}", panic_message(e.into_panic())))
                    }
                    Err(e) => ResourceOutcome::failed(e),
                },
                _ = cancel.cancelled() => {
                    abort.abort();
                    ResourceOutcome::failed(CANCELLED)
                }
            };

            let elapsed = self.clock.now().saturating_duration_since(started);
            self.check_resource_duration(&item.meta.id, elapsed).await;
            self.record(item, outcome, elapsed).await
        }
        .instrument(span)
        .await
    }

    async fn fetch_and_process(
        &self,
        meta: &ResourceMetadata,
        last: Option<&TrackedState>,
        cancel: &CancellationToken,
    ) -> ResourceOutcome {
        let (resource, checksum) = match self.fetcher.fetch(meta, last, cancel).await {
            Ok(FetchOutcome::Fetched { resource, checksum }) => (resource, checksum),
            Ok(FetchOutcome::Unchanged) => return ResourceOutcome::Unchanged,
            Err(e) => return ResourceOutcome::failed(format!("fetch failed: {}", e)),
        };

        for processor in self.processors.iter() {
            if let Err(e) = processor.process(meta, &resource, cancel).await {
                return ResourceOutcome::failed(format!(
                    "processor '{}' failed: {}",
                    processor.name(),
                    e
                ));
            }
        }
        ResourceOutcome::Succeeded { checksum }
    }

    async fn check_resource_duration(&self, resource_id: &ResourceId, elapsed: Duration) {
        let Some(limit) = self.resource_limit else {
            return;
        };
        if elapsed <= limit {
            return;
        }
        let breach = DurationBreach::Resource {
            tenant: self.tenant.clone(),
            resource_id: resource_id.clone(),
            elapsed,
            limit,
        };
        if let Err(e) = self.notifier.notify(&breach).await {
            tracing::warn!(error = %e, "duration notification failed");
        }
    }

    /// Apply the outcome to the tracked state and write it through
    async fn record(
        &self,
        item: WorkItem,
        outcome: ResourceOutcome,
        elapsed: Duration,
    ) -> AttemptResult {
        let elapsed_ms = elapsed.as_millis() as u64;
        match &outcome {
            ResourceOutcome::Succeeded { .. } => tracing::info!(elapsed_ms, "processed"),
            ResourceOutcome::Unchanged => {
                tracing::info!(elapsed_ms, "content unchanged, stamp updated")
            }
            ResourceOutcome::Failed { error } => {
                tracing::warn!(elapsed_ms, error = %error, "attempt failed")
            }
        }

        let previous = item.state.unwrap_or_default();
        let (next, ban) = previous.transition(
            &outcome,
            &item.meta.stamp,
            &self.policy,
            self.clock.utc_now(),
        );
        if let Some(ban) = &ban {
            tracing::warn!(retry_count = ban.retry_count, until = %ban.until, "resource banned");
        }

        let persisted = match self.store.put(&self.tenant, &item.meta.id, &next).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(run_id = %self.run_id, error = %e, "failed to persist tracked state");
                false
            }
        };

        AttemptResult {
            resource_id: item.meta.id,
            outcome,
            ban,
            persisted,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(_) => "unknown panic".to_string(),
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
