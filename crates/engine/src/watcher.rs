// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One run of the watcher: filter, list, decide, dispatch

use crate::dispatcher::{AttemptContext, Dispatcher, WorkItem};
use crate::error::EngineError;
use crate::report::RunReport;
use rw_adapters::{
    DurationBreach, ListError, MetadataLister, NoOpNotifier, Notifier, PayloadFetcher, Processor,
};
use rw_core::{
    Clock, Decision, DecisionEngine, FilterChain, FilterOverride, ResourceMetadata, RunId,
    RunIdGen, SystemClock, Tenant, UuidRunIdGen, WatcherConfig,
};
use rw_storage::TrackedStateStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Polling ingestion engine for one tenant
///
/// Generic over the lister (and therefore the query filter shape), the
/// fetcher (and therefore the payload type), the clock and the run id
/// generator. The store, processors and notifier are shared trait objects.
pub struct Watcher<L, F, C = SystemClock, I = UuidRunIdGen>
where
    L: MetadataLister,
    F: PayloadFetcher,
{
    config: WatcherConfig,
    tenant: Tenant,
    decisions: DecisionEngine,
    filters: FilterChain<L::Filter>,
    lister: L,
    fetcher: Arc<F>,
    processors: Vec<Arc<dyn Processor<F::Resource>>>,
    store: Arc<dyn TrackedStateStore>,
    notifier: Arc<dyn Notifier>,
    clock: C,
    run_ids: I,
}

impl<L, F> Watcher<L, F>
where
    L: MetadataLister,
    F: PayloadFetcher,
{
    /// Create a watcher with the system clock, UUID run ids, no processors
    /// and no notifier
    pub fn new(
        config: WatcherConfig,
        lister: L,
        fetcher: F,
        store: Arc<dyn TrackedStateStore>,
    ) -> Self {
        Self {
            tenant: config.tenant(),
            decisions: DecisionEngine::new(&config),
            config,
            filters: FilterChain::new(),
            lister,
            fetcher: Arc::new(fetcher),
            processors: Vec::new(),
            store,
            notifier: Arc::new(NoOpNotifier),
            clock: SystemClock,
            run_ids: UuidRunIdGen,
        }
    }
}

impl<L, F, C, I> Watcher<L, F, C, I>
where
    L: MetadataLister,
    F: PayloadFetcher,
    C: Clock,
    I: RunIdGen,
{
    /// Append a processor; processors run in the order they were added
    pub fn with_processor(mut self, processor: impl Processor<F::Resource>) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    pub fn with_filters(mut self, filters: FilterChain<L::Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> Watcher<L, F, C2, I> {
        Watcher {
            config: self.config,
            tenant: self.tenant,
            decisions: self.decisions,
            filters: self.filters,
            lister: self.lister,
            fetcher: self.fetcher,
            processors: self.processors,
            store: self.store,
            notifier: self.notifier,
            clock,
            run_ids: self.run_ids,
        }
    }

    pub fn with_run_ids<I2: RunIdGen>(self, run_ids: I2) -> Watcher<L, F, C, I2> {
        Watcher {
            config: self.config,
            tenant: self.tenant,
            decisions: self.decisions,
            filters: self.filters,
            lister: self.lister,
            fetcher: self.fetcher,
            processors: self.processors,
            store: self.store,
            notifier: self.notifier,
            clock: self.clock,
            run_ids,
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    /// Perform exactly one run
    ///
    /// Listing, filter and store-read errors fail the run before any resource
    /// is attempted. Per-resource failures are recorded and counted, never
    /// returned.
    pub async fn run_once(
        &self,
        overrides: Option<FilterOverride<'_, L::Filter>>,
        cancel: &CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let run_id = self.run_ids.next_run();
        let span = tracing::info_span!("watcher.run", tenant = %self.tenant, run_id = %run_id);

        async {
            let started = self.clock.now();
            let result = self.execute(run_id.clone(), overrides, cancel).await;
            let elapsed = self.clock.now().saturating_duration_since(started);

            let result = result.map(|mut report| {
                report.elapsed = elapsed;
                report
            });
            match &result {
                Ok(report) => tracing::info!(
                    listed = report.listed,
                    processed = report.processed,
                    failed = report.failed,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "run complete"
                ),
                Err(EngineError::Cancelled) => tracing::info!("run cancelled"),
                Err(e) => tracing::error!(error = %e, "run failed"),
            }

            if !matches!(result, Err(EngineError::Cancelled)) {
                self.check_run_duration(&run_id, elapsed).await;
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        run_id: RunId,
        overrides: Option<FilterOverride<'_, L::Filter>>,
        cancel: &CancellationToken,
    ) -> Result<RunReport, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let mut report = RunReport::new(run_id.clone());

        let query = self.filters.build_query(overrides)?;
        let listed = match self.lister.list(&query, cancel).await {
            Ok(listed) => listed,
            Err(ListError::Cancelled) => return Err(EngineError::Cancelled),
            Err(_) if cancel.is_cancelled() => return Err(EngineError::Cancelled),
            Err(e) => return Err(e.into()),
        };
        report.listed = listed.len();

        if let Some(malformed) = listed.iter().find(|m| m.stamp.is_empty()) {
            return Err(EngineError::MalformedMetadata {
                resource_id: malformed.id.clone(),
            });
        }

        let (kept, filtered_out) = self.filters.retain(listed);
        report.filtered_out = filtered_out;

        let (unique, duplicates) = dedup(kept);
        report.duplicates = duplicates;

        let items = self.decide(unique, &mut report).await?;
        report.processed = items.len();

        let dispatcher = Dispatcher::new(
            AttemptContext {
                tenant: self.tenant.clone(),
                run_id,
                fetcher: Arc::clone(&self.fetcher),
                processors: self.processors.iter().cloned().collect(),
                store: Arc::clone(&self.store),
                notifier: Arc::clone(&self.notifier),
                clock: self.clock.clone(),
                policy: self.config.retry_policy(),
                resource_limit: self.config.resource_duration_notification_limit,
                ignore_state: self.config.ignore_state,
            },
            self.config.degree_of_parallelism,
        );
        for result in dispatcher.dispatch(items, cancel).await {
            report.record_outcome(&result.outcome);
            if result.ban.is_some() {
                report.newly_banned += 1;
            }
            if !result.persisted {
                report.persist_failures += 1;
            }
        }

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(report)
    }

    /// Partition resources into skips (counted) and work items
    async fn decide(
        &self,
        resources: Vec<ResourceMetadata>,
        report: &mut RunReport,
    ) -> Result<Vec<WorkItem>, EngineError> {
        let now = self.clock.utc_now();
        let mut items = Vec::new();

        for meta in resources {
            // Age is checked before any state lookup
            if let Some(reason) = self.decisions.too_old(&meta, now) {
                tracing::debug!(resource_id = %meta.id, %reason, "skipped");
                report.record_skip(&reason);
                continue;
            }

            let state = self.store.get(&self.tenant, &meta.id).await?;
            match self.decisions.decide(&meta, state.as_ref(), now) {
                Decision::Skip(reason) => {
                    tracing::debug!(resource_id = %meta.id, %reason, "skipped");
                    report.record_skip(&reason);
                }
                Decision::Process(reason) => items.push(WorkItem {
                    meta,
                    state,
                    reason,
                }),
            }
        }
        Ok(items)
    }

    async fn check_run_duration(&self, run_id: &RunId, elapsed: std::time::Duration) {
        let Some(limit) = self.config.run_duration_notification_limit else {
            return;
        };
        if elapsed <= limit {
            return;
        }
        let breach = DurationBreach::Run {
            tenant: self.tenant.clone(),
            run_id: run_id.clone(),
            elapsed,
            limit,
        };
        if let Err(e) = self.notifier.notify(&breach).await {
            tracing::warn!(error = %e, "duration notification failed");
        }
    }
}

/// Keep the first entry per resource id, returning the number dropped
fn dedup(resources: Vec<ResourceMetadata>) -> (Vec<ResourceMetadata>, usize) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(resources.len());
    let mut dropped = 0;
    for meta in resources {
        if seen.insert(meta.id.clone()) {
            unique.push(meta);
        } else {
            tracing::warn!(resource_id = %meta.id, "duplicate resource id in listing, keeping first");
            dropped += 1;
        }
    }
    (unique, dropped)
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
