// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests

use crate::dispatcher::{AttemptContext, WorkItem};
use crate::watcher::Watcher;
use chrono::{DateTime, TimeZone, Utc};
use rw_adapters::{FakeFetcher, FakeLister, FakeNotifier, FakeProcessor, Processor};
use rw_core::{
    FakeClock, ProcessReason, ResourceId, ResourceMetadata, SequentialRunIdGen, Tenant,
    TrackedState, WatcherConfig,
};
use rw_storage::MemoryStateStore;
use std::sync::Arc;

pub(crate) type TestWatcher = Watcher<FakeLister<()>, FakeFetcher, FakeClock, SequentialRunIdGen>;

pub(crate) const TENANT: &str = "test-tenant";

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

pub(crate) fn days_ago(days: i64) -> DateTime<Utc> {
    t0() - chrono::Duration::days(days)
}

pub(crate) fn meta(id: &str) -> ResourceMetadata {
    ResourceMetadata::modified_at(id, days_ago(1))
}

pub(crate) fn config() -> WatcherConfig {
    WatcherConfig::new(TENANT)
}

/// Fakes wired into a watcher, kept around for inspection
pub(crate) struct Harness {
    pub lister: FakeLister<()>,
    pub fetcher: FakeFetcher,
    pub processor: FakeProcessor,
    pub store: MemoryStateStore,
    pub notifier: FakeNotifier,
    pub clock: FakeClock,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            lister: FakeLister::new(),
            fetcher: FakeFetcher::new(),
            processor: FakeProcessor::new("primary"),
            store: MemoryStateStore::new(),
            notifier: FakeNotifier::new(),
            clock: FakeClock::at(t0()),
        }
    }

    pub fn with_resources(self, resources: Vec<ResourceMetadata>) -> Self {
        self.lister.set_resources(resources);
        self
    }

    pub fn watcher(&self, config: WatcherConfig) -> TestWatcher {
        self.bare_watcher(config)
            .with_processor(self.processor.clone())
    }

    /// A watcher without any processor registered
    pub fn bare_watcher(&self, config: WatcherConfig) -> TestWatcher {
        Watcher::new(
            config,
            self.lister.clone(),
            self.fetcher.clone(),
            Arc::new(self.store.clone()),
        )
        .with_notifier(self.notifier.clone())
        .with_clock(self.clock.clone())
        .with_run_ids(SequentialRunIdGen::new())
    }

    pub fn context(
        &self,
        config: &WatcherConfig,
        processors: Vec<Arc<dyn Processor<String>>>,
    ) -> AttemptContext<FakeFetcher, FakeClock> {
        AttemptContext {
            tenant: config.tenant(),
            run_id: rw_core::RunId::new("run-test"),
            fetcher: Arc::new(self.fetcher.clone()),
            processors: processors.into(),
            store: Arc::new(self.store.clone()),
            notifier: Arc::new(self.notifier.clone()),
            clock: self.clock.clone(),
            policy: config.retry_policy(),
            resource_limit: config.resource_duration_notification_limit,
            ignore_state: config.ignore_state,
        }
    }

    pub fn state(&self, id: &str) -> Option<TrackedState> {
        self.store.snapshot(&Tenant::new(TENANT), &ResourceId::new(id))
    }

    pub fn seed(&self, id: &str, state: TrackedState) {
        self.store.insert(&Tenant::new(TENANT), &ResourceId::new(id), state);
    }
}

pub(crate) fn work(id: &str) -> WorkItem {
    WorkItem {
        meta: meta(id),
        state: None,
        reason: ProcessReason::FirstSighting,
    }
}
