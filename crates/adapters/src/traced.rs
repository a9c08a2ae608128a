// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::fetch::{FetchError, FetchOutcome, PayloadFetcher};
use crate::lister::{ListError, MetadataLister};
use crate::process::{ProcessError, Processor};
use async_trait::async_trait;
use rw_core::{ResourceMetadata, TrackedState};
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Wrapper that adds tracing to any MetadataLister
#[derive(Clone)]
pub struct TracedLister<L> {
    inner: L,
}

impl<L> TracedLister<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: MetadataLister> MetadataLister for TracedLister<L>
where
    L::Filter: std::fmt::Debug,
{
    type Filter = L::Filter;

    async fn list(
        &self,
        filter: &L::Filter,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceMetadata>, ListError> {
        let span = tracing::info_span!("lister.list");
        async {
            tracing::debug!(?filter, "listing");

            let start = std::time::Instant::now();
            let result = self.inner.list(filter, cancel).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(listed) => tracing::info!(
                    count = listed.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "listed"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "list failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any PayloadFetcher
#[derive(Clone)]
pub struct TracedFetcher<F> {
    inner: F,
}

impl<F> TracedFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F: PayloadFetcher> PayloadFetcher for TracedFetcher<F> {
    type Resource = F::Resource;

    async fn fetch(
        &self,
        meta: &ResourceMetadata,
        last: Option<&TrackedState>,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<F::Resource>, FetchError> {
        let span = tracing::debug_span!("fetcher.fetch", resource_id = %meta.id);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.fetch(meta, last, cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(FetchOutcome::Fetched { checksum, .. }) => {
                    tracing::debug!(elapsed_ms, checksum = ?checksum, "fetched")
                }
                Ok(FetchOutcome::Unchanged) => tracing::debug!(elapsed_ms, "checksum unchanged"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "fetch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any Processor
pub struct TracedProcessor<P, R> {
    inner: P,
    _resource: PhantomData<fn(&R)>,
}

impl<P: Clone, R> Clone for TracedProcessor<P, R> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<P, R> TracedProcessor<P, R> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<P, R> Processor<R> for TracedProcessor<P, R>
where
    P: Processor<R>,
    R: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn process(
        &self,
        meta: &ResourceMetadata,
        resource: &R,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        let span = tracing::debug_span!(
            "processor.process",
            processor = self.inner.name(),
            resource_id = %meta.id
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.process(meta, resource, cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "processed"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "process failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
