// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake fetcher for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FetchError, FetchOutcome, PayloadFetcher};
use async_trait::async_trait;
use rw_core::{ResourceId, ResourceMetadata, TrackedState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Scripted response for one resource
#[derive(Debug, Clone)]
pub enum FakeFetch {
    /// Return `payload` with an optional checksum, or the no-change outcome
    /// when the checksum equals the tracked one
    Payload {
        payload: String,
        checksum: Option<String>,
    },
    /// Return the no-change outcome
    Unchanged,
    /// Fail with a transport error
    Fail(String),
}

#[derive(Default)]
struct FakeFetcherState {
    scripts: HashMap<ResourceId, FakeFetch>,
    calls: Vec<ResourceId>,
    delay: Option<Duration>,
}

/// Fake fetcher with per-resource scripts, call recording and in-flight
/// tracking
///
/// Unscripted resources return their id as the payload with no checksum.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    state: Arc<Mutex<FakeFetcherState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, id: impl Into<ResourceId>, fetch: FakeFetch) {
        self.lock().scripts.insert(id.into(), fetch);
    }

    pub fn fail(&self, id: impl Into<ResourceId>, message: &str) {
        self.script(id, FakeFetch::Fail(message.to_string()));
    }

    /// Hold every fetch for `delay` before answering
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Resource ids fetched, in call order
    pub fn calls(&self) -> Vec<ResourceId> {
        self.lock().calls.clone()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == id).count()
    }

    /// Highest number of fetches observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeFetcherState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Decrements the in-flight counter even when the fetch is aborted
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PayloadFetcher for FakeFetcher {
    type Resource = String;

    async fn fetch(
        &self,
        meta: &ResourceMetadata,
        last: Option<&TrackedState>,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<String>, FetchError> {
        let (script, delay) = {
            let mut state = self.lock();
            state.calls.push(meta.id.clone());
            (state.scripts.get(&meta.id).cloned(), state.delay)
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(Arc::clone(&self.in_flight));

        let waited = match delay {
            Some(delay) => tokio::select! {
                _ = tokio::time::sleep(delay) => true,
                _ = cancel.cancelled() => false,
            },
            None => true,
        };
        if !waited {
            return Err(FetchError::Cancelled);
        }

        match script {
            Some(FakeFetch::Payload { checksum: Some(checksum), .. })
                if last.and_then(|s| s.checksum.as_deref()) == Some(checksum.as_str()) =>
            {
                Ok(FetchOutcome::Unchanged)
            }
            Some(FakeFetch::Payload { payload, checksum }) => Ok(FetchOutcome::Fetched {
                resource: payload,
                checksum,
            }),
            Some(FakeFetch::Unchanged) => Ok(FetchOutcome::Unchanged),
            Some(FakeFetch::Fail(message)) => Err(FetchError::Transport(message)),
            None => Ok(FetchOutcome::fetched(meta.id.to_string())),
        }
    }
}
