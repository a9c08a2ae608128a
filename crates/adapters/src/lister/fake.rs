// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lister for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ListError, MetadataLister};
use async_trait::async_trait;
use rw_core::ResourceMetadata;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

struct FakeListerState<F> {
    resources: Vec<ResourceMetadata>,
    fail_with: Option<String>,
    filters: Vec<F>,
}

/// Fake lister returning a configurable listing and recording the filters it
/// was queried with
pub struct FakeLister<F = ()> {
    state: Arc<Mutex<FakeListerState<F>>>,
    _filter: PhantomData<fn() -> F>,
}

impl<F> Clone for FakeLister<F> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            _filter: PhantomData,
        }
    }
}

impl<F> Default for FakeLister<F> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeListerState {
                resources: Vec::new(),
                fail_with: None,
                filters: Vec::new(),
            })),
            _filter: PhantomData,
        }
    }
}

impl<F: Clone> FakeLister<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: Vec<ResourceMetadata>) -> Self {
        let lister = Self::default();
        lister.set_resources(resources);
        lister
    }

    /// Replace the listing returned by subsequent calls
    pub fn set_resources(&self, resources: Vec<ResourceMetadata>) {
        self.lock().resources = resources;
    }

    /// Make subsequent calls fail with a transport error (`None` to recover)
    pub fn set_failure(&self, message: Option<&str>) {
        self.lock().fail_with = message.map(str::to_string);
    }

    /// Filters passed to each `list` call, in order
    pub fn filters(&self) -> Vec<F> {
        self.lock().filters.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().filters.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeListerState<F>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<F> MetadataLister for FakeLister<F>
where
    F: Clone + Default + Send + Sync + 'static,
{
    type Filter = F;

    async fn list(
        &self,
        filter: &F,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ResourceMetadata>, ListError> {
        let mut state = self.lock();
        state.filters.push(filter.clone());
        if let Some(message) = &state.fail_with {
            return Err(ListError::Transport(message.clone()));
        }
        Ok(state.resources.clone())
    }
}
