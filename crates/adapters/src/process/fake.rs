// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake processor for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessError, Processor};
use async_trait::async_trait;
use rw_core::{ResourceId, ResourceMetadata};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Recorded processor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCall {
    pub processor: String,
    pub resource_id: ResourceId,
    pub payload: String,
}

type Hook = Arc<dyn Fn(&ResourceId) + Send + Sync>;

/// Fake processor over string payloads
///
/// Clones share recorded calls. Several fakes can share one call log via
/// [`FakeProcessor::sharing_log`] to observe ordering across processors.
#[derive(Clone)]
pub struct FakeProcessor {
    name: String,
    calls: Arc<Mutex<Vec<ProcessCall>>>,
    fail_on: Arc<Mutex<HashSet<ResourceId>>>,
    delay: Option<Duration>,
    hook: Option<Hook>,
}

impl FakeProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: Arc::new(Mutex::new(HashSet::new())),
            delay: None,
            hook: None,
        }
    }

    /// A new processor that appends to this one's call log
    pub fn sharing_log(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::clone(&self.calls),
            fail_on: Arc::new(Mutex::new(HashSet::new())),
            delay: None,
            hook: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Run `hook` at the start of every invocation
    pub fn with_hook(mut self, hook: impl Fn(&ResourceId) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Fail whenever `id` is processed
    pub fn fail_on(&self, id: impl Into<ResourceId>) {
        self.fail_on
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.into());
    }

    pub fn recover(&self, id: &str) {
        self.fail_on
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|r| r.as_str() != id);
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn processed_ids(&self) -> Vec<ResourceId> {
        self.calls()
            .into_iter()
            .filter(|c| c.processor == self.name)
            .map(|c| c.resource_id)
            .collect()
    }
}

#[async_trait]
impl Processor<String> for FakeProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(
        &self,
        meta: &ResourceMetadata,
        resource: &String,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        if let Some(hook) = &self.hook {
            hook(&meta.id);
        }
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProcessCall {
                processor: self.name.clone(),
                resource_id: meta.id.clone(),
                payload: resource.clone(),
            });

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(ProcessError::Cancelled),
            }
        }

        let fails = self
            .fail_on
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&meta.id);
        if fails {
            return Err(ProcessError::Failed(format!(
                "{} rejected {}",
                self.name, meta.id
            )));
        }
        Ok(())
    }
}
