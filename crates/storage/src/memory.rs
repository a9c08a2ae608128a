// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process tracked-state store

use crate::{StoreError, TrackedStateStore};
use async_trait::async_trait;
use rw_core::{ResourceId, Tenant, TrackedState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Tracked state held in memory, lost on restart
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    entries: Arc<Mutex<HashMap<(Tenant, ResourceId), TrackedState>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite an entry without going through the async API
    pub fn insert(&self, tenant: &Tenant, id: &ResourceId, state: TrackedState) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((tenant.clone(), id.clone()), state);
    }

    /// Current entry, if any
    pub fn snapshot(&self, tenant: &Tenant, id: &ResourceId) -> Option<TrackedState> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(tenant.clone(), id.clone()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TrackedStateStore for MemoryStateStore {
    async fn get(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
    ) -> Result<Option<TrackedState>, StoreError> {
        Ok(self.snapshot(tenant, id))
    }

    async fn put(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
        state: &TrackedState,
    ) -> Result<(), StoreError> {
        self.insert(tenant, id, state.clone());
        Ok(())
    }
}
