// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracked-state store contract

use async_trait::async_trait;
use rw_core::{ResourceId, Tenant, TrackedState};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value store of tracked state keyed by `(tenant, resource id)`
///
/// Implementations must allow concurrent calls for distinct keys. Writes to a
/// single key are atomic; there are no cross-key transactions.
#[async_trait]
pub trait TrackedStateStore: Send + Sync + 'static {
    async fn get(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
    ) -> Result<Option<TrackedState>, StoreError>;

    async fn put(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
        state: &TrackedState,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: TrackedStateStore + ?Sized> TrackedStateStore for Arc<S> {
    async fn get(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
    ) -> Result<Option<TrackedState>, StoreError> {
        (**self).get(tenant, id).await
    }

    async fn put(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
        state: &TrackedState,
    ) -> Result<(), StoreError> {
        (**self).put(tenant, id, state).await
    }
}
