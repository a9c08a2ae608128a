// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the watcher engine

use rw_adapters::ListError;
use rw_core::{FilterError, ResourceId};
use rw_storage::StoreError;
use thiserror::Error;

/// Errors that abort a whole run
///
/// Per-resource failures never show up here; they are recorded in the
/// resource's tracked state and counted in the run report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("listing failed: {0}")]
    List(#[from] ListError),
    #[error("resource {resource_id} has no change stamp")]
    MalformedMetadata { resource_id: ResourceId },
    #[error("state store error: {0}")]
    Store(#[from] StoreError),
    #[error("watcher is already running")]
    AlreadyRunning,
    #[error("run cancelled")]
    Cancelled,
}
