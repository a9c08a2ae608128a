// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload fetching adapters

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFetch, FakeFetcher};

use async_trait::async_trait;
use rw_core::{ResourceId, ResourceMetadata, TrackedState};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from fetching one resource; recorded as that resource's failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found: {0}")]
    NotFound(ResourceId),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("fetch cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a fetch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<R> {
    /// New content, with its checksum when the provider computes one
    Fetched { resource: R, checksum: Option<String> },
    /// The stamp moved but the content checksum matches the tracked one
    Unchanged,
}

impl<R> FetchOutcome<R> {
    pub fn fetched(resource: R) -> Self {
        FetchOutcome::Fetched {
            resource,
            checksum: None,
        }
    }

    pub fn with_checksum(resource: R, checksum: impl Into<String>) -> Self {
        FetchOutcome::Fetched {
            resource,
            checksum: Some(checksum.into()),
        }
    }
}

/// Retrieves the payload of a changed resource
#[async_trait]
pub trait PayloadFetcher: Send + Sync + 'static {
    type Resource: Send + Sync + 'static;

    /// `last` is the tracked state read at decision time, `None` on first
    /// sighting. Return `Unchanged` when its checksum still matches.
    async fn fetch(
        &self,
        meta: &ResourceMetadata,
        last: Option<&TrackedState>,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<Self::Resource>, FetchError>;
}
