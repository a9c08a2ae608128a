// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata listing adapters

mod noop;

pub use noop::StaticLister;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLister;

use async_trait::async_trait;
use rw_core::ResourceMetadata;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from listing; any of these fails the whole run
#[derive(Debug, Error)]
pub enum ListError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to parse listing: {0}")]
    Parse(String),
    #[error("listing cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lists the current metadata of all resources matching a query filter
#[async_trait]
pub trait MetadataLister: Send + Sync + 'static {
    /// Provider-specific query shape, rebuilt from `Default` every run
    type Filter: Default + Send + Sync + 'static;

    async fn list(
        &self,
        filter: &Self::Filter,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceMetadata>, ListError>;
}
