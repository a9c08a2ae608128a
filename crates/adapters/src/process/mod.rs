// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource processors ("writers")

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessor, ProcessCall};

use async_trait::async_trait;
use rw_core::ResourceMetadata;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}")]
    Failed(String),
    #[error("rejected resource: {0}")]
    Rejected(String),
    #[error("processing cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Idempotent handler consuming a fetched resource
///
/// Processors run in registration order on the same payload. The first
/// failure stops the remaining processors for that resource only.
#[async_trait]
pub trait Processor<R>: Send + Sync + 'static {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    async fn process(
        &self,
        meta: &ResourceMetadata,
        resource: &R,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessError>;
}

#[async_trait]
impl<R, P> Processor<R> for Arc<P>
where
    R: Send + Sync + 'static,
    P: Processor<R> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn process(
        &self,
        meta: &ResourceMetadata,
        resource: &R,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        (**self).process(meta, resource, cancel).await
    }
}
