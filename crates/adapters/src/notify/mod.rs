// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duration breach notifications

mod command;
mod log;

pub use command::CommandNotifier;
pub use log::LogNotifier;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifier;

use async_trait::async_trait;
use rw_core::{ResourceId, RunId, Tenant};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A run or a single resource took longer than its configured limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationBreach {
    Run {
        tenant: Tenant,
        run_id: RunId,
        elapsed: Duration,
        limit: Duration,
    },
    Resource {
        tenant: Tenant,
        resource_id: ResourceId,
        elapsed: Duration,
        limit: Duration,
    },
}

impl DurationBreach {
    pub fn kind(&self) -> &'static str {
        match self {
            DurationBreach::Run { .. } => "run",
            DurationBreach::Resource { .. } => "resource",
        }
    }

    pub fn tenant(&self) -> &Tenant {
        match self {
            DurationBreach::Run { tenant, .. } | DurationBreach::Resource { tenant, .. } => tenant,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            DurationBreach::Run { elapsed, .. } | DurationBreach::Resource { elapsed, .. } => {
                *elapsed
            }
        }
    }

    pub fn limit(&self) -> Duration {
        match self {
            DurationBreach::Run { limit, .. } | DurationBreach::Resource { limit, .. } => *limit,
        }
    }
}

impl fmt::Display for DurationBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationBreach::Run {
                tenant,
                run_id,
                elapsed,
                limit,
            } => write!(
                f,
                "run {} of {} took {}ms (limit {}ms)",
                run_id,
                tenant,
                elapsed.as_millis(),
                limit.as_millis()
            ),
            DurationBreach::Resource {
                tenant,
                resource_id,
                elapsed,
                limit,
            } => write!(
                f,
                "resource {} of {} took {}ms (limit {}ms)",
                resource_id,
                tenant,
                elapsed.as_millis(),
                limit.as_millis()
            ),
        }
    }
}

/// Receives duration breaches. Failures are logged by the caller and never
/// affect the outcome of the run or resource.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, breach: &DurationBreach) -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    async fn notify(&self, breach: &DurationBreach) -> Result<(), NotifyError> {
        (**self).notify(breach).await
    }
}

/// Notifier that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _breach: &DurationBreach) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
