// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{DurationBreach, Notifier, NotifyError};
use async_trait::async_trait;

/// Notifier that emits a warning through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, breach: &DurationBreach) -> Result<(), NotifyError> {
        tracing::warn!(
            kind = breach.kind(),
            tenant = %breach.tenant(),
            elapsed_ms = breach.elapsed().as_millis() as u64,
            limit_ms = breach.limit().as_millis() as u64,
            "{}",
            breach
        );
        Ok(())
    }
}
