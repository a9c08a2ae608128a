// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Resource watcher engine

mod dispatcher;
mod error;
mod report;
mod scheduler;
mod watcher;

#[cfg(test)]
mod testing;

pub use error::EngineError;
pub use report::RunReport;
pub use scheduler::{ServiceState, WatcherService};
pub use watcher::Watcher;
