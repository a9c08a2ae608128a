// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod watcher;

pub use watcher::{ConfigError, WatcherConfig};
