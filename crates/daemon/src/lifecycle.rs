// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use rw_adapters::{
    CommandNotifier, CopyProcessor, DirectoryFilter, DirectoryLister, FileFetcher, LogNotifier,
    TracedFetcher, TracedLister, TracedProcessor,
};
use rw_core::{ConfigError, FilterChain, SystemClock, UuidRunIdGen};
use rw_engine::{Watcher, WatcherService};
use rw_storage::{JsonStateStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DaemonConfig;

pub type DaemonLister = TracedLister<DirectoryLister>;
pub type DaemonFetcher = TracedFetcher<FileFetcher>;

/// Watcher service with concrete adapter types (wrapped with tracing)
pub type DaemonService = WatcherService<DaemonLister, DaemonFetcher, SystemClock, UuidRunIdGen>;

/// Files the daemon owns under its state directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    /// Tracked-state store root
    pub store_path: PathBuf,
}

impl Paths {
    /// Resolve paths for a config; each worker gets its own state directory
    pub fn for_config(config: &DaemonConfig) -> Result<Self, LifecycleError> {
        let state_dir = match &config.state.directory {
            Some(dir) => dir.clone(),
            None => default_state_dir()?.join(sanitize(&config.watcher.worker_name)),
        };
        Ok(Self::under(state_dir))
    }

    fn under(state_dir: PathBuf) -> Self {
        Self {
            lock_path: state_dir.join("rwd.pid"),
            log_path: state_dir.join("rwd.log"),
            store_path: state_dir.join("tracked"),
            state_dir,
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub service: DaemonService,
}

impl DaemonState {
    /// Stop the polling loop and release the lock
    pub async fn shutdown(&mut self) {
        info!("Shutting down daemon...");
        self.service.stop().await;

        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        info!("Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub fn startup(config: DaemonConfig, paths: Paths) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config, &paths) {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(&paths, &e);
            Err(e)
        }
    }
}

fn startup_inner(config: DaemonConfig, paths: &Paths) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&paths.state_dir)?;

    // Acquire lock file FIRST - two daemons must never share a store
    let mut lock_file = File::create(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    {
        use std::io::Write;
        writeln!(lock_file, "{}", std::process::id())?;
    }

    let store = JsonStateStore::open(&paths.store_path)?;
    std::fs::create_dir_all(&config.output.directory)?;

    let watcher = build_watcher(&config, Arc::new(store));
    info!(
        tenant = %watcher.tenant(),
        source = %config.source.directory.display(),
        output = %config.output.directory.display(),
        "watcher configured"
    );

    Ok(DaemonState {
        paths: paths.clone(),
        lock_file,
        service: WatcherService::new(watcher),
    })
}

fn build_watcher(
    config: &DaemonConfig,
    store: Arc<JsonStateStore>,
) -> Watcher<DaemonLister, DaemonFetcher> {
    let source = config.source.filter();
    let filters = FilterChain::<DirectoryFilter>::new().configure("source", move |filter| {
        *filter = source.clone();
        Ok(())
    });

    let watcher = Watcher::new(
        config.watcher.clone(),
        TracedLister::new(DirectoryLister::new(config.source.directory.clone())),
        TracedFetcher::new(FileFetcher::new(config.source.directory.clone())),
        store,
    )
    .with_filters(filters)
    .with_processor(TracedProcessor::new(CopyProcessor::new(
        config.output.directory.clone(),
    )));

    match &config.notify {
        Some(notify) => watcher.with_notifier(CommandNotifier::new(notify.command.clone())),
        None => watcher.with_notifier(LogNotifier),
    }
}

/// Clean up resources on startup failure
///
/// A failed lock belongs to the running daemon and must be left alone.
fn cleanup_on_failure(paths: &Paths, error: &LifecycleError) {
    if matches!(error, LifecycleError::LockFailed(_)) {
        return;
    }
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

fn default_state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("RWD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("rwd"))
        .ok_or(LifecycleError::NoStateDir)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
