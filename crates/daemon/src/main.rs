// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource Watcher Daemon (rwd)
//!
//! Polls a source directory and copies new or changed files to an output
//! directory, remembering what it has already handled.
//!
//! Usage: `rwd [CONFIG] [--once]` (CONFIG defaults to `./rwd.toml`)

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod lifecycle;

use std::path::PathBuf;

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::lifecycle::{LifecycleError, Paths};

const DEFAULT_CONFIG: &str = "rwd.toml";

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: PathBuf,
    once: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut config = None;
    let mut once = false;
    for arg in args {
        match arg.as_str() {
            "--once" => once = true,
            flag if flag.starts_with('-') => return Err(format!("unknown flag: {}", flag)),
            path => {
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("expected at most one config path".to_string());
                }
            }
        }
    }
    Ok(Args {
        config: config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
        once,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = DaemonConfig::load(&args.config)?;
    let paths = Paths::for_config(&config)?;

    // Write startup marker to log (before tracing setup, so it always lands)
    write_startup_marker(&paths)?;
    let log_guard = setup_logging(&paths)?;

    info!(
        "Starting rwd for worker {} ({})",
        config.watcher.worker_name,
        args.config.display()
    );

    let mut daemon = match lifecycle::startup(config, paths.clone()) {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&paths, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    if args.once {
        let result = daemon
            .service
            .run_once(None, &CancellationToken::new())
            .await;
        daemon.shutdown().await;
        let report = result?;
        println!("{}", report);
        return Ok(());
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    daemon.service.start()?;
    info!("Daemon ready, state in {}", paths.state_dir.display());

    // Signal ready for parent process (e.g., systemd)
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }
    daemon.shutdown().await;

    info!("Daemon stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- rwd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- rwd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(paths: &Paths) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = paths.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(paths: &Paths, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    paths: &Paths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        paths.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        paths.log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_local_config_and_loop_mode() {
        assert_eq!(
            args(&[]).unwrap(),
            Args {
                config: PathBuf::from("rwd.toml"),
                once: false,
            }
        );
    }

    #[test]
    fn accepts_path_and_once_in_any_order() {
        let expected = Args {
            config: PathBuf::from("/etc/rwd.toml"),
            once: true,
        };
        assert_eq!(args(&["/etc/rwd.toml", "--once"]).unwrap(), expected);
        assert_eq!(args(&["--once", "/etc/rwd.toml"]).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_flags_and_extra_paths() {
        assert!(args(&["--verbose"]).unwrap_err().contains("--verbose"));
        assert!(args(&["a.toml", "b.toml"]).is_err());
    }
}
