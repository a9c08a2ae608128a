// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for listing, fetching, processing and notifying

pub mod fetch;
pub mod fs;
pub mod lister;
pub mod notify;
pub mod process;
pub mod traced;

pub use fetch::{FetchError, FetchOutcome, PayloadFetcher};
pub use fs::{CopyProcessor, DirectoryFilter, DirectoryLister, FileFetcher, FilePayload};
pub use lister::{ListError, MetadataLister, StaticLister};
pub use notify::{
    CommandNotifier, DurationBreach, LogNotifier, NoOpNotifier, Notifier, NotifyError,
};
pub use process::{ProcessError, Processor};
pub use traced::{TracedFetcher, TracedLister, TracedProcessor};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fetch::{FakeFetch, FakeFetcher};
#[cfg(any(test, feature = "test-support"))]
pub use lister::FakeLister;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcessor, ProcessCall};
