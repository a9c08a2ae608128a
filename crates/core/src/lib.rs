// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rw-core: Core library for the resource watcher
//!
//! This crate provides:
//! - Resource metadata and change stamps
//! - The tracked-state machine (retry counting, bans)
//! - The skip/process decision rules
//! - Query filter composition
//! - Configuration and clock abstractions
//!
//! Nothing here performs I/O.

pub mod clock;
pub mod config;
pub mod decision;
pub mod digest;
pub mod filter;
pub mod id;
pub mod resource;
pub mod tracked;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, WatcherConfig};
pub use decision::{Decision, DecisionEngine, ProcessReason, SkipReason};
pub use digest::sha256_hex;
pub use filter::{Configurer, FilterChain, FilterError, FilterOverride, MetadataPredicate};
pub use id::{ResourceId, RunId, RunIdGen, SequentialRunIdGen, Tenant, UuidRunIdGen};
pub use resource::{ChangeStamp, ResourceMetadata};
pub use tracked::{BanEntered, ResourceOutcome, RetryPolicy, TrackedState};
