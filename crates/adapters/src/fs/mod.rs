// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local filesystem adapters
//!
//! A directory is the resource source: every regular file is a resource, its
//! id the path relative to the root with `/` separators, its change stamp the
//! file's mtime.

mod copy;
mod directory;
mod file;

pub use copy::CopyProcessor;
pub use directory::{DirectoryFilter, DirectoryLister};
pub use file::{FileFetcher, FilePayload};

/// Attribute holding the absolute path of a listed file
pub const PATH_ATTRIBUTE: &str = "path";
/// Attribute holding the size in bytes of a listed file
pub const SIZE_ATTRIBUTE: &str = "size";

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
