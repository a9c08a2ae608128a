// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{PATH_ATTRIBUTE, SIZE_ATTRIBUTE};
use crate::lister::{ListError, MetadataLister};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rw_core::ResourceMetadata;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Query filter for [`DirectoryLister`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
    /// Accepted file extensions without the dot; empty accepts all
    pub extensions: Vec<String>,
    /// Only file names starting with this prefix
    pub name_prefix: Option<String>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl DirectoryFilter {
    fn matches(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        if let Some(prefix) = &self.name_prefix {
            if !name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Lists regular files under a root directory
#[derive(Clone, Debug)]
pub struct DirectoryLister {
    root: PathBuf,
}

impl DirectoryLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resource_id(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
        Some(parts?.join("/"))
    }
}

#[async_trait]
impl MetadataLister for DirectoryLister {
    type Filter = DirectoryFilter;

    async fn list(
        &self,
        filter: &DirectoryFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceMetadata>, ListError> {
        let mut pending = vec![self.root.clone()];
        let mut listed = Vec::new();

        while let Some(dir) = pending.pop() {
            if cancel.is_cancelled() {
                return Err(ListError::Cancelled);
            }
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    if filter.recursive {
                        pending.push(path);
                    }
                    continue;
                }
                if !file_type.is_file() || !filter.matches(&path) {
                    continue;
                }
                let Some(id) = self.resource_id(&path) else {
                    tracing::warn!(path = %path.display(), "skipping non-utf8 path");
                    continue;
                };
                let metadata = entry.metadata().await?;
                let modified: DateTime<Utc> = metadata.modified()?.into();
                listed.push(
                    ResourceMetadata::modified_at(id, modified)
                        .with_attribute(PATH_ATTRIBUTE, path.display().to_string())
                        .with_attribute(SIZE_ATTRIBUTE, metadata.len().to_string()),
                );
            }
        }

        listed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listed)
    }
}
