// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::PATH_ATTRIBUTE;
use crate::fetch::{FetchError, FetchOutcome, PayloadFetcher};
use async_trait::async_trait;
use rw_core::{sha256_hex, ResourceMetadata, TrackedState};
use std::io;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Contents of a fetched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Reads listed files and short-circuits when the content hash is unchanged
#[derive(Clone, Debug)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, meta: &ResourceMetadata) -> PathBuf {
        match meta.attribute(PATH_ATTRIBUTE) {
            Some(path) => PathBuf::from(path),
            None => self.root.join(meta.id.as_str()),
        }
    }
}

#[async_trait]
impl PayloadFetcher for FileFetcher {
    type Resource = FilePayload;

    async fn fetch(
        &self,
        meta: &ResourceMetadata,
        last: Option<&TrackedState>,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<FilePayload>, FetchError> {
        let path = self.path_for(meta);
        let bytes = tokio::select! {
            read = tokio::fs::read(&path) => match read {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(FetchError::NotFound(meta.id.clone()))
                }
                Err(e) => return Err(e.into()),
            },
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        let checksum = sha256_hex(&bytes);
        if last.and_then(|s| s.checksum.as_deref()) == Some(checksum.as_str()) {
            tracing::debug!(resource_id = %meta.id, "content unchanged");
            return Ok(FetchOutcome::Unchanged);
        }
        Ok(FetchOutcome::with_checksum(FilePayload { path, bytes }, checksum))
    }
}
