// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::FilePayload;
use crate::process::{ProcessError, Processor};
use async_trait::async_trait;
use rw_core::ResourceMetadata;
use std::path::{Component, Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Mirrors fetched files into an output directory
///
/// Writes `<output>/<resource id>` through a temp file and rename, so a
/// repeated run over the same payload leaves the same result.
#[derive(Clone, Debug)]
pub struct CopyProcessor {
    output: PathBuf,
}

impl CopyProcessor {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn target_for(&self, id: &str) -> Result<PathBuf, ProcessError> {
        let relative = Path::new(id);
        let safe = !id.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(ProcessError::Rejected(format!(
                "resource id is not a relative path: {}",
                id
            )));
        }
        Ok(self.output.join(relative))
    }
}

#[async_trait]
impl Processor<FilePayload> for CopyProcessor {
    fn name(&self) -> &str {
        "copy"
    }

    async fn process(
        &self,
        meta: &ResourceMetadata,
        resource: &FilePayload,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        if cancel.is_cancelled() {
            return Err(ProcessError::Cancelled);
        }
        let target = self.target_for(meta.id.as_str())?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp_name = target.as_os_str().to_owned();
        tmp_name.push(format!(".tmp-{}", std::process::id()));
        let tmp = PathBuf::from(tmp_name);
        tokio::fs::write(&tmp, &resource.bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::debug!(resource_id = %meta.id, target = %target.display(), bytes = resource.bytes.len(), "copied");
        Ok(())
    }
}
