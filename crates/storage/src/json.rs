// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based tracked-state store
//!
//! Layout: `<base>/<tenant>/<sha256(resource id)>.json`. Each file holds the
//! resource id next to its state so a file can be traced back to its key. Writes go to
//! a uniquely named temp file first and are renamed into place, which keeps
//! each key atomic under concurrent workers.

use crate::{StoreError, TrackedStateStore};
use async_trait::async_trait;
use rw_core::{sha256_hex, ResourceId, Tenant, TrackedState};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize)]
struct StoredRecord {
    resource_id: ResourceId,
    state: TrackedState,
}

/// Tracked state persisted as one JSON document per resource
#[derive(Clone, Debug)]
pub struct JsonStateStore {
    base_path: PathBuf,
}

impl JsonStateStore {
    /// Open a store at the given path, creating it if needed
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn tenant_dir(&self, tenant: &Tenant) -> PathBuf {
        self.base_path.join(sanitize(tenant.as_str()))
    }

    fn path_for(&self, tenant: &Tenant, id: &ResourceId) -> PathBuf {
        self.tenant_dir(tenant)
            .join(format!("{}.json", sha256_hex(id.as_str().as_bytes())))
    }
}

#[async_trait]
impl TrackedStateStore for JsonStateStore {
    async fn get(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
    ) -> Result<Option<TrackedState>, StoreError> {
        let path = self.path_for(tenant, id);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: StoredRecord = serde_json::from_str(&json)?;
        Ok(Some(record.state))
    }

    async fn put(
        &self,
        tenant: &Tenant,
        id: &ResourceId,
        state: &TrackedState,
    ) -> Result<(), StoreError> {
        let path = self.path_for(tenant, id);
        let dir = self.tenant_dir(tenant);
        tokio::fs::create_dir_all(&dir).await?;

        let record = StoredRecord {
            resource_id: id.clone(),
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;

        let tmp = path.with_extension(format!("json.tmp-{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::trace!(tenant = %tenant, resource_id = %id, path = %path.display(), "state written");
        Ok(())
    }
}

/// Keep tenant directory names filesystem-safe
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
