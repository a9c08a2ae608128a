// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lister over a fixed set of resources

use super::{ListError, MetadataLister};
use async_trait::async_trait;
use rw_core::ResourceMetadata;
use tokio_util::sync::CancellationToken;

/// Lister that always returns the same resources.
///
/// Used for embedding a known, fixed resource set (e.g. a configured list of
/// endpoints) where there is nothing to query.
#[derive(Clone, Debug, Default)]
pub struct StaticLister {
    resources: Vec<ResourceMetadata>,
}

impl StaticLister {
    pub fn new(resources: Vec<ResourceMetadata>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl MetadataLister for StaticLister {
    type Filter = ();

    async fn list(
        &self,
        _filter: &(),
        _cancel: &CancellationToken,
    ) -> Result<Vec<ResourceMetadata>, ListError> {
        Ok(self.resources.clone())
    }
}
