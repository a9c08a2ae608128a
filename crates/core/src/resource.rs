// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource metadata as observed on each listing

use crate::id::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The change signal of a resource
///
/// A plain resource carries a single `modified` timestamp. An aggregate
/// resource built from several underlying signals carries them, in order, in
/// `sources`. Both may be present. Two stamps are equal only if every
/// component is equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStamp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<DateTime<Utc>>,
}

impl ChangeStamp {
    pub fn modified(at: DateTime<Utc>) -> Self {
        Self {
            modified: Some(at),
            sources: Vec::new(),
        }
    }

    pub fn sources(sources: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        Self {
            modified: None,
            sources: sources.into_iter().collect(),
        }
    }

    /// Most recent timestamp across `modified` and `sources`
    ///
    /// `None` means the stamp carries no signal at all.
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.modified.into_iter().chain(self.sources.iter().copied()).max()
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_none() && self.sources.is_empty()
    }
}

/// One remote resource as currently observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub id: ResourceId,
    pub stamp: ChangeStamp,
    /// Provider-specific detail (path, size, content type, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ResourceMetadata {
    pub fn new(id: impl Into<ResourceId>, stamp: ChangeStamp) -> Self {
        Self {
            id: id.into(),
            stamp,
            attributes: BTreeMap::new(),
        }
    }

    /// Shorthand for a resource with a single `modified` timestamp
    pub fn modified_at(id: impl Into<ResourceId>, at: DateTime<Utc>) -> Self {
        Self::new(id, ChangeStamp::modified(at))
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Latest change timestamp, `None` for malformed metadata
    pub fn latest_modified(&self) -> Option<DateTime<Utc>> {
        self.stamp.latest()
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
