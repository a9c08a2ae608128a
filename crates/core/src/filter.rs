// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query filter composition and in-memory metadata predicates
//!
//! The query filter is rebuilt every run from `F::default()`: registered
//! configurers run in registration order, then the caller's one-off override.
//! After listing, a resource survives only if every predicate accepts it.

use crate::resource::ResourceMetadata;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter configurer '{name}' failed: {reason}")]
    Configurer { name: String, reason: String },
}

/// Mutates the query filter; an `Err` aborts the run
pub type Configurer<F> = Arc<dyn Fn(&mut F) -> Result<(), String> + Send + Sync>;

/// Accepts or rejects one listed resource
pub type MetadataPredicate = Arc<dyn Fn(&ResourceMetadata) -> bool + Send + Sync>;

/// One-off adjustment applied after all configurers, for a single run
pub type FilterOverride<'a, F> = &'a (dyn Fn(&mut F) + Send + Sync);

pub struct FilterChain<F> {
    configurers: Vec<(String, Configurer<F>)>,
    predicates: Vec<(String, MetadataPredicate)>,
}

impl<F> Clone for FilterChain<F> {
    fn clone(&self) -> Self {
        Self {
            configurers: self.configurers.clone(),
            predicates: self.predicates.clone(),
        }
    }
}

impl<F> Default for FilterChain<F> {
    fn default() -> Self {
        Self {
            configurers: Vec::new(),
            predicates: Vec::new(),
        }
    }
}

impl<F> fmt::Debug for FilterChain<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field(
                "configurers",
                &self.configurers.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field(
                "predicates",
                &self.predicates.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<F: Default> FilterChain<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configurer; runs after those registered before it
    pub fn configure(
        mut self,
        name: impl Into<String>,
        configurer: impl Fn(&mut F) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.configurers.push((name.into(), Arc::new(configurer)));
        self
    }

    /// Register a metadata predicate
    pub fn retain_if(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&ResourceMetadata) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicates.push((name.into(), Arc::new(predicate)));
        self
    }

    /// Build this run's query filter
    pub fn build_query(&self, overrides: Option<FilterOverride<'_, F>>) -> Result<F, FilterError> {
        let mut filter = F::default();
        for (name, configurer) in &self.configurers {
            configurer(&mut filter).map_err(|reason| FilterError::Configurer {
                name: name.clone(),
                reason,
            })?;
        }
        if let Some(overrides) = overrides {
            overrides(&mut filter);
        }
        Ok(filter)
    }

    /// Whether every predicate accepts `meta`
    pub fn accepts(&self, meta: &ResourceMetadata) -> bool {
        self.predicates.iter().all(|(name, predicate)| {
            let keep = predicate(meta);
            if !keep {
                tracing::trace!(resource_id = %meta.id, predicate = %name, "filtered out");
            }
            keep
        })
    }

    /// Keep only accepted resources, returning them and the number dropped
    pub fn retain(&self, listed: Vec<ResourceMetadata>) -> (Vec<ResourceMetadata>, usize) {
        let before = listed.len();
        let kept: Vec<_> = listed.into_iter().filter(|m| self.accepts(m)).collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
