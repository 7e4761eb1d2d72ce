#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Read-only record repository abstraction.
//!
//! The aggregation and analytics paths never touch storage directly: they
//! fetch candidate records per infrastructure type through the
//! [`InfrastructureRepository`] trait, restricted to a resolved commune
//! filter. The in-memory implementation backs the server binary (loaded
//! from a survey snapshot at startup) and the test suites.

pub mod snapshot;

use std::collections::BTreeMap;

use async_trait::async_trait;
use piste_map_geography::CommuneFilter;
use piste_map_infra_models::{InfrastructureRecord, InfrastructureType};
use thiserror::Error;

/// Failure to reach one infrastructure type's backing store.
///
/// Recovered at the type level: the failing type contributes nothing to the
/// result while the other types proceed. Never retried — the store is
/// assumed to be available again on a later request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("backing store for {infra_type} unavailable: {message}")]
pub struct RepositoryError {
    /// The type whose fetch failed.
    pub infra_type: InfrastructureType,
    /// Human-readable failure description.
    pub message: String,
}

/// Read-only access to surveyed records, one fetch per infrastructure type.
#[async_trait]
pub trait InfrastructureRepository: Send + Sync {
    /// Fetches the candidate records of `infra_type` owned by a commune in
    /// scope of `communes`, in stable repository iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the type's backing store cannot be
    /// reached.
    async fn fetch(
        &self,
        infra_type: InfrastructureType,
        communes: &CommuneFilter,
    ) -> Result<Vec<InfrastructureRecord>, RepositoryError>;
}

/// In-memory repository preserving insertion order per type.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: BTreeMap<InfrastructureType, Vec<InfrastructureRecord>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Appends a record for `infra_type`, keeping insertion order.
    pub fn insert(&mut self, infra_type: InfrastructureType, record: InfrastructureRecord) {
        self.records.entry(infra_type).or_default().push(record);
    }

    /// Total number of stored records across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Returns `true` when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InfrastructureRepository for MemoryRepository {
    async fn fetch(
        &self,
        infra_type: InfrastructureType,
        communes: &CommuneFilter,
    ) -> Result<Vec<InfrastructureRecord>, RepositoryError> {
        Ok(self
            .records
            .get(&infra_type)
            .map(|rows| {
                rows.iter()
                    .filter(|record| communes.matches(record.commune_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
