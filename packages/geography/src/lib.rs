#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Administrative hierarchy index and geographic filter resolution.
//!
//! Builds an eager region → prefecture → commune index once at startup and
//! resolves incoming geographic filters into a concrete commune-id set. The
//! index is shared by reference across requests; nothing here touches
//! storage after construction.

use std::collections::{BTreeMap, BTreeSet};

use piste_map_geography_models::{Commune, Prefecture, Region};
use thiserror::Error;

/// A geographic filter value that is not a valid numeric identifier.
///
/// Callers treat this as "no matches", never as a fatal request error: the
/// aggregation still returns a well-formed empty collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} filter value '{value}': expected a numeric id")]
pub struct InvalidFilterError {
    /// Which query parameter was malformed.
    pub field: &'static str,
    /// The raw value received.
    pub value: String,
}

/// The resolved commune scope of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommuneFilter {
    /// No geographic filter; records from every commune (and records with
    /// no commune at all) are in scope.
    All,
    /// Only records owned by one of these communes are in scope.
    Ids(BTreeSet<i64>),
}

impl CommuneFilter {
    /// Returns `true` when a record owned by `commune_id` is in scope.
    #[must_use]
    pub fn matches(&self, commune_id: Option<i64>) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => commune_id.is_some_and(|id| ids.contains(&id)),
        }
    }

    /// Returns `true` when the filter can never match any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Ids(ids) => ids.is_empty(),
        }
    }
}

/// Eagerly-resolved administrative hierarchy.
///
/// Replaces per-request parent-chain walks with prebuilt child id-set maps
/// per level. Communes with no parent prefecture are reachable only
/// directly, not through the coarser filters or the hierarchy tree.
#[derive(Debug, Default)]
pub struct AdminIndex {
    regions: BTreeMap<i64, Region>,
    prefectures: BTreeMap<i64, Prefecture>,
    prefectures_by_region: BTreeMap<i64, BTreeSet<i64>>,
    communes: BTreeMap<i64, Commune>,
    communes_by_prefecture: BTreeMap<i64, BTreeSet<i64>>,
    communes_by_region: BTreeMap<i64, BTreeSet<i64>>,
}

impl AdminIndex {
    /// Builds the index from complete unit lists.
    ///
    /// A commune referencing an unknown prefecture, or a prefecture
    /// referencing an unknown region, is kept but logged and left
    /// unreachable through the coarser filters.
    #[must_use]
    pub fn build(
        regions: Vec<Region>,
        prefectures: Vec<Prefecture>,
        communes: Vec<Commune>,
    ) -> Self {
        let region_ids: BTreeSet<i64> = regions.iter().map(|r| r.id).collect();
        let prefecture_regions: BTreeMap<i64, i64> =
            prefectures.iter().map(|p| (p.id, p.region_id)).collect();

        let mut index = Self {
            regions: regions.into_iter().map(|r| (r.id, r)).collect(),
            ..Self::default()
        };

        for prefecture in prefectures {
            if region_ids.contains(&prefecture.region_id) {
                index
                    .prefectures_by_region
                    .entry(prefecture.region_id)
                    .or_default()
                    .insert(prefecture.id);
            } else {
                log::warn!(
                    "prefecture {} references unknown region {}",
                    prefecture.id,
                    prefecture.region_id
                );
            }
            index.prefectures.insert(prefecture.id, prefecture);
        }

        for commune in communes {
            if let Some(prefecture_id) = commune.prefecture_id {
                match prefecture_regions.get(&prefecture_id) {
                    Some(region_id) => {
                        index
                            .communes_by_prefecture
                            .entry(prefecture_id)
                            .or_default()
                            .insert(commune.id);
                        if region_ids.contains(region_id) {
                            index
                                .communes_by_region
                                .entry(*region_id)
                                .or_default()
                                .insert(commune.id);
                        }
                    }
                    None => {
                        log::warn!(
                            "commune {} references unknown prefecture {prefecture_id}",
                            commune.id
                        );
                    }
                }
            }
            index.communes.insert(commune.id, commune);
        }

        index
    }

    /// Returns all regions sorted by display name.
    #[must_use]
    pub fn regions(&self) -> Vec<&Region> {
        let mut regions: Vec<&Region> = self.regions.values().collect();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        regions
    }

    /// Returns the prefectures of a region, sorted by display name.
    #[must_use]
    pub fn prefectures_in(&self, region_id: i64) -> Vec<&Prefecture> {
        let mut prefectures: Vec<&Prefecture> = self
            .prefectures_by_region
            .get(&region_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.prefectures.get(id))
            .collect();
        prefectures.sort_by(|a, b| a.name.cmp(&b.name));
        prefectures
    }

    /// Returns the communes of a prefecture, sorted by display name.
    #[must_use]
    pub fn communes_in(&self, prefecture_id: i64) -> Vec<&Commune> {
        let mut communes: Vec<&Commune> = self
            .communes_by_prefecture
            .get(&prefecture_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.communes.get(id))
            .collect();
        communes.sort_by(|a, b| a.name.cmp(&b.name));
        communes
    }

    /// Number of communes in the index.
    #[must_use]
    pub fn commune_count(&self) -> usize {
        self.communes.len()
    }

    /// Looks up a commune by id.
    #[must_use]
    pub fn commune(&self, id: i64) -> Option<&Commune> {
        self.communes.get(&id)
    }

    /// Resolves a geographic filter into the set of communes in scope.
    ///
    /// Only the most specific filter is honored: commune over prefecture
    /// over region. A commune filter is returned as a singleton without an
    /// existence check — an unmatched id simply yields zero features
    /// downstream. An unknown prefecture or region resolves to the empty
    /// set, not to `All`.
    #[must_use]
    pub fn resolve(
        &self,
        region_id: Option<i64>,
        prefecture_id: Option<i64>,
        commune_id: Option<i64>,
    ) -> CommuneFilter {
        if let Some(commune_id) = commune_id {
            CommuneFilter::Ids(BTreeSet::from([commune_id]))
        } else if let Some(prefecture_id) = prefecture_id {
            CommuneFilter::Ids(
                self.communes_by_prefecture
                    .get(&prefecture_id)
                    .cloned()
                    .unwrap_or_default(),
            )
        } else if let Some(region_id) = region_id {
            CommuneFilter::Ids(
                self.communes_by_region
                    .get(&region_id)
                    .cloned()
                    .unwrap_or_default(),
            )
        } else {
            CommuneFilter::All
        }
    }

    /// Resolves raw query-string filter values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError`] when a present value is not a valid
    /// integer. Absent or empty values are treated as "no filter".
    pub fn resolve_raw(
        &self,
        region_id: Option<&str>,
        prefecture_id: Option<&str>,
        commune_id: Option<&str>,
    ) -> Result<CommuneFilter, InvalidFilterError> {
        Ok(self.resolve(
            parse_filter_id("region_id", region_id)?,
            parse_filter_id("prefecture_id", prefecture_id)?,
            parse_filter_id("commune_id", commune_id)?,
        ))
    }
}

fn parse_filter_id(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<i64>, InvalidFilterError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| InvalidFilterError {
            field,
            value: raw.to_string(),
        }),
    }
}
