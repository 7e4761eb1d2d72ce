#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Aggregates survey features of many infrastructure types into one
//! GeoJSON `FeatureCollection`.
//!
//! One fetch future per requested type, joined concurrently and merged
//! back in catalog order so the same request always yields the same
//! feature sequence. A type whose fetch fails is recorded in the
//! per-type outcomes and omitted; it never fails the collection.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use futures::future::join_all;
use geojson::{Feature, feature::Id};
use piste_map_database::InfrastructureRepository;
use piste_map_geography::CommuneFilter;
use piste_map_infra_models::{InfrastructureRecord, InfrastructureType};
use serde::Serialize;
use serde_json::{Map, Value};

/// Per-type counters for one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TypeOutcome {
    /// Records returned by the repository for the type.
    pub fetched: u64,
    /// Records that became output features.
    pub rendered: u64,
    /// Records silently skipped (no geometry, or an unrepresentable shape).
    pub skipped: u64,
    /// Records dropped because geometry normalization failed.
    pub errors: u64,
    /// Set when the type's fetch itself failed and the type was omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

/// The outcome of one aggregation request.
#[derive(Debug, Clone)]
pub struct FeatureCollectionResult {
    /// Features in catalog order, repository order within a type.
    pub features: Vec<Feature>,
    /// Wall-clock time spent aggregating.
    pub processing_time: Duration,
    /// Per-type counters, one entry per requested type.
    pub outcomes: BTreeMap<InfrastructureType, TypeOutcome>,
}

impl FeatureCollectionResult {
    /// An empty collection, used when the commune filter excludes everything.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            features: Vec::new(),
            processing_time: Duration::ZERO,
            outcomes: BTreeMap::new(),
        }
    }

    /// Number of features in the collection.
    #[must_use]
    pub fn total(&self) -> usize {
        self.features.len()
    }
}

/// Builds one feature collection from every requested type.
///
/// `types` holds raw client tokens; aliases map to catalog types and
/// unknown tokens are ignored. An empty list means the full catalog. The
/// commune filter applies identically to every type.
pub async fn aggregate(
    repo: &dyn InfrastructureRepository,
    communes: &CommuneFilter,
    types: &[String],
) -> FeatureCollectionResult {
    let started = Instant::now();

    if communes.is_empty() {
        log::debug!("aggregate: commune filter resolves to no communes");
        return FeatureCollectionResult::empty();
    }

    let requested = InfrastructureType::resolve_filter(types);
    let fetches = requested.iter().map(|infra_type| {
        let infra_type = *infra_type;
        async move { (infra_type, repo.fetch(infra_type, communes).await) }
    });
    let fetched = join_all(fetches).await;

    let mut features = Vec::new();
    let mut outcomes = BTreeMap::new();

    for (infra_type, result) in fetched {
        let mut outcome = TypeOutcome::default();
        match result {
            Err(e) => {
                log::error!("aggregate fetch failed for {infra_type}: {e}");
                outcome.fetch_error = Some(e.to_string());
            }
            Ok(records) => {
                outcome.fetched = records.len() as u64;
                for record in &records {
                    match render(infra_type, record) {
                        Rendered::Feature(feature) => {
                            outcome.rendered += 1;
                            features.push(*feature);
                        }
                        Rendered::Skip => outcome.skipped += 1,
                        Rendered::Error => outcome.errors += 1,
                    }
                }
            }
        }
        outcomes.insert(infra_type, outcome);
    }

    let processing_time = started.elapsed();
    log::debug!(
        "aggregate: {} features from {} types in {processing_time:?}",
        features.len(),
        outcomes.len()
    );

    FeatureCollectionResult {
        features,
        processing_time,
        outcomes,
    }
}

enum Rendered {
    Feature(Box<Feature>),
    Skip,
    Error,
}

fn render(infra_type: InfrastructureType, record: &InfrastructureRecord) -> Rendered {
    let Some(geometry) = record.geometry.as_ref() else {
        return Rendered::Skip;
    };
    let normalized = match piste_map_spatial::normalize(
        geometry,
        infra_type.source_srid(),
        infra_type.simplify_tolerance(),
    ) {
        Ok(Some(normalized)) => normalized,
        Ok(None) => return Rendered::Skip,
        Err(e) => {
            log::warn!("skipping {infra_type} record {}: {e}", record.id);
            return Rendered::Error;
        }
    };

    let mut properties = Map::new();
    properties.insert("id".to_owned(), Value::from(record.id));
    properties.insert("type".to_owned(), Value::from(infra_type.to_string()));
    properties.insert(
        "commune_id".to_owned(),
        record.commune_id.map_or(Value::Null, Value::from),
    );

    Rendered::Feature(Box::new(Feature {
        bbox: None,
        geometry: Some(normalized),
        id: Some(Id::String(format!("{infra_type}_{}", record.id))),
        properties: Some(properties),
        foreign_members: None,
    }))
}
