#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the piste map server.
//!
//! The survey dashboard consumes these shapes as-is, so field names are
//! part of the wire contract and stay in `snake_case` even where the rest
//! of the workspace would prefer otherwise.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use piste_map_analytics_models::TemporalReport;
use piste_map_geography_models::Bounds;
use piste_map_infra_models::InfrastructureType;
use serde::{Deserialize, Serialize};

/// Query parameters for the geospatial aggregation endpoint.
///
/// The id filters stay raw strings: a malformed value yields an empty,
/// well-formed collection rather than a deserialization failure. `types`
/// may also be passed as repeated query pairs; those are collected from
/// the raw query string by the handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoQueryParams {
    /// Region id filter.
    pub region_id: Option<String>,
    /// Prefecture id filter.
    pub prefecture_id: Option<String>,
    /// Commune id filter (wins over prefecture and region).
    pub commune_id: Option<String>,
    /// Comma-separated infrastructure type tokens.
    pub types: Option<String>,
    /// Viewport hint as `west,south,east,north`. Advisory only.
    pub bbox: Option<String>,
    /// Map zoom hint. Advisory only.
    pub zoom: Option<u8>,
}

/// Echo of the filters a geospatial request was served with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersApplied {
    /// Region id as received.
    pub region_id: Option<String>,
    /// Prefecture id as received.
    pub prefecture_id: Option<String>,
    /// Commune id as received.
    pub commune_id: Option<String>,
    /// Type tokens as received.
    pub types: Vec<String>,
}

/// The geospatial aggregation response body.
///
/// GeoJSON-shaped: a `FeatureCollection` with trailing metadata members,
/// which GeoJSON readers are required to ignore.
#[derive(Debug, Clone, Serialize)]
pub struct GeoCollectionResponse {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Aggregated features in catalog order.
    pub features: Vec<geojson::Feature>,
    /// Number of features.
    pub total: usize,
    /// Echo of the request filters.
    pub filters_applied: FiltersApplied,
    /// Server-side duration, formatted as `"<seconds>s"`.
    pub processing_time: String,
    /// RFC 3339 timestamp of when the response was assembled.
    pub timestamp: String,
}

/// Query parameters for the temporal analytics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemporalQueryParams {
    /// Bucketing granularity: `day`, `week`, `month` (default), or `year`.
    pub period_type: Option<String>,
    /// Comma-separated infrastructure type tokens.
    pub types: Option<String>,
    /// Window length ending today, when no explicit range is given.
    pub days_back: Option<i64>,
    /// Explicit window start (ISO date).
    pub date_from: Option<NaiveDate>,
    /// Explicit window end (ISO date).
    pub date_to: Option<NaiveDate>,
    /// Specific-period shortcut: year.
    pub year: Option<i32>,
    /// Specific-period shortcut: month within `year`.
    pub month: Option<u32>,
    /// Specific-period shortcut: day within `year`/`month`.
    pub day: Option<u32>,
}

/// The temporal analytics response body.
#[derive(Debug, Clone, Serialize)]
pub struct TemporalResponse {
    /// Always `true`; request-level failures use an error body instead.
    pub success: bool,
    /// The report fields, inlined at the top level.
    #[serde(flatten)]
    pub report: TemporalReport,
}

/// One entry of the static infrastructure type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCatalogEntry {
    /// French display label.
    pub label: String,
    /// Frontend icon name.
    pub icon: String,
    /// Hex display color.
    pub color: String,
}

/// Response of the infrastructure type catalog endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCatalogResponse {
    /// Catalog entries keyed by type token, in catalog order.
    pub types: BTreeMap<InfrastructureType, TypeCatalogEntry>,
    /// Number of catalog entries.
    pub total: usize,
}

/// A commune node of the administrative hierarchy response.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyCommune {
    /// Commune id.
    pub id: i64,
    /// French display name.
    pub nom: String,
    /// Bounding box as `[minLng, minLat, maxLng, maxLat]`, when known.
    pub bounds: Option<Bounds>,
    /// Zoom target as `[lng, lat]`, when bounds are known.
    pub center: Option<[f64; 2]>,
}

/// A prefecture node of the administrative hierarchy response.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyPrefecture {
    /// Prefecture id.
    pub id: i64,
    /// French display name.
    pub nom: String,
    /// Owning region id.
    pub region_id: i64,
    /// Bounding box as `[minLng, minLat, maxLng, maxLat]`, when known.
    pub bounds: Option<Bounds>,
    /// Zoom target as `[lng, lat]`, when bounds are known.
    pub center: Option<[f64; 2]>,
    /// Child communes, ordered by name.
    pub communes: Vec<HierarchyCommune>,
}

/// A region node of the administrative hierarchy response.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyRegion {
    /// Region id.
    pub id: i64,
    /// French display name.
    pub nom: String,
    /// Bounding box as `[minLng, minLat, maxLng, maxLat]`, when known.
    pub bounds: Option<Bounds>,
    /// Zoom target as `[lng, lat]`, when bounds are known.
    pub center: Option<[f64; 2]>,
    /// Child prefectures, ordered by name.
    pub prefectures: Vec<HierarchyPrefecture>,
}

/// Response of the administrative hierarchy endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyResponse {
    /// Always `true`; request-level failures use an error body instead.
    pub success: bool,
    /// Regions ordered by name, each carrying its full subtree.
    pub hierarchy: Vec<HierarchyRegion>,
    /// Number of regions in the tree.
    pub total_regions: usize,
    /// Number of prefectures in the tree.
    pub total_prefectures: usize,
    /// Number of communes in the tree.
    pub total_communes: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body for request-level failures.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Human-readable failure description.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_response_serializes_as_feature_collection() {
        let response = GeoCollectionResponse {
            kind: "FeatureCollection",
            features: Vec::new(),
            total: 0,
            filters_applied: FiltersApplied {
                commune_id: Some("12".to_owned()),
                ..FiltersApplied::default()
            },
            processing_time: "0.04s".to_owned(),
            timestamp: "2025-01-01T00:00:00+00:00".to_owned(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["filters_applied"]["commune_id"], "12");
        assert!(value["features"].as_array().unwrap().is_empty());
    }

    #[test]
    fn hierarchy_response_nests_nodes_with_french_keys() {
        let response = HierarchyResponse {
            success: true,
            hierarchy: vec![HierarchyRegion {
                id: 1,
                nom: "Kindia".to_owned(),
                bounds: Some([-14.0, 9.0, -12.0, 11.0]),
                center: Some([-13.0, 10.0]),
                prefectures: vec![HierarchyPrefecture {
                    id: 10,
                    nom: "Coyah".to_owned(),
                    region_id: 1,
                    bounds: None,
                    center: None,
                    communes: Vec::new(),
                }],
            }],
            total_regions: 1,
            total_prefectures: 1,
            total_communes: 0,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["hierarchy"][0]["nom"], "Kindia");
        assert_eq!(value["hierarchy"][0]["center"][0], -13.0);
        assert_eq!(value["hierarchy"][0]["prefectures"][0]["region_id"], 1);
        assert_eq!(value["total_communes"], 0);
    }

    #[test]
    fn temporal_query_params_accept_iso_dates() {
        let params: TemporalQueryParams =
            serde_json::from_str(r#"{"period_type": "week", "date_from": "2024-01-15"}"#).unwrap();
        assert_eq!(params.period_type.as_deref(), Some("week"));
        assert_eq!(
            params.date_from,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert!(params.year.is_none());
    }
}
