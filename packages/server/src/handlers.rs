//! HTTP handler functions for the piste map API.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use piste_map_aggregate::FeatureCollectionResult;
use piste_map_analytics_models::{TemporalRequest, TimeGranularity};
use piste_map_geography_models::bounds_center;
use piste_map_infra_models::InfrastructureType;
use piste_map_server_models::{
    ApiHealth, FiltersApplied, GeoCollectionResponse, GeoQueryParams, HierarchyCommune,
    HierarchyPrefecture, HierarchyRegion, HierarchyResponse, TemporalQueryParams, TemporalResponse,
    TypeCatalogEntry, TypeCatalogResponse,
};
use std::collections::BTreeMap;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/collectes-geo`
///
/// Aggregates every requested infrastructure type into one GeoJSON
/// feature collection, restricted to the commune set resolved from the
/// administrative filters. A malformed filter value yields an empty,
/// well-formed collection rather than an error status.
pub async fn collectes_geo(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<GeoQueryParams>,
) -> HttpResponse {
    let types = type_tokens(req.query_string(), params.types.as_deref());
    let filters_applied = FiltersApplied {
        region_id: params.region_id.clone(),
        prefecture_id: params.prefecture_id.clone(),
        commune_id: params.commune_id.clone(),
        types: types.clone(),
    };

    let communes = match state.admin.resolve_raw(
        params.region_id.as_deref(),
        params.prefecture_id.as_deref(),
        params.commune_id.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(e) => {
            log::warn!("Rejecting administrative filter: {e}");
            return HttpResponse::Ok()
                .json(collection_response(FeatureCollectionResult::empty(), filters_applied));
        }
    };

    let result = piste_map_aggregate::aggregate(state.repo.as_ref(), &communes, &types).await;
    for (infra_type, outcome) in &result.outcomes {
        if outcome.fetch_error.is_some() || outcome.errors > 0 {
            log::warn!("Degraded aggregation for {infra_type}: {outcome:?}");
        }
    }

    HttpResponse::Ok().json(collection_response(result, filters_applied))
}

/// `GET /api/analyse-temporelle`
///
/// Buckets collection dates into calendar periods and reports counts,
/// summary metrics, and per-type diagnostics. An unknown `period_type`
/// falls back to monthly bucketing.
pub async fn analyse_temporelle(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<TemporalQueryParams>,
) -> HttpResponse {
    let granularity = params.period_type.as_deref().map_or_else(
        TimeGranularity::default,
        |raw| {
            raw.parse().unwrap_or_else(|_| {
                log::warn!("Unknown period_type {raw:?}, defaulting to month");
                TimeGranularity::default()
            })
        },
    );

    let request = TemporalRequest {
        granularity,
        types: type_tokens(req.query_string(), params.types.as_deref()),
        days_back: params.days_back.unwrap_or(365),
        date_from: params.date_from,
        date_to: params.date_to,
        year: params.year,
        month: params.month,
        day: params.day,
    };

    let report = piste_map_analytics::analyze(state.repo.as_ref(), &request).await;

    HttpResponse::Ok().json(TemporalResponse {
        success: true,
        report,
    })
}

/// `GET /api/hierarchie-geographique`
///
/// Returns the full region > prefecture > commune tree, ordered by name
/// at every level. Each node carries its stored bounding box and its
/// midpoint, which map clients use as zoom targets.
pub async fn hierarchie_geographique(state: web::Data<AppState>) -> HttpResponse {
    let mut total_prefectures = 0;
    let mut total_communes = 0;

    let hierarchy: Vec<HierarchyRegion> = state
        .admin
        .regions()
        .into_iter()
        .map(|region| {
            let prefectures: Vec<HierarchyPrefecture> = state
                .admin
                .prefectures_in(region.id)
                .into_iter()
                .map(|prefecture| {
                    let communes: Vec<HierarchyCommune> = state
                        .admin
                        .communes_in(prefecture.id)
                        .into_iter()
                        .map(|commune| HierarchyCommune {
                            id: commune.id,
                            nom: commune.name.clone(),
                            bounds: commune.bounds,
                            center: commune.bounds.map(bounds_center),
                        })
                        .collect();
                    total_communes += communes.len();
                    HierarchyPrefecture {
                        id: prefecture.id,
                        nom: prefecture.name.clone(),
                        region_id: prefecture.region_id,
                        bounds: prefecture.bounds,
                        center: prefecture.bounds.map(bounds_center),
                        communes,
                    }
                })
                .collect();
            total_prefectures += prefectures.len();
            HierarchyRegion {
                id: region.id,
                nom: region.name.clone(),
                bounds: region.bounds,
                center: region.bounds.map(bounds_center),
                prefectures,
            }
        })
        .collect();

    HttpResponse::Ok().json(HierarchyResponse {
        success: true,
        total_regions: hierarchy.len(),
        total_prefectures,
        total_communes,
        hierarchy,
    })
}

/// `GET /api/types-infrastructures`
///
/// Returns the static infrastructure type catalog with display metadata.
pub async fn types_infrastructures() -> HttpResponse {
    let types: BTreeMap<InfrastructureType, TypeCatalogEntry> = InfrastructureType::all()
        .iter()
        .map(|infra_type| {
            (
                *infra_type,
                TypeCatalogEntry {
                    label: infra_type.label().to_string(),
                    icon: infra_type.icon().to_string(),
                    color: infra_type.color().to_string(),
                },
            )
        })
        .collect();

    HttpResponse::Ok().json(TypeCatalogResponse {
        total: types.len(),
        types,
    })
}

/// Collects infrastructure type tokens from both accepted forms:
/// repeated `types=` query pairs and comma-separated values.
///
/// Empty tokens are kept: an explicit `types=` with no value is a request
/// for no types at all, which is distinct from omitting the parameter
/// (the full catalog).
fn type_tokens(query_string: &str, fallback: Option<&str>) -> Vec<String> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query_string)
        .map(web::Query::into_inner)
        .unwrap_or_else(|_| {
            fallback
                .map(|raw| vec![("types".to_owned(), raw.to_owned())])
                .unwrap_or_default()
        });

    pairs
        .into_iter()
        .filter(|(key, _)| key == "types")
        .flat_map(|(_, value)| {
            value
                .split(',')
                .map(|token| token.trim().to_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn collection_response(
    result: FeatureCollectionResult,
    filters_applied: FiltersApplied,
) -> GeoCollectionResponse {
    GeoCollectionResponse {
        kind: "FeatureCollection",
        total: result.total(),
        features: result.features,
        filters_applied,
        processing_time: format!("{:.2}s", result.processing_time.as_secs_f64()),
        timestamp: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tokens_accept_repeated_and_comma_separated() {
        assert_eq!(
            type_tokens("types=ponts&types=ecoles", None),
            ["ponts", "ecoles"]
        );
        assert_eq!(
            type_tokens("commune_id=5&types=ponts,ecoles", None),
            ["ponts", "ecoles"]
        );
        assert_eq!(
            type_tokens("types=ponts, ecoles ,", None),
            ["ponts", "ecoles", ""]
        );
        assert!(type_tokens("commune_id=5", None).is_empty());
    }

    #[test]
    fn explicit_empty_types_is_not_the_missing_parameter() {
        assert_eq!(type_tokens("types=", None), [""]);
        assert!(type_tokens("", None).is_empty());
    }
}
