#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the piste map application.
//!
//! Serves the survey dashboard's REST API: geospatial feature aggregation
//! over the fixed infrastructure catalog and temporal collection
//! analytics. Survey and administrative data are loaded once at startup
//! from JSON snapshots into an in-memory repository.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use piste_map_database::{InfrastructureRepository, snapshot};
use piste_map_geography::AdminIndex;
use std::path::Path;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Infrastructure record store, loaded at startup.
    pub repo: Arc<dyn InfrastructureRepository>,
    /// Administrative hierarchy index, built once at startup.
    pub admin: Arc<AdminIndex>,
}

/// Registers the API routes on an application scope.
fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health))
        .route("/collectes-geo", web::get().to(handlers::collectes_geo))
        .route(
            "/analyse-temporelle",
            web::get().to(handlers::analyse_temporelle),
        )
        .route(
            "/types-infrastructures",
            web::get().to(handlers::types_infrastructures),
        )
        .route(
            "/hierarchie-geographique",
            web::get().to(handlers::hierarchie_geographique),
        )
}

/// Starts the piste map API server.
///
/// Loads the survey snapshot (`SURVEY_DATA`) and the administrative
/// hierarchy snapshot (`ADMIN_DATA`), builds the commune index, and
/// starts the Actix-Web HTTP server. This is a regular async function —
/// the caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if either snapshot file cannot be read or parsed.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let survey_path =
        std::env::var("SURVEY_DATA").unwrap_or_else(|_| "data/collectes.json".to_string());
    let admin_path = std::env::var("ADMIN_DATA").unwrap_or_else(|_| "data/admin.json".to_string());

    log::info!("Loading survey snapshot from {survey_path}...");
    let repo =
        snapshot::load_records(Path::new(&survey_path)).expect("Failed to load survey snapshot");
    log::info!("Loaded {} survey records", repo.len());

    log::info!("Loading administrative snapshot from {admin_path}...");
    let admin = snapshot::load_admin(Path::new(&admin_path))
        .expect("Failed to load administrative snapshot");
    let index = AdminIndex::build(admin.regions, admin.prefectures, admin.communes);

    let state = web::Data::new(AppState {
        repo: Arc::new(repo),
        admin: Arc::new(index),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(api_scope())
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use geo::{Geometry, point};
    use piste_map_database::MemoryRepository;
    use piste_map_geography_models::{Commune, Prefecture, Region};
    use piste_map_infra_models::{CreatedAt, InfrastructureRecord, InfrastructureType};
    use serde_json::Value;

    fn admin_fixture() -> AdminIndex {
        let regions = vec![Region {
            id: 1,
            name: "Kindia".to_owned(),
            bounds: Some([-14.0, 9.0, -12.0, 11.0]),
        }];
        let prefectures = vec![Prefecture {
            id: 10,
            name: "Coyah".to_owned(),
            region_id: 1,
            bounds: Some([-13.5, 9.3, -13.0, 9.9]),
        }];
        let communes = vec![
            Commune {
                id: 12,
                name: "Manéah".to_owned(),
                prefecture_id: Some(10),
                bounds: Some([-13.5, 9.25, -13.0, 9.75]),
            },
            Commune {
                id: 47,
                name: "Wonkifong".to_owned(),
                prefecture_id: Some(10),
                bounds: None,
            },
        ];
        AdminIndex::build(regions, prefectures, communes)
    }

    fn point_record(id: i64, commune_id: Option<i64>, created: CreatedAt) -> InfrastructureRecord {
        InfrastructureRecord {
            id,
            geometry: Some(Geometry::Point(point!(x: -13.3, y: 9.5))),
            commune_id,
            created,
        }
    }

    fn test_state() -> web::Data<AppState> {
        let mut repo = MemoryRepository::new();
        repo.insert(
            InfrastructureType::Ponts,
            point_record(1, Some(12), CreatedAt::Text("2024/01/15".to_owned())),
        );
        repo.insert(
            InfrastructureType::Ponts,
            point_record(2, Some(9), CreatedAt::Text("2024/02/01".to_owned())),
        );
        repo.insert(
            InfrastructureType::Ecoles,
            point_record(3, Some(47), CreatedAt::Text("N/A".to_owned())),
        );
        web::Data::new(AppState {
            repo: Arc::new(repo),
            admin: Arc::new(admin_fixture()),
        })
    }

    async fn get_json(path: &str) -> Value {
        let app =
            test::init_service(App::new().app_data(test_state()).service(api_scope())).await;
        let req = test::TestRequest::get().uri(path).to_request();
        test::call_and_read_body_json(&app, req).await
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let body = get_json("/api/health").await;
        assert_eq!(body["healthy"], Value::Bool(true));
    }

    #[actix_web::test]
    async fn collectes_geo_returns_feature_collection() {
        let body = get_json("/api/collectes-geo?types=ponts").await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["total"], 2);
        assert_eq!(body["filters_applied"]["types"][0], "ponts");
        assert_eq!(body["features"][0]["id"], "ponts_1");
    }

    #[actix_web::test]
    async fn collectes_geo_honors_commune_filter() {
        let body = get_json("/api/collectes-geo?commune_id=12").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["features"][0]["properties"]["commune_id"], 12);
    }

    #[actix_web::test]
    async fn malformed_filter_yields_empty_collection() {
        let body = get_json("/api/collectes-geo?commune_id=abc").await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["total"], 0);
        assert!(body["features"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn explicit_empty_types_yields_empty_collection() {
        let body = get_json("/api/collectes-geo?types=").await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["total"], 0);
        assert!(body["features"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn hierarchie_geographique_returns_named_tree() {
        let body = get_json("/api/hierarchie-geographique").await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["total_regions"], 1);
        assert_eq!(body["total_prefectures"], 1);
        assert_eq!(body["total_communes"], 2);

        let region = &body["hierarchy"][0];
        assert_eq!(region["nom"], "Kindia");
        assert_eq!(region["bounds"][0], -14.0);
        assert_eq!(region["center"][0], -13.0);
        assert_eq!(region["center"][1], 10.0);

        let prefecture = &region["prefectures"][0];
        assert_eq!(prefecture["nom"], "Coyah");
        assert_eq!(prefecture["region_id"], 1);

        let communes = prefecture["communes"].as_array().unwrap();
        assert_eq!(communes.len(), 2);
        assert_eq!(communes[0]["nom"], "Manéah");
        assert_eq!(communes[0]["center"][0], -13.25);
        assert!(communes[1]["center"].is_null());
    }

    #[actix_web::test]
    async fn analyse_temporelle_reports_buckets_and_diagnostics() {
        let body =
            get_json("/api/analyse-temporelle?period_type=month&date_from=2024-01-01&date_to=2024-12-31")
                .await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["data"]["ponts"][0]["period"], "2024-01");
        assert_eq!(body["total_by_period"]["2024-02"], 1);
        assert_eq!(body["metrics"]["total_collectes"], 2);
        assert_eq!(body["debug_details"]["ecoles"]["error_count"], 1);
        assert_eq!(body["period_info"]["type"], "month");
    }

    #[actix_web::test]
    async fn types_infrastructures_lists_full_catalog() {
        let body = get_json("/api/types-infrastructures").await;
        assert_eq!(body["total"], 14);
        assert_eq!(body["types"]["pistes"]["label"], "Pistes");
        assert_eq!(body["types"]["bacs"]["icon"], "ship");
    }
}
