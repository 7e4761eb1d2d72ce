//! Survey snapshot loading.
//!
//! The server binary reads two JSON files at startup: a record snapshot
//! (one entry per surveyed asset, geometry in `GeoJSON` form, creation date
//! as stored) and an administrative snapshot (regions, prefectures,
//! communes). Both are exports of the survey database; the loaders are
//! tolerant of individually bad entries so one malformed record never
//! blocks startup.

use std::path::Path;

use chrono::NaiveDateTime;
use piste_map_geography_models::{Commune, Prefecture, Region};
use piste_map_infra_models::{CreatedAt, DateStorage, InfrastructureRecord, InfrastructureType};
use serde::Deserialize;
use thiserror::Error;

use crate::MemoryRepository;

/// Errors from loading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File could not be read.
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON or does not match the snapshot schema.
    #[error("failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    infra_type: String,
    id: i64,
    commune_id: Option<i64>,
    created_at: Option<String>,
    geometry: Option<geojson::Geometry>,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    records: Vec<RawRecord>,
}

/// The administrative unit export consumed by the hierarchy index.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSnapshot {
    /// All regions.
    pub regions: Vec<Region>,
    /// All prefectures.
    pub prefectures: Vec<Prefecture>,
    /// All communes.
    pub communes: Vec<Commune>,
}

/// Loads the record snapshot at `path` into a [`MemoryRepository`].
///
/// Entries with an unknown type tag or an unconvertible geometry are
/// logged and skipped; they never fail the load.
///
/// # Errors
///
/// Returns [`SnapshotError`] when the file cannot be read or is not a
/// valid snapshot document.
pub fn load_records(path: &Path) -> Result<MemoryRepository, SnapshotError> {
    let raw = std::fs::read_to_string(path)?;
    parse_records(&raw)
}

/// Parses a record snapshot document.
///
/// # Errors
///
/// Returns [`SnapshotError`] when the document is not valid JSON.
pub fn parse_records(raw: &str) -> Result<MemoryRepository, SnapshotError> {
    let snapshot: RawSnapshot = serde_json::from_str(raw)?;
    let mut repo = MemoryRepository::new();
    let mut skipped = 0_usize;

    for entry in snapshot.records {
        let Some(infra_type) = InfrastructureType::from_input(&entry.infra_type) else {
            log::warn!("snapshot record {} has unknown type '{}'", entry.id, entry.infra_type);
            skipped += 1;
            continue;
        };

        let geometry = match entry.geometry {
            None => None,
            Some(g) => match geo::Geometry::<f64>::try_from(g) {
                Ok(geometry) => Some(geometry),
                Err(e) => {
                    log::warn!("snapshot {infra_type} record {} has bad geometry: {e}", entry.id);
                    skipped += 1;
                    continue;
                }
            },
        };

        let created = entry
            .created_at
            .map_or(CreatedAt::Missing, |raw| stored_date(infra_type, raw));

        repo.insert(
            infra_type,
            InfrastructureRecord {
                id: entry.id,
                geometry,
                commune_id: entry.commune_id,
                created,
            },
        );
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} snapshot records");
    }
    log::info!("loaded {} survey records", repo.len());
    Ok(repo)
}

/// Loads the administrative unit snapshot at `path`.
///
/// # Errors
///
/// Returns [`SnapshotError`] when the file cannot be read or parsed.
pub fn load_admin(path: &Path) -> Result<AdminSnapshot, SnapshotError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Interprets a raw stored date according to the type's storage shape.
///
/// Text types keep the raw value untouched — parsing is the analytics
/// path's job, including its rejection rules. Timestamp types are parsed
/// here since the column was a real date-time.
fn stored_date(infra_type: InfrastructureType, raw: String) -> CreatedAt {
    match infra_type.date_storage() {
        DateStorage::Text => CreatedAt::Text(raw),
        DateStorage::Timestamp => parse_timestamp(&raw).map_or_else(
            || {
                log::warn!("unparsable {infra_type} timestamp '{raw}'");
                CreatedAt::Missing
            },
            CreatedAt::Timestamp,
        ),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
