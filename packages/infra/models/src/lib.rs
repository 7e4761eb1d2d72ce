#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Infrastructure type catalog and survey record types.
//!
//! This crate defines the canonical closed set of surveyed infrastructure
//! kinds used across the entire piste-map system, together with the static
//! per-type descriptors (geometry kind, source coordinate system, date
//! storage shape) that drive aggregation and analytics.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The SRID of the canonical display coordinate system (WGS84).
pub const DISPLAY_SRID: u32 = 4326;

/// The SRID rural road (piste) geometries are surveyed in (UTM zone 28N).
pub const PISTE_SRID: u32 = 32628;

/// Geometry shape a type's records are stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometryKind {
    /// Single surveyed point.
    Point,
    /// Single surveyed line.
    LineString,
    /// One or more surveyed line segments.
    MultiLineString,
    /// Mixed storage; any of the three shapes may appear.
    Any,
}

/// How a type stores its record creation date.
///
/// The survey tooling wrote real timestamps for pistes but free-text
/// `YYYY/MM/DD[ HH:MM:SS[.mmm]]` strings for every other table. This is a
/// domain quirk the analytics path must preserve, not a storage detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateStorage {
    /// Native date-time column.
    Timestamp,
    /// Free-text column in an inconsistent locale format.
    Text,
}

/// One kind of surveyed infrastructure.
///
/// The variant order is the fixed catalog order: aggregated features are
/// always emitted grouped by type in this order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InfrastructureType {
    /// Rural roads (UTM 28N multi-lines with native timestamps).
    Pistes,
    /// Paved road sections.
    Chaussees,
    /// Bridges.
    Ponts,
    /// Culvert pipes.
    Buses,
    /// Box culverts.
    Dalots,
    /// River ferries (mixed geometry storage).
    Bacs,
    /// Submersible crossings.
    PassagesSubmersibles,
    /// Localities.
    Localites,
    /// Schools.
    Ecoles,
    /// Health posts.
    ServicesSantes,
    /// Markets.
    Marches,
    /// Administrative buildings.
    BatimentsAdministratifs,
    /// Water points.
    InfrastructuresHydrauliques,
    /// Anything not fitting the other kinds.
    AutresInfrastructures,
}

impl InfrastructureType {
    /// Returns all variants in catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pistes,
            Self::Chaussees,
            Self::Ponts,
            Self::Buses,
            Self::Dalots,
            Self::Bacs,
            Self::PassagesSubmersibles,
            Self::Localites,
            Self::Ecoles,
            Self::ServicesSantes,
            Self::Marches,
            Self::BatimentsAdministratifs,
            Self::InfrastructuresHydrauliques,
            Self::AutresInfrastructures,
        ]
    }

    /// Returns the geometry shape records of this type are stored as.
    #[must_use]
    pub const fn geometry_kind(self) -> GeometryKind {
        match self {
            Self::Pistes | Self::Chaussees => GeometryKind::MultiLineString,
            Self::Bacs => GeometryKind::Any,
            Self::PassagesSubmersibles => GeometryKind::LineString,
            _ => GeometryKind::Point,
        }
    }

    /// Returns the SRID this type's geometries are stored in.
    ///
    /// Everything was surveyed directly in WGS84 except pistes, which came
    /// from GPS track exports in UTM zone 28N.
    #[must_use]
    pub const fn source_srid(self) -> u32 {
        match self {
            Self::Pistes => PISTE_SRID,
            _ => DISPLAY_SRID,
        }
    }

    /// Returns how this type stores record creation dates.
    #[must_use]
    pub const fn date_storage(self) -> DateStorage {
        match self {
            Self::Pistes => DateStorage::Timestamp,
            _ => DateStorage::Text,
        }
    }

    /// Returns the simplification tolerance applied to line geometries of
    /// this type before coordinate extraction, in source CRS units.
    ///
    /// Pistes carry thousands of GPS vertices per record; the tolerance is
    /// in metres (UTM) for pistes and in degrees for the WGS84 line types.
    #[must_use]
    pub const fn simplify_tolerance(self) -> Option<f64> {
        match self {
            Self::Pistes => Some(0.001),
            Self::Chaussees | Self::Bacs => Some(0.01),
            _ => None,
        }
    }

    /// Returns the human-readable French display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pistes => "Pistes",
            Self::Chaussees => "Chaussées",
            Self::Ponts => "Ponts",
            Self::Buses => "Buses",
            Self::Dalots => "Dalots",
            Self::Bacs => "Bacs",
            Self::PassagesSubmersibles => "Passages submersibles",
            Self::Localites => "Localités",
            Self::Ecoles => "Écoles",
            Self::ServicesSantes => "Services de santé",
            Self::Marches => "Marchés",
            Self::BatimentsAdministratifs => "Bâtiments administratifs",
            Self::InfrastructuresHydrauliques => "Infrastructures hydrauliques",
            Self::AutresInfrastructures => "Autres infrastructures",
        }
    }

    /// Returns the map legend icon name.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Pistes | Self::Chaussees => "road",
            Self::Ponts => "bridge",
            Self::Buses => "bus",
            Self::Dalots | Self::PassagesSubmersibles => "water",
            Self::Bacs => "ship",
            Self::Localites => "home",
            Self::Ecoles => "graduation-cap",
            Self::ServicesSantes => "hospital",
            Self::Marches => "shopping-cart",
            Self::BatimentsAdministratifs => "building",
            Self::InfrastructuresHydrauliques => "tint",
            Self::AutresInfrastructures => "map-pin",
        }
    }

    /// Returns the map legend color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Pistes => "#2C3E50",
            Self::Chaussees => "#8e44ad",
            Self::Ponts => "#9B59B6",
            Self::Buses | Self::ServicesSantes => "#E74C3C",
            Self::Dalots | Self::InfrastructuresHydrauliques => "#3498DB",
            Self::Bacs => "#F39C12",
            Self::PassagesSubmersibles => "#1ABC9C",
            Self::Localites => "#E67E22",
            Self::Ecoles => "#27AE60",
            Self::Marches => "#F1C40F",
            Self::BatimentsAdministratifs => "#34495E",
            Self::AutresInfrastructures => "#95A5A6",
        }
    }

    /// Parses a type from client input, accepting the short aliases older
    /// frontends still send alongside the canonical catalog names.
    #[must_use]
    pub fn from_input(value: &str) -> Option<Self> {
        match value.trim() {
            "sante" => Some(Self::ServicesSantes),
            "administratifs" => Some(Self::BatimentsAdministratifs),
            "hydrauliques" => Some(Self::InfrastructuresHydrauliques),
            "passages" => Some(Self::PassagesSubmersibles),
            "autres" => Some(Self::AutresInfrastructures),
            other => other.parse().ok(),
        }
    }

    /// Resolves a client type filter into catalog types to process.
    ///
    /// Unknown tokens are ignored, aliases are mapped, duplicates are
    /// collapsed, and the result is always in catalog order. An empty
    /// filter means the full catalog.
    #[must_use]
    pub fn resolve_filter<S: AsRef<str>>(tokens: &[S]) -> Vec<Self> {
        if tokens.is_empty() {
            return Self::all().to_vec();
        }
        let requested: std::collections::BTreeSet<Self> = tokens
            .iter()
            .filter_map(|token| Self::from_input(token.as_ref()))
            .collect();
        Self::all()
            .iter()
            .copied()
            .filter(|t| requested.contains(t))
            .collect()
    }
}

/// Creation date of a survey record, in whichever shape it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CreatedAt {
    /// No creation date recorded.
    #[default]
    Missing,
    /// Native date-time column value.
    Timestamp(NaiveDateTime),
    /// Raw free-text column value, unparsed.
    Text(String),
}

/// A generic description of one surveyed asset.
///
/// Read-only for the aggregation and analytics paths; records are created
/// by field data entry, which is outside this system.
#[derive(Debug, Clone, PartialEq)]
pub struct InfrastructureRecord {
    /// Record identifier, unique within its type.
    pub id: i64,
    /// Stored geometry in the type's source SRID, if surveyed.
    pub geometry: Option<geo::Geometry<f64>>,
    /// Owning commune, nullable and allowed to dangle to a deleted commune.
    pub commune_id: Option<i64>,
    /// Creation date in whichever shape the type stores it.
    pub created: CreatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_fourteen_types_in_fixed_order() {
        let all = InfrastructureType::all();
        assert_eq!(all.len(), 14);
        assert_eq!(all[0], InfrastructureType::Pistes);
        assert_eq!(all[13], InfrastructureType::AutresInfrastructures);
    }

    #[test]
    fn catalog_names_round_trip() {
        for t in InfrastructureType::all() {
            let name = t.to_string();
            assert_eq!(InfrastructureType::from_input(&name), Some(*t), "{name}");
        }
        assert_eq!(
            InfrastructureType::PassagesSubmersibles.to_string(),
            "passages_submersibles"
        );
    }

    #[test]
    fn aliases_map_to_canonical_types() {
        assert_eq!(
            InfrastructureType::from_input("sante"),
            Some(InfrastructureType::ServicesSantes)
        );
        assert_eq!(
            InfrastructureType::from_input("passages"),
            Some(InfrastructureType::PassagesSubmersibles)
        );
        assert_eq!(
            InfrastructureType::from_input("autres"),
            Some(InfrastructureType::AutresInfrastructures)
        );
        assert_eq!(InfrastructureType::from_input("unknown_kind"), None);
    }

    #[test]
    fn type_filter_resolves_in_catalog_order() {
        let tokens = ["ecoles", "pistes", "nonsense", "sante", "pistes"];
        assert_eq!(
            InfrastructureType::resolve_filter(&tokens),
            vec![
                InfrastructureType::Pistes,
                InfrastructureType::Ecoles,
                InfrastructureType::ServicesSantes,
            ]
        );
        let none: [&str; 0] = [];
        assert_eq!(
            InfrastructureType::resolve_filter(&none),
            InfrastructureType::all().to_vec()
        );
    }

    #[test]
    fn only_pistes_use_utm_and_timestamps() {
        for t in InfrastructureType::all() {
            if *t == InfrastructureType::Pistes {
                assert_eq!(t.source_srid(), PISTE_SRID);
                assert_eq!(t.date_storage(), DateStorage::Timestamp);
            } else {
                assert_eq!(t.source_srid(), DISPLAY_SRID);
                assert_eq!(t.date_storage(), DateStorage::Text);
            }
        }
    }

    #[test]
    fn line_types_have_simplify_tolerances() {
        assert_eq!(
            InfrastructureType::Pistes.simplify_tolerance(),
            Some(0.001)
        );
        assert_eq!(InfrastructureType::Bacs.simplify_tolerance(), Some(0.01));
        assert_eq!(InfrastructureType::Ponts.simplify_tolerance(), None);
        assert_eq!(
            InfrastructureType::PassagesSubmersibles.simplify_tolerance(),
            None
        );
    }
}
