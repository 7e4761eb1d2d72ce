#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Administrative unit types.
//!
//! The survey area is divided into three nested levels forming a strict
//! tree: region → prefecture → commune. Records reference communes; the
//! coarser levels only exist to resolve geographic filters.

use serde::{Deserialize, Serialize};

/// WGS84 bounding box `[min_lon, min_lat, max_lon, max_lat]`, used by map
/// clients for automatic zoom. Purely advisory.
pub type Bounds = [f64; 4];

/// Returns the `[lon, lat]` midpoint of a bounding box, the point map
/// clients zoom toward.
#[must_use]
pub fn bounds_center(bounds: Bounds) -> [f64; 2] {
    [bounds[0].midpoint(bounds[2]), bounds[1].midpoint(bounds[3])]
}

/// A top-level administrative region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Database identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Boundary bounding box, if a polygon was digitized.
    pub bounds: Option<Bounds>,
}

/// A prefecture. Every prefecture belongs to exactly one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefecture {
    /// Database identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Parent region.
    pub region_id: i64,
    /// Boundary bounding box, if a polygon was digitized.
    pub bounds: Option<Bounds>,
}

/// A rural commune, the finest-grained unit records are attributed to.
///
/// A commune with no parent prefecture is valid (unassigned) but cannot be
/// reached through a region or prefecture filter — only through a direct
/// commune filter or no filter at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commune {
    /// Database identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Parent prefecture, if assigned.
    pub prefecture_id: Option<i64>,
    /// Boundary bounding box, if a polygon was digitized.
    pub bounds: Option<Bounds>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_center_is_the_box_midpoint() {
        assert_eq!(bounds_center([-14.0, 9.0, -12.0, 11.0]), [-13.0, 10.0]);
        assert_eq!(bounds_center([0.0, 0.0, 0.0, 0.0]), [0.0, 0.0]);
    }
}
