#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geometry normalization for feature aggregation.
//!
//! Converts stored survey geometries (point, line, or multi-line, in WGS84
//! or UTM 28N) into canonical `GeoJSON` geometries for client display.
//! Line geometries are simplified before coordinate extraction to bound
//! response payload size; reprojection only runs when the source SRID
//! actually differs from the display SRID, which matters at per-request
//! volumes of thousands of geometries.

pub mod projection;

use geo::{Coord, Geometry, LineString, MultiLineString, Simplify};
use geojson::Value;
use thiserror::Error;

/// SRID of the canonical display coordinate system (WGS84).
pub const WGS84_SRID: u32 = 4326;

/// SRID of the UTM zone 28N system piste geometries are stored in.
pub const UTM_28N_SRID: u32 = 32628;

/// Errors from normalizing a single geometry.
///
/// These are always recovered per record: the failing record is skipped and
/// counted in diagnostics while its siblings keep processing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The record's source coordinate system has no registered transform.
    #[error("unsupported source SRID {srid}: expected {WGS84_SRID} or {UTM_28N_SRID}")]
    UnsupportedSrid {
        /// The SRID that was requested.
        srid: u32,
    },

    /// A coordinate was NaN or infinite.
    #[error("malformed coordinate ({x}, {y})")]
    MalformedCoordinate {
        /// The x (easting/longitude) value.
        x: f64,
        /// The y (northing/latitude) value.
        y: f64,
    },
}

/// Normalizes one stored geometry into a canonical `GeoJSON` geometry.
///
/// Exactly three shapes are supported: `Point` → `[x, y]`, `LineString` →
/// a list of positions, `MultiLineString` → a list of such lists. Any
/// other shape returns `Ok(None)` (skip, not an error), as does a line
/// geometry that simplifies away to nothing.
///
/// Simplification happens first, in the source CRS, using the caller's
/// per-type tolerance; reprojection to WGS84 follows only when
/// `source_srid` differs from the display SRID.
///
/// # Errors
///
/// Returns [`GeometryError`] for an unsupported source SRID or a
/// non-finite coordinate. Callers treat this as "skip this record".
pub fn normalize(
    geometry: &Geometry<f64>,
    source_srid: u32,
    simplify_tolerance: Option<f64>,
) -> Result<Option<geojson::Geometry>, GeometryError> {
    let value = match geometry {
        Geometry::Point(point) => {
            let position = transform_coord(point.0, source_srid)?;
            Some(Value::Point(position))
        }
        Geometry::LineString(line) => {
            let simplified = simplify_line(line, simplify_tolerance);
            if simplified.0.len() < 2 {
                None
            } else {
                Some(Value::LineString(transform_line(&simplified, source_srid)?))
            }
        }
        Geometry::MultiLineString(multi) => {
            let simplified = simplify_multi(multi, simplify_tolerance);
            let mut lines = Vec::with_capacity(simplified.0.len());
            for line in &simplified.0 {
                if line.0.len() < 2 {
                    continue;
                }
                lines.push(transform_line(line, source_srid)?);
            }
            if lines.is_empty() {
                None
            } else {
                Some(Value::MultiLineString(lines))
            }
        }
        _ => None,
    };

    Ok(value.map(geojson::Geometry::new))
}

fn simplify_line(line: &LineString<f64>, tolerance: Option<f64>) -> LineString<f64> {
    match tolerance {
        Some(epsilon) if line.0.len() > 2 => line.simplify(epsilon),
        _ => line.clone(),
    }
}

fn simplify_multi(multi: &MultiLineString<f64>, tolerance: Option<f64>) -> MultiLineString<f64> {
    match tolerance {
        Some(epsilon) => multi.simplify(epsilon),
        None => multi.clone(),
    }
}

fn transform_line(
    line: &LineString<f64>,
    source_srid: u32,
) -> Result<Vec<Vec<f64>>, GeometryError> {
    line.0
        .iter()
        .map(|coord| transform_coord(*coord, source_srid))
        .collect()
}

fn transform_coord(coord: Coord<f64>, source_srid: u32) -> Result<Vec<f64>, GeometryError> {
    if !coord.x.is_finite() || !coord.y.is_finite() {
        return Err(GeometryError::MalformedCoordinate {
            x: coord.x,
            y: coord.y,
        });
    }

    // Explicit SRID check: same-system geometries pass through untouched.
    if source_srid == WGS84_SRID {
        return Ok(vec![coord.x, coord.y]);
    }

    match source_srid {
        UTM_28N_SRID => {
            let (lon, lat) = projection::utm_to_wgs84(coord.x, coord.y, 28)?;
            Ok(vec![lon, lat])
        }
        srid => Err(GeometryError::UnsupportedSrid { srid }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPoint, Point, Polygon, line_string, point, polygon};

    fn coordinate_count(value: &Value) -> usize {
        match value {
            Value::Point(_) => 1,
            Value::LineString(coords) => coords.len(),
            Value::MultiLineString(lines) => lines.iter().map(Vec::len).sum(),
            _ => 0,
        }
    }

    #[test]
    fn wgs84_point_passes_through_unchanged() {
        let geometry = Geometry::Point(point! { x: -13.5, y: 10.2 });
        let normalized = normalize(&geometry, WGS84_SRID, None).unwrap().unwrap();
        assert_eq!(normalized.value, Value::Point(vec![-13.5, 10.2]));
    }

    #[test]
    fn utm_point_is_reprojected_into_guinea() {
        let geometry = Geometry::Point(Point::new(643_000.0, 1_050_500.0));
        let normalized = normalize(&geometry, UTM_28N_SRID, None).unwrap().unwrap();
        let Value::Point(position) = normalized.value else {
            panic!("expected a point");
        };
        // Guinea spans roughly -16..-6 lon, 6..14 lat.
        assert!(position[0] > -16.0 && position[0] < -6.0, "{position:?}");
        assert!(position[1] > 6.0 && position[1] < 14.0, "{position:?}");
    }

    #[test]
    fn line_string_preserves_order_and_bounds_count() {
        let line = line_string![
            (x: -13.0, y: 9.0),
            (x: -13.1, y: 9.1),
            (x: -13.2, y: 9.2),
            (x: -13.3, y: 9.0),
        ];
        let original = line.0.len();
        let geometry = Geometry::LineString(line);

        let normalized = normalize(&geometry, WGS84_SRID, Some(0.01)).unwrap().unwrap();
        let Value::LineString(coords) = &normalized.value else {
            panic!("expected a line string");
        };
        assert!(coords.len() <= original);
        // Endpoints survive simplification in order.
        assert_eq!(coords.first().unwrap(), &vec![-13.0, 9.0]);
        assert_eq!(coords.last().unwrap(), &vec![-13.3, 9.0]);
    }

    #[test]
    fn collinear_line_simplifies_down_to_endpoints() {
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.000_1),
            (x: 2.0, y: 0.0),
            (x: 3.0, y: 0.000_1),
            (x: 4.0, y: 0.0),
        ];
        let geometry = Geometry::LineString(line);
        let normalized = normalize(&geometry, WGS84_SRID, Some(0.01)).unwrap().unwrap();
        assert_eq!(coordinate_count(&normalized.value), 2);
    }

    #[test]
    fn multi_line_string_keeps_per_line_grouping() {
        let multi = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
            line_string![(x: 2.0, y: 2.0), (x: 3.0, y: 3.0), (x: 4.0, y: 4.0)],
        ]);
        let geometry = Geometry::MultiLineString(multi);
        let normalized = normalize(&geometry, WGS84_SRID, None).unwrap().unwrap();
        let Value::MultiLineString(lines) = &normalized.value else {
            panic!("expected a multi line string");
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 3);
    }

    #[test]
    fn degenerate_line_is_skipped_not_an_error() {
        let geometry = Geometry::LineString(LineString::new(vec![Coord { x: 1.0, y: 1.0 }]));
        assert_eq!(normalize(&geometry, WGS84_SRID, Some(0.01)), Ok(None));
    }

    #[test]
    fn unsupported_shapes_are_skipped() {
        let poly: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ];
        assert_eq!(normalize(&Geometry::Polygon(poly), WGS84_SRID, None), Ok(None));

        let points = MultiPoint::new(vec![Point::new(0.0, 0.0)]);
        assert_eq!(
            normalize(&Geometry::MultiPoint(points), WGS84_SRID, None),
            Ok(None)
        );
    }

    #[test]
    fn malformed_coordinate_is_an_error() {
        let geometry = Geometry::Point(Point::new(f64::NAN, 9.0));
        assert!(matches!(
            normalize(&geometry, WGS84_SRID, None),
            Err(GeometryError::MalformedCoordinate { .. })
        ));
    }

    #[test]
    fn unknown_srid_is_an_error() {
        let geometry = Geometry::Point(Point::new(1.0, 2.0));
        assert_eq!(
            normalize(&geometry, 3857, None),
            Err(GeometryError::UnsupportedSrid { srid: 3857 })
        );
    }
}
