//! Pure-Rust inverse UTM projection.
//!
//! The only reprojection the survey data ever needs is UTM zone 28N
//! (EPSG:32628, covering Guinea) to WGS84, so the standard inverse
//! Transverse Mercator series on the WGS84 ellipsoid is implemented here
//! directly instead of pulling in a C projection library.

use crate::GeometryError;

/// WGS84 ellipsoid constants.
mod wgs84 {
    /// Semi-major axis (equatorial radius) in metres.
    pub const A: f64 = 6_378_137.0;

    /// Flattening.
    pub const F: f64 = 1.0 / 298.257_223_563;

    /// First eccentricity squared.
    pub const E2: f64 = 2.0 * F - F * F;

    /// Second eccentricity squared.
    pub const EP2: f64 = E2 / (1.0 - E2);
}

/// UTM scale factor at the central meridian.
const K0: f64 = 0.9996;

/// UTM false easting in metres.
const FALSE_EASTING: f64 = 500_000.0;

/// Converts a northern-hemisphere UTM easting/northing to WGS84
/// longitude/latitude in degrees.
///
/// # Errors
///
/// Returns [`GeometryError::MalformedCoordinate`] when either input is not
/// finite.
pub fn utm_to_wgs84(easting: f64, northing: f64, zone: u32) -> Result<(f64, f64), GeometryError> {
    if !easting.is_finite() || !northing.is_finite() {
        return Err(GeometryError::MalformedCoordinate {
            x: easting,
            y: northing,
        });
    }

    let a = wgs84::A;
    let e2 = wgs84::E2;
    let ep2 = wgs84::EP2;

    // Central meridian of the zone, in radians.
    let lon0 = (f64::from(zone - 1).mul_add(6.0, -180.0) + 3.0).to_radians();

    let x = easting - FALSE_EASTING;
    let y = northing;

    // Footprint latitude from the meridian arc length.
    let m = y / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
    let t1 = tan_phi1.powi(2);
    let c1 = ep2 * cos_phi1.powi(2);
    let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                    - 252.0 * ep2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    Ok((lon.to_degrees(), lat.to_degrees()))
}
