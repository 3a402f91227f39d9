//! Geodesy helpers used by the fence evaluation.
//!
//! Everything in there is pure and works on plain `f64` degrees, there is no state.
//!
//! - `distance_km()` is the haversine great-circle distance
//! - `point_in_polygon()` is a ray-casting containment test over `(lat, lon)` vertices
//!

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// One nautical mile in kilometers.
pub const NM_IN_KM: f64 = 1.852;

/// Guard against division by zero on horizontal edges.
const EDGE_EPSILON: f64 = 1e-12;

/// Great-circle distance between two points, in kilometers.
///
/// Uses the haversine formula in its `atan2` form which stays well-conditioned for both very
/// close and nearly antipodal points.
///
/// ```
/// use cotwatch_common::distance_km;
///
/// assert_eq!(0., distance_km(50.8, 4.4, 50.8, 4.4));
/// ```
///
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.to_radians().cos()
            * lat2.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Ray-casting containment test.
///
/// `poly` is the list of vertices as `(lat, lon)` pairs, implicitly closed from the last one back
/// to the first.  The ray is cast along the latitude axis at the query longitude, every edge
/// crossing toggles the result.
///
/// NOTE: the `lat`/`lon` roles inside the crossing test are load-bearing, existing fences have
///       been defined against them.  Do not "normalise" to x/y.
///
pub fn point_in_polygon(lat: f64, lon: f64, poly: &[(f64, f64)]) -> bool {
    let mut inside = false;
    if poly.is_empty() {
        return inside;
    }

    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];

        let intersect = ((yi > lon) != (yj > lon))
            && (lat < (xj - xi) * (lon - yi) / (yj - yi + EDGE_EPSILON) + xi);
        if intersect {
            inside = !inside;
        }
        j = i;
    }
    inside
}
