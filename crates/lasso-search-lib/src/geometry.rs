//! Spherical and planar polygon math
//!
//! Pure, total functions over vertex slices. Functions that walk edges assume
//! an explicitly closed boundary (last vertex repeats the first), which is
//! what [`crate::Ring`] guarantees; passing fewer vertices than an operation
//! needs degrades to a neutral value (0, `None`, infinity) instead of
//! panicking. Points follow the `geo` convention of x = longitude,
//! y = latitude, in degrees.

use geo::Point;

/// Mean Earth radius in meters, used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate meters per degree of latitude, used by the locally flattened
/// point-to-segment distance. Valid for short edges only.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Padding factor applied to the bounding-circle radius.
const CIRCLE_PADDING: f64 = 1.1;

/// Provider-imposed cap on the bounding-circle radius, in meters.
const MAX_CIRCLE_RADIUS_M: f64 = 50_000.0;

/// Signed shoelace areas below this threshold are treated as degenerate.
const DEGENERATE_AREA_EPS: f64 = 1e-12;

/// Padded enclosing circle used to bound a places-search query region.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingCircle {
    /// Circle center in (lon, lat) degrees.
    pub center: Point<f64>,
    /// Circle radius in meters, padding and cap already applied.
    pub radius_m: f64,
}

/// Great-circle distance between two points in meters.
///
/// Symmetric, and zero iff the points are equal (antipodal wraparound aside).
#[inline]
pub fn haversine_distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Enclosed area of a closed boundary in square meters.
///
/// Spherical-excess summation over consecutive vertex pairs. Returns 0 for
/// fewer than 3 vertices. Orientation-independent (absolute value).
pub fn polygon_area(vertices: &[Point<f64>]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for pair in vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        sum += (b.x() - a.x()).to_radians()
            * (2.0 + a.y().to_radians().sin() + b.y().to_radians().sin());
    }

    (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Planar centroid of a closed boundary, treating (lon, lat) as Cartesian.
///
/// Valid approximation only for small-extent polygons. Returns `None` when
/// the signed shoelace area is numerically degenerate (collinear or
/// zero-area input).
pub fn polygon_centroid(vertices: &[Point<f64>]) -> Option<Point<f64>> {
    if vertices.len() < 3 {
        return None;
    }

    let mut signed_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;

    for pair in vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let cross = a.x() * b.y() - b.x() * a.y();
        signed_area += cross;
        cx += (a.x() + b.x()) * cross;
        cy += (a.y() + b.y()) * cross;
    }

    signed_area *= 0.5;
    if signed_area.abs() < DEGENERATE_AREA_EPS {
        return None;
    }

    Some(Point::new(
        cx / (6.0 * signed_area),
        cy / (6.0 * signed_area),
    ))
}

/// Even-odd ray-casting containment test.
///
/// Points exactly on an edge are implementation-defined.
pub fn point_in_polygon(point: Point<f64>, vertices: &[Point<f64>]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let (px, py) = (point.x(), point.y());
    let mut inside = false;

    for pair in vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if (a.y() > py) != (b.y() > py) {
            let t = (py - a.y()) / (b.y() - a.y());
            let crossing_x = a.x() + t * (b.x() - a.x());
            if px < crossing_x {
                inside = !inside;
            }
        }
    }

    inside
}

/// Minimum distance from `point` to any edge of a closed boundary, in meters.
///
/// Each edge is measured in a locally flattened frame: longitude compressed
/// by cos(mean latitude of the edge), both axes scaled by the meridian
/// constant. Accurate for the short edges a drawn stroke produces. Returns
/// infinity when no edge exists.
pub fn distance_to_boundary(point: Point<f64>, vertices: &[Point<f64>]) -> f64 {
    let mut min_distance = f64::INFINITY;
    for pair in vertices.windows(2) {
        min_distance = min_distance.min(point_to_segment_m(point, pair[0], pair[1]));
    }
    min_distance
}

/// Point-to-segment distance in the locally flattened frame, in meters.
fn point_to_segment_m(point: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    let lon_scale = ((a.y() + b.y()) / 2.0).to_radians().cos();

    // Flatten relative to `a` so coordinates stay small.
    let vx = (b.x() - a.x()) * lon_scale;
    let vy = b.y() - a.y();
    let wx = (point.x() - a.x()) * lon_scale;
    let wy = point.y() - a.y();

    let len2 = vx * vx + vy * vy;
    let t = if len2 > 0.0 {
        ((wx * vx + wy * vy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let dx = wx - t * vx;
    let dy = wy - t * vy;
    (dx * dx + dy * dy).sqrt() * METERS_PER_DEGREE
}

/// Padded enclosing circle of a closed boundary.
///
/// Center is the planar centroid, falling back to the bounding-box midpoint
/// for degenerate rings. Radius is the maximum haversine distance from the
/// center to any vertex, scaled by a 10% padding factor and capped at the
/// provider maximum.
pub fn bounding_circle(vertices: &[Point<f64>]) -> BoundingCircle {
    let center = polygon_centroid(vertices).unwrap_or_else(|| bounding_box_midpoint(vertices));

    let max_distance = vertices
        .iter()
        .map(|&v| haversine_distance(center, v))
        .fold(0.0, f64::max);

    BoundingCircle {
        center,
        radius_m: (max_distance * CIRCLE_PADDING).min(MAX_CIRCLE_RADIUS_M),
    }
}

/// Midpoint of the axis-aligned bounding box; (0, 0) for an empty slice.
fn bounding_box_midpoint(vertices: &[Point<f64>]) -> Point<f64> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in vertices {
        min_x = min_x.min(p.x());
        min_y = min_y.min(p.y());
        max_x = max_x.max(p.x());
        max_y = max_y.max(p.y());
    }

    if min_x.is_finite() {
        Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
    } else {
        Point::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lon: f64, lat: f64) -> Point<f64> {
        Point::new(lon, lat)
    }

    /// ~1km x ~1km closed square near the equator.
    fn small_square() -> Vec<Point<f64>> {
        vec![
            p(0.0, 0.0),
            p(0.009, 0.0),
            p(0.009, 0.009),
            p(0.0, 0.009),
            p(0.0, 0.0),
        ]
    }

    #[test]
    fn test_haversine_known_distance() {
        // London to Paris, roughly 344 km
        let london = p(-0.1278, 51.5074);
        let paris = p(2.3522, 48.8566);
        let d = haversine_distance(london, paris);
        assert!((d - 344_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        let a = p(13.4, 52.5);
        let b = p(2.35, 48.85);
        assert!((haversine_distance(a, b) - haversine_distance(b, a)).abs() < 1e-9);
        assert_eq!(haversine_distance(a, a), 0.0);
    }

    #[test]
    fn test_area_of_small_square() {
        // 0.009 deg is ~1001 m at the equator, so expect ~1.0 km^2
        let area = polygon_area(&small_square());
        let expected = 1_001.0 * 1_001.0;
        assert!((area - expected).abs() / expected < 0.01, "got {area}");
    }

    #[test]
    fn test_area_invariant_under_rotation_and_reversal() {
        let square = small_square();
        let base = polygon_area(&square);

        // Rotate the vertex list (re-close afterwards)
        let mut rotated: Vec<_> = square[1..4].to_vec();
        rotated.push(square[0]);
        rotated.push(rotated[0]);
        assert!((polygon_area(&rotated) - base).abs() / base < 1e-9);

        // Reverse the winding order
        let reversed: Vec<_> = square.iter().rev().copied().collect();
        assert!((polygon_area(&reversed) - base).abs() / base < 1e-9);
    }

    #[test]
    fn test_area_degenerate_inputs() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[p(0.0, 0.0), p(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn test_centroid_of_square() {
        let c = polygon_centroid(&small_square()).unwrap();
        assert!((c.x() - 0.0045).abs() < 1e-9);
        assert!((c.y() - 0.0045).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_degenerate_is_none() {
        // Collinear "ring" has zero signed area
        let line = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0), p(0.0, 0.0)];
        assert!(polygon_centroid(&line).is_none());
        assert!(polygon_centroid(&[]).is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = small_square();
        assert!(point_in_polygon(p(0.0045, 0.0045), &square));
        assert!(point_in_polygon(p(0.001, 0.008), &square));
        assert!(!point_in_polygon(p(0.02, 0.0045), &square));
        assert!(!point_in_polygon(p(-10.0, 40.0), &square));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U-shape: the notch between the arms is outside
        let u_shape = vec![
            p(0.0, 0.0),
            p(0.03, 0.0),
            p(0.03, 0.03),
            p(0.02, 0.03),
            p(0.02, 0.01),
            p(0.01, 0.01),
            p(0.01, 0.03),
            p(0.0, 0.03),
            p(0.0, 0.0),
        ];
        assert!(point_in_polygon(p(0.005, 0.02), &u_shape)); // left arm
        assert!(point_in_polygon(p(0.025, 0.02), &u_shape)); // right arm
        assert!(!point_in_polygon(p(0.015, 0.02), &u_shape)); // the notch
        assert!(point_in_polygon(p(0.015, 0.005), &u_shape)); // the base
    }

    #[test]
    fn test_distance_to_boundary_at_vertex_is_zero() {
        let square = small_square();
        assert!(distance_to_boundary(square[1], &square) < 1e-6);
    }

    #[test]
    fn test_distance_to_boundary_perpendicular() {
        // Long straight edge along the equator, point 50 m north of it
        let edge = vec![p(0.0, 0.0), p(0.1, 0.0)];
        let offset_deg = 50.0 / METERS_PER_DEGREE;
        let d = distance_to_boundary(p(0.05, offset_deg), &edge);
        assert!((d - 50.0).abs() / 50.0 < 0.01, "got {d}");
    }

    #[test]
    fn test_distance_to_boundary_beyond_endpoint() {
        // Past the end of the segment, distance is to the endpoint itself
        let edge = vec![p(0.0, 0.0), p(0.001, 0.0)];
        let d = distance_to_boundary(p(0.002, 0.0), &edge);
        let expected = 0.001 * METERS_PER_DEGREE;
        assert!((d - expected).abs() / expected < 0.01, "got {d}");
    }

    #[test]
    fn test_distance_to_boundary_no_edges() {
        assert_eq!(distance_to_boundary(p(0.0, 0.0), &[]), f64::INFINITY);
        assert_eq!(
            distance_to_boundary(p(0.0, 0.0), &[p(1.0, 1.0)]),
            f64::INFINITY
        );
    }

    #[test]
    fn test_bounding_circle_radius_padded_and_tight() {
        // All vertices within ~200 m of each other near the equator
        let tiny = vec![
            p(0.0, 0.0),
            p(0.0015, 0.0),
            p(0.0015, 0.0012),
            p(0.0, 0.0012),
            p(0.0, 0.0),
        ];
        let circle = bounding_circle(&tiny);
        assert!(circle.radius_m <= 220.0, "got {}", circle.radius_m);
        assert!(circle.radius_m > 0.0);
    }

    #[test]
    fn test_bounding_circle_caps_radius() {
        // Continent-sized ring saturates at the provider cap
        let huge = vec![
            p(-10.0, 40.0),
            p(10.0, 40.0),
            p(10.0, 55.0),
            p(-10.0, 55.0),
            p(-10.0, 40.0),
        ];
        let circle = bounding_circle(&huge);
        assert_eq!(circle.radius_m, 50_000.0);
    }

    #[test]
    fn test_bounding_circle_degenerate_falls_back_to_bbox() {
        let line = vec![p(0.0, 0.0), p(0.001, 0.001), p(0.002, 0.002), p(0.0, 0.0)];
        let circle = bounding_circle(&line);
        assert!((circle.center.x() - 0.001).abs() < 1e-9);
        assert!((circle.center.y() - 0.001).abs() < 1e-9);
    }
}
