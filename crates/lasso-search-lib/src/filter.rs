//! Exact-shape post-filter for places
//!
//! A places query is bounded by a circle (providers only understand circles),
//! so results must be cut back to the drawn shape. A place survives when it
//! lies inside the ring, or within a small tolerance of the boundary so that
//! storefronts right on the stroke are not dropped.

use crate::Ring;
use crate::geometry::haversine_distance;
use geo::Point;
use rayon::prelude::*;

/// Edge tolerance in meters: places this close to the boundary count as inside.
pub const DEFAULT_EDGE_TOLERANCE_M: f64 = 10.0;

/// A place record from a dataset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    /// Display name.
    pub name: String,
    /// Position in (lon, lat) degrees.
    pub position: Point<f64>,
    /// Free-form category, e.g. "cafe".
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    /// Optional rating on the dataset's own scale.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rating: Option<f32>,
}

/// A place that survived the polygon filter, with its distance from the
/// query centroid for distance sorting.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceHit {
    pub place: Place,
    pub distance_m: f64,
}

/// Cut circle-query results back to the exact drawn shape.
///
/// Runs the containment and boundary-distance tests in parallel; output
/// order follows input order.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn filter_to_ring(ring: &Ring, places: Vec<Place>, edge_tolerance_m: f64) -> Vec<PlaceHit> {
    let anchor = ring.bounding_circle().center;

    let hits: Vec<PlaceHit> = places
        .into_par_iter()
        .filter(|place| {
            ring.contains(place.position)
                || ring.distance_to_boundary(place.position) <= edge_tolerance_m
        })
        .map(|place| {
            let distance_m = haversine_distance(anchor, place.position);
            PlaceHit { place, distance_m }
        })
        .collect();

    tracing::debug!(kept = hits.len(), "polygon post-filter");
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lon: f64, lat: f64) -> Place {
        Place {
            name: name.to_string(),
            position: Point::new(lon, lat),
            category: String::new(),
            rating: None,
        }
    }

    /// ~1km square at the equator.
    fn square_ring() -> Ring {
        Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.009, 0.0),
            Point::new(0.009, 0.009),
            Point::new(0.0, 0.009),
        ])
        .unwrap()
    }

    #[test]
    fn test_keeps_inside_drops_outside() {
        let ring = square_ring();
        let places = vec![
            place("inside", 0.0045, 0.0045),
            place("outside", 0.05, 0.05),
        ];

        let hits = filter_to_ring(&ring, places, DEFAULT_EDGE_TOLERANCE_M);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].place.name, "inside");
    }

    #[test]
    fn test_edge_tolerance_retains_near_boundary() {
        let ring = square_ring();
        // ~5 m outside the eastern edge
        let offset = 5.0 / 111_000.0;
        let places = vec![place("on the kerb", 0.009 + offset, 0.0045)];

        assert_eq!(filter_to_ring(&ring, places.clone(), 10.0).len(), 1);
        assert_eq!(filter_to_ring(&ring, places, 1.0).len(), 0);
    }

    #[test]
    fn test_distance_measured_from_query_centroid() {
        let ring = square_ring();
        let centroid = ring.centroid().unwrap();
        let places = vec![
            place("center", centroid.x(), centroid.y()),
            place("corner-ish", 0.001, 0.001),
        ];

        let hits = filter_to_ring(&ring, places, DEFAULT_EDGE_TOLERANCE_M);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance_m < 1.0);
        assert!(hits[1].distance_m > 100.0);
    }
}
