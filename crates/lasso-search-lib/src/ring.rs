//! Ring storage and validation
//!
//! A [`Ring`] is the boundary of a user-drawn polygon. Closure is enforced at
//! construction: the stored vertex list always repeats the first vertex at the
//! end, so the geometry functions never have to tolerate both open and closed
//! input. Points follow the `geo` convention of x = longitude, y = latitude.

use crate::{GeometryError, Result};
use geo::{Coord, Point, Rect};

/// A validated, explicitly closed polygon boundary.
///
/// Invariants:
/// - at least 3 pairwise-distinct vertices
/// - the last stored vertex equals the first (explicit closure)
///
/// Rings are immutable once constructed; a new drawing produces a new ring.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ring {
    vertices: Vec<Point<f64>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Ring {
    /// Build a ring from a drawn stroke.
    ///
    /// Accepts both open strokes and strokes that already repeat the first
    /// vertex; the stored boundary is closed either way. Consecutive
    /// duplicate vertices (common with slow pointer movement) are dropped.
    ///
    /// # Errors
    /// [`GeometryError::RingTooSmall`] when fewer than 3 distinct vertices
    /// remain.
    pub fn new(stroke: Vec<Point<f64>>) -> Result<Self> {
        let mut vertices: Vec<Point<f64>> = Vec::with_capacity(stroke.len() + 1);
        for p in stroke {
            if vertices.last() != Some(&p) {
                vertices.push(p);
            }
        }

        // Tolerate pre-closed input once, then close explicitly below.
        if vertices.len() > 1 && vertices.last() == vertices.first() {
            vertices.pop();
        }

        if !has_three_distinct(&vertices) {
            return Err(GeometryError::RingTooSmall(vertices.len()));
        }

        let first = vertices[0];
        vertices.push(first);

        tracing::trace!(vertex_count = vertices.len() - 1, "closed ring");
        Ok(Self { vertices })
    }

    /// The closed vertex list: `len() + 1` entries, last == first.
    #[inline]
    pub fn vertices(&self) -> &[Point<f64>] {
        &self.vertices
    }

    /// Number of distinct vertices (excluding the closing repeat).
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // a ring cannot be constructed empty
    }

    /// Axis-aligned bounding box in (lon, lat) degrees.
    pub fn bounding_box(&self) -> Rect<f64> {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in &self.vertices {
            min_x = min_x.min(p.x());
            min_y = min_y.min(p.y());
            max_x = max_x.max(p.x());
            max_y = max_y.max(p.y());
        }

        Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y })
    }

    /// Enclosed area in square meters.
    pub fn area(&self) -> f64 {
        crate::geometry::polygon_area(&self.vertices)
    }

    /// Planar centroid, or `None` for numerically degenerate rings.
    pub fn centroid(&self) -> Option<Point<f64>> {
        crate::geometry::polygon_centroid(&self.vertices)
    }

    /// Even-odd containment test.
    pub fn contains(&self, point: Point<f64>) -> bool {
        crate::geometry::point_in_polygon(point, &self.vertices)
    }

    /// Minimum distance from `point` to the boundary, in meters.
    pub fn distance_to_boundary(&self, point: Point<f64>) -> f64 {
        crate::geometry::distance_to_boundary(point, &self.vertices)
    }

    /// Padded enclosing circle for bounding a places-search query.
    pub fn bounding_circle(&self) -> crate::BoundingCircle {
        crate::geometry::bounding_circle(&self.vertices)
    }
}

/// True when at least 3 pairwise-distinct vertices exist.
fn has_three_distinct(vertices: &[Point<f64>]) -> bool {
    let Some(&a) = vertices.first() else {
        return false;
    };
    let Some(&b) = vertices.iter().find(|&&p| p != a) else {
        return false;
    };
    vertices.iter().any(|&p| p != a && p != b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lon: f64, lat: f64) -> Point<f64> {
        Point::new(lon, lat)
    }

    #[test]
    fn test_ring_closes_open_stroke() {
        let ring = Ring::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]).unwrap();
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.vertices().len(), 4);
        assert_eq!(ring.vertices().first(), ring.vertices().last());
    }

    #[test]
    fn test_ring_accepts_pre_closed_stroke() {
        let ring = Ring::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 0.0)]).unwrap();
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.vertices().first(), ring.vertices().last());
    }

    #[test]
    fn test_ring_drops_consecutive_duplicates() {
        let ring = Ring::new(vec![
            p(0.0, 0.0),
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 1.0),
        ])
        .unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_ring_rejects_too_few_vertices() {
        assert!(matches!(
            Ring::new(vec![p(0.0, 0.0), p(1.0, 1.0)]),
            Err(GeometryError::RingTooSmall(2))
        ));
        assert!(Ring::new(Vec::new()).is_err());
    }

    #[test]
    fn test_ring_rejects_coincident_vertices() {
        // Two distinct positions drawn many times is still not a polygon
        let result = Ring::new(vec![p(0.0, 0.0), p(1.0, 1.0), p(0.0, 0.0), p(1.0, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bounding_box() {
        let ring = Ring::new(vec![p(-1.0, -2.0), p(3.0, 0.0), p(0.0, 4.0)]).unwrap();
        let bbox = ring.bounding_box();
        assert_eq!(bbox.min().x, -1.0);
        assert_eq!(bbox.min().y, -2.0);
        assert_eq!(bbox.max().x, 3.0);
        assert_eq!(bbox.max().y, 4.0);
    }
}
