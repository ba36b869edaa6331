//! World-pixel projection
//!
//! The fit engine only needs a capability that maps coordinates to world
//! pixels at a given zoom and back, with pixel density doubling per zoom
//! level. [`WebMercator`] is the concrete implementation used by the
//! application; the trait keeps the fit engine testable against any
//! projection with the same contract.

use geo::{Coord, Point};

/// Tile edge length in pixels; the world is one tile wide at zoom 0.
const TILE_SIZE: f64 = 256.0;

/// Maximum latitude representable in Web Mercator.
const MAX_LATITUDE: f64 = 85.05112878;

/// Maps (coordinate, zoom) to world-pixel space and back.
///
/// Contract: `unproject(project(p, z), z) == p` within floating tolerance at
/// any fixed zoom, and doubling the zoom doubles pixel density. Calls must
/// always be zoom-paired; unprojecting at a different zoom than the
/// projection used is a caller bug.
pub trait WorldProjection {
    /// Project a (lon, lat) coordinate to world pixels at `zoom`.
    fn project(&self, position: Point<f64>, zoom: f64) -> Coord<f64>;

    /// Invert [`WorldProjection::project`] at the same `zoom`.
    fn unproject(&self, pixel: Coord<f64>, zoom: f64) -> Point<f64>;
}

/// Standard Web Mercator world-pixel projection (256 px tiles).
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl WorldProjection for WebMercator {
    fn project(&self, position: Point<f64>, zoom: f64) -> Coord<f64> {
        let scale = TILE_SIZE * 2f64.powf(zoom);
        let lat = position.y().clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin_lat = lat.to_radians().sin();

        Coord {
            x: scale * (position.x() / 360.0 + 0.5),
            y: scale
                * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI)),
        }
    }

    fn unproject(&self, pixel: Coord<f64>, zoom: f64) -> Point<f64> {
        let scale = TILE_SIZE * 2f64.powf(zoom);
        let lon = (pixel.x / scale - 0.5) * 360.0;
        let merc_y = std::f64::consts::PI * (1.0 - 2.0 * pixel.y / scale);
        let lat = merc_y.sinh().atan().to_degrees();

        Point::new(lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_origin() {
        // (0, 0) sits at the center of the single zoom-0 tile
        let px = WebMercator.project(Point::new(0.0, 0.0), 0.0);
        assert!((px.x - 128.0).abs() < 1e-9);
        assert!((px.y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip() {
        let sf = Point::new(-122.4194, 37.7749);
        for zoom in [0.0, 3.5, 10.0, 17.25] {
            let px = WebMercator.project(sf, zoom);
            let back = WebMercator.unproject(px, zoom);
            assert!((back.x() - sf.x()).abs() < 1e-9, "zoom {zoom}");
            assert!((back.y() - sf.y()).abs() < 1e-9, "zoom {zoom}");
        }
    }

    #[test]
    fn test_pixel_density_doubles_per_zoom_level() {
        let a = Point::new(-0.1278, 51.5074);
        let b = Point::new(-0.1178, 51.5174);

        let d1 = {
            let (pa, pb) = (WebMercator.project(a, 10.0), WebMercator.project(b, 10.0));
            ((pb.x - pa.x).powi(2) + (pb.y - pa.y).powi(2)).sqrt()
        };
        let d2 = {
            let (pa, pb) = (WebMercator.project(a, 11.0), WebMercator.project(b, 11.0));
            ((pb.x - pa.x).powi(2) + (pb.y - pa.y).powi(2)).sqrt()
        };

        assert!((d2 / d1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_latitude_clamped_to_mercator_range() {
        let pole = WebMercator.project(Point::new(0.0, 90.0), 0.0);
        let clamped = WebMercator.project(Point::new(0.0, MAX_LATITUDE), 0.0);
        assert!((pole.y - clamped.y).abs() < 1e-9);
    }
}
