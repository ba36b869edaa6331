//! Lasso Search Library - Polygon Geometry and Viewport Fitting
//!
//! This library provides the engine behind lasso-style place search: the user
//! draws a freehand polygon over a map, and the application lists the places
//! inside it. Everything here is synchronous, allocation-light, and cheap
//! enough to run on every pointer-move event while drawing.
//!
//! # Architecture
//!
//! - **[`Ring`]**: Validated, explicitly closed polygon boundary
//! - **[`geometry`]**: Spherical area, centroid, containment, and distance math
//! - **[`WebMercator`]**: World-pixel projection implementing [`WorldProjection`]
//! - **[`fit_ring`]**: Camera pose solver framing a ring under per-edge insets
//! - **[`filter_to_ring`]**: Exact-shape post-filter for circle-query results
//! - **[`Epoch`]**: Generation counter invalidating stale deferred results
//!
//! # Performance Characteristics
//!
//! - All polygon operations are O(n) in vertex count
//! - Batch place filtering parallelizes over `rayon`

mod epoch;
mod filter;
mod fit;
pub mod geometry;
mod projection;
mod ring;

// Public API exports
pub use epoch::{Epoch, EpochToken};
pub use filter::{DEFAULT_EDGE_TOLERANCE_M, Place, PlaceHit, filter_to_ring};
pub use fit::{CameraPose, CanvasSize, EdgeInsets, clamp_to_draw_zoom, fit_ring};
pub use geometry::BoundingCircle;
pub use projection::{WebMercator, WorldProjection};
pub use ring::Ring;

/// Error types for the engine
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("a ring needs at least 3 distinct vertices, got {0}")]
    RingTooSmall(usize),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
