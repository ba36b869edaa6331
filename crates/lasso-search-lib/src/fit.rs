//! Viewport fit engine
//!
//! Solves for the camera pose (center, fractional zoom) that frames a ring
//! inside the canvas space left over by per-edge insets. The bottom inset
//! models the sliding results panel, so insets are asymmetric in the common
//! case and the center must be bias-corrected toward the unobstructed side;
//! a naive bounding-box center would sit the polygon visually too low
//! whenever the bottom inset exceeds the top one.

use crate::{Ring, WorldProjection};
use geo::{Coord, Point};

/// Visible canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-edge pixel padding between the canvas border and the fitted content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl EdgeInsets {
    /// Same inset on all four edges.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Uniform margin with an extra obstruction below (the results panel).
    pub fn with_bottom_obstruction(margin: f64, obstruction: f64) -> Self {
        Self {
            top: margin,
            right: margin,
            bottom: margin + obstruction,
            left: margin,
        }
    }
}

/// A camera pose framing some content: center coordinate plus a fractional
/// zoom level. Fractional zoom gives exact-fit framing, as opposed to the
/// integer steps of manual zoom controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Map center in (lon, lat) degrees.
    pub center: Point<f64>,
    /// Fractional zoom level.
    pub zoom: f64,
}

/// Compute the camera pose that places the ring's bounding extremes at the
/// inset boundary.
///
/// Vertices are projected to world pixels at `reference_zoom`, the tighter
/// fitting axis picks the scale factor, and the target zoom follows from
/// pixel density doubling per zoom level. Degenerate shapes (zero content
/// extent, no available canvas) fall back to the bounding-box center at the
/// reference zoom rather than erroring.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn fit_ring(
    projection: &impl WorldProjection,
    ring: &Ring,
    canvas: CanvasSize,
    reference_zoom: f64,
    insets: EdgeInsets,
) -> CameraPose {
    // Single O(n) pass over the projected vertices.
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &vertex in ring.vertices() {
        let px = projection.project(vertex, reference_zoom);
        min_x = min_x.min(px.x);
        min_y = min_y.min(px.y);
        max_x = max_x.max(px.x);
        max_y = max_y.max(px.y);
    }

    let content_w = max_x - min_x;
    let content_h = max_y - min_y;
    let midpoint = Coord {
        x: (min_x + max_x) / 2.0,
        y: (min_y + max_y) / 2.0,
    };

    let available_w = canvas.width - insets.left - insets.right;
    let available_h = canvas.height - insets.top - insets.bottom;
    if available_w <= 0.0 || available_h <= 0.0 {
        tracing::debug!(available_w, available_h, "no canvas left inside insets");
        return CameraPose {
            center: projection.unproject(midpoint, reference_zoom),
            zoom: reference_zoom,
        };
    }

    // The tighter-fitting axis wins; a zero-extent axis is unconstrained.
    let scale_x = if content_w > 0.0 {
        available_w / content_w
    } else {
        f64::INFINITY
    };
    let scale_y = if content_h > 0.0 {
        available_h / content_h
    } else {
        f64::INFINITY
    };
    let scale = scale_x.min(scale_y);

    if !scale.is_finite() {
        // Both extents zero: all vertices coincide
        return CameraPose {
            center: projection.unproject(midpoint, reference_zoom),
            zoom: reference_zoom,
        };
    }

    let zoom = reference_zoom + scale.log2();

    // Re-project the midpoint at the target zoom, then shift the visual
    // center toward the side with less padding. Projection and unprojection
    // are always zoom-paired.
    let center_at_reference = projection.unproject(midpoint, reference_zoom);
    let center_px = projection.project(center_at_reference, zoom);
    let offset_px = Coord {
        x: center_px.x + (insets.right - insets.left) / 2.0,
        y: center_px.y + (insets.bottom - insets.top) / 2.0,
    };

    CameraPose {
        center: projection.unproject(offset_px, zoom),
        zoom,
    }
}

/// Clamp a fitted zoom into `[floor, floor + 1)`.
///
/// `floor` is the integer zoom the user drew at, decremented by one when the
/// stroke left the visible canvas. Keeps the auto-fit from zooming out far
/// past the drawing context.
pub fn clamp_to_draw_zoom(pose: CameraPose, floor: f64) -> CameraPose {
    // Upper bound is exclusive
    const BELOW_NEXT_LEVEL: f64 = 1.0 - 1e-9;
    CameraPose {
        zoom: pose.zoom.clamp(floor, floor + BELOW_NEXT_LEVEL),
        ..pose
    }
}
