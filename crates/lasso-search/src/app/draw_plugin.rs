//! Walkers plugin for freehand lasso capture and overlay rendering
//!
//! While drawing is armed the plugin records the pointer trail from the map
//! response, unprojects each position to coordinates, and notes whether the
//! stroke ever left the visible canvas (which lowers the fit clamp floor).
//! It also paints the stroke, the completed ring, and the place markers.

use crate::app::state::{DrawCapture, DrawMode};
use egui::{Color32, Stroke};
use geo::Point;
use std::sync::{Arc, RwLock};
use walkers::{Plugin, Projector};

/// Ring and stroke color (blue)
const STROKE_COLOR: Color32 = Color32::from_rgb(70, 130, 220);
/// Place marker color
const MARKER_COLOR: Color32 = Color32::from_rgb(220, 80, 60);
/// Selected place marker color
const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 160, 40);

/// A place marker to paint this frame
pub struct Marker {
    pub position: Point<f64>,
    pub selected: bool,
}

/// Plugin capturing the lasso stroke and rendering the overlay
pub struct DrawPlugin {
    /// Shared drawing state
    draw: Arc<RwLock<DrawMode>>,
    /// Markers for the current results, rebuilt each frame
    markers: Vec<Marker>,
    /// Stroke line width
    width: f32,
}

impl DrawPlugin {
    pub fn new(draw: Arc<RwLock<DrawMode>>, markers: Vec<Marker>) -> Self {
        Self {
            draw,
            markers,
            width: 2.5,
        }
    }

    /// Advance the capture state machine from this frame's pointer input.
    fn capture(
        &self,
        response: &egui::Response,
        projector: &Projector,
        map_memory: &walkers::MapMemory,
    ) {
        let mut draw = self.draw.write().unwrap();

        match &mut *draw {
            DrawMode::Armed => {
                if response.drag_started() {
                    let mut capture = DrawCapture::new(map_memory.zoom().floor() as i32);
                    if let Some(pos) = response.interact_pointer_pos() {
                        capture
                            .stroke
                            .push(unproject_pos(projector, pos));
                    }
                    tracing::debug!(start_zoom = capture.start_zoom, "stroke started");
                    *draw = DrawMode::Drawing(capture);
                }
            }
            DrawMode::Drawing(capture) => {
                if let Some(pos) = response.interact_pointer_pos() {
                    if response.dragged() {
                        if !response.rect.contains(pos) {
                            capture.left_canvas = true;
                        }
                        let position = unproject_pos(projector, pos);
                        if capture.stroke.last() != Some(&position) {
                            capture.stroke.push(position);
                        }
                    }
                }
                if response.drag_stopped() {
                    let finished = capture.clone();
                    *draw = DrawMode::Finished(finished);
                }
            }
            _ => {}
        }
    }

    /// Paint the stroke or ring overlay.
    fn render_shape(&self, painter: &egui::Painter, projector: &Projector) {
        let draw = self.draw.read().unwrap();
        let stroke = Stroke::new(self.width, STROKE_COLOR);

        match &*draw {
            DrawMode::Drawing(capture) | DrawMode::Finished(capture) => {
                let points = project_all(projector, &capture.stroke);
                if points.len() >= 2 {
                    painter.add(egui::Shape::line(points, stroke));
                }
            }
            DrawMode::Complete { ring, .. } => {
                // The vertex list is explicitly closed; closed_line would
                // double the final segment, so drop the repeat.
                let closed = ring.vertices();
                let points = project_all(projector, &closed[..closed.len() - 1]);
                if points.len() >= 2 {
                    painter.add(egui::Shape::closed_line(points, stroke));
                }
            }
            _ => {}
        }
    }

    /// Paint place markers for the current results.
    fn render_markers(&self, painter: &egui::Painter, projector: &Projector) {
        for marker in &self.markers {
            let screen = project_point(projector, marker.position);
            if marker.selected {
                painter.circle_filled(screen, 7.0, SELECTED_COLOR);
                painter.circle_stroke(screen, 7.0, Stroke::new(1.5, Color32::WHITE));
            } else {
                painter.circle_filled(screen, 5.0, MARKER_COLOR);
                painter.circle_stroke(screen, 5.0, Stroke::new(1.0, Color32::WHITE));
            }
        }
    }
}

impl Plugin for DrawPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("DrawPlugin::run");

        self.capture(response, projector, map_memory);

        let painter = ui.painter();
        self.render_shape(painter, projector);
        self.render_markers(painter, projector);
    }
}

fn unproject_pos(projector: &Projector, pos: egui::Pos2) -> Point<f64> {
    projector.unproject(egui::Vec2::new(pos.x, pos.y))
}

fn project_point(projector: &Projector, position: Point<f64>) -> egui::Pos2 {
    let screen = projector.project(walkers::lat_lon(position.y(), position.x()));
    egui::Pos2::new(screen.x, screen.y)
}

fn project_all(projector: &Projector, positions: &[Point<f64>]) -> Vec<egui::Pos2> {
    positions
        .iter()
        .map(|&p| project_point(projector, p))
        .collect()
}
