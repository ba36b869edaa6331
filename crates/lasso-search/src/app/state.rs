//! Application state management
//!
//! All mutable application state lives in one explicit object passed to the
//! UI handlers; transitions are methods on [`AppState`] rather than scattered
//! flags. The drawing state sits behind a lock because the map plugin also
//! writes to it while a stroke is in progress.

use crate::app::places::{PlacesIndex, PlacesLoader, load_places_file};
use crate::app::settings::Settings;
use geo::Point;
use lasso_search_lib::{
    DEFAULT_EDGE_TOLERANCE_M, Epoch, EpochToken, PlaceHit, Ring, filter_to_ring,
};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Main application state
pub struct AppState {
    /// Drawing state, shared with the map plugin
    pub draw: Arc<RwLock<DrawMode>>,

    /// All loaded places
    pub places_index: Arc<RwLock<PlacesIndex>>,

    /// Dataset loading state
    pub places_loader: PlacesLoader,

    /// Search results and presentation controls
    pub results: ResultsState,

    /// Results panel detent
    pub panel: PanelDetent,

    /// Generation counter; bumped on every full reset
    pub epoch: Epoch,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Transient user-facing status message
    pub status: Option<String>,

    /// Channel carrying finished searches back to the UI thread
    search_tx: mpsc::UnboundedSender<SearchOutcome>,
    search_rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Boundary tolerance for the polygon post-filter, in meters
    pub edge_tolerance_m: f64,

    /// Uniform fit margin in pixels
    pub fit_margin: f64,

    /// Peek detent height in pixels
    pub panel_peek_height: f32,

    /// Camera flight duration in seconds
    pub flight_duration_s: f64,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// Drawing state machine, shared with the map plugin.
///
/// Browse -> Armed -> Drawing -> Finished (plugin side), then the app turns
/// Finished into Complete (valid ring) or back to Armed (stroke too small).
#[derive(Clone, Debug)]
pub enum DrawMode {
    /// Normal map browsing
    Browse,
    /// Draw button pressed, waiting for the stroke to start
    Armed,
    /// Stroke in progress; the plugin appends vertices
    Drawing(DrawCapture),
    /// Stroke ended; pending validation by the app
    Finished(DrawCapture),
    /// A valid ring is on the map
    Complete {
        ring: Ring,
        /// Fit clamp floor: integer zoom at stroke start, minus one if the
        /// stroke left the visible canvas
        zoom_floor: f64,
    },
}

impl DrawMode {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Armed | Self::Drawing(_))
    }

    pub fn ring(&self) -> Option<&Ring> {
        match self {
            Self::Complete { ring, .. } => Some(ring),
            _ => None,
        }
    }
}

/// An in-progress freehand stroke
#[derive(Clone, Debug)]
pub struct DrawCapture {
    /// Captured vertices in (lon, lat) degrees
    pub stroke: Vec<Point<f64>>,

    /// Integer zoom level at stroke start
    pub start_zoom: i32,

    /// Whether any vertex fell outside the visible canvas
    pub left_canvas: bool,
}

impl DrawCapture {
    pub fn new(start_zoom: i32) -> Self {
        Self {
            stroke: Vec::new(),
            start_zoom,
            left_canvas: false,
        }
    }

    /// Fit clamp floor derived from the drawing context.
    pub fn zoom_floor(&self) -> f64 {
        (self.start_zoom - i32::from(self.left_canvas)) as f64
    }
}

/// Results panel detents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelDetent {
    Hidden,
    Peek,
    Half,
}

impl PanelDetent {
    /// Panel height in pixels, which doubles as the fit engine's bottom
    /// obstruction.
    pub fn height(&self, canvas_height: f32, peek_height: f32) -> f32 {
        match self {
            Self::Hidden => 0.0,
            Self::Peek => peek_height,
            Self::Half => canvas_height / 2.0,
        }
    }
}

/// Search results plus presentation controls
#[derive(Default)]
pub struct ResultsState {
    /// Hits surviving the polygon filter, in current sort order
    pub hits: Vec<PlaceHit>,

    /// Current sort key
    pub sort: SortKey,

    /// Case-insensitive name/category filter
    pub filter_text: String,

    /// Selected hit, highlighted on the map
    pub selected: Option<usize>,

    /// Whether a search is in flight
    pub searching: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Distance,
    Name,
    Rating,
}

impl SortKey {
    pub fn all() -> &'static [Self] {
        &[Self::Distance, Self::Name, Self::Rating]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Distance => "Distance",
            Self::Name => "Name",
            Self::Rating => "Rating",
        }
    }
}

/// A finished search travelling back to the UI thread
struct SearchOutcome {
    token: EpochToken,
    hits: Vec<PlaceHit>,
}

#[profiling::all_functions]
impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings) -> Self {
        let (search_tx, search_rx) = mpsc::unbounded_channel();

        Self {
            draw: Arc::new(RwLock::new(DrawMode::Browse)),
            places_index: Arc::new(RwLock::new(PlacesIndex::default())),
            places_loader: PlacesLoader::new(settings.places_files.clone()),
            results: ResultsState::default(),
            panel: PanelDetent::Hidden,
            epoch: Epoch::default(),
            ui_settings: UiSettings {
                tiles_provider: TilesProvider::OpenStreetMap,
                edge_tolerance_m: settings.edge_tolerance,
                fit_margin: settings.fit_margin,
                panel_peek_height: settings.panel_peek_height,
                flight_duration_s: settings.flight_duration,
            },
            status: None,
            search_tx,
            search_rx,
        }
    }

    /// Arm or disarm drawing mode.
    pub fn toggle_drawing(&mut self) {
        let arming = matches!(
            *self.draw.read().unwrap(),
            DrawMode::Browse | DrawMode::Complete { .. }
        );
        if arming {
            // Starting a new lasso is a full reset
            self.reset_search();
            *self.draw.write().unwrap() = DrawMode::Armed;
        } else {
            *self.draw.write().unwrap() = DrawMode::Browse;
        }
    }

    /// Clear the drawn ring and all results.
    pub fn clear_drawing(&mut self) {
        *self.draw.write().unwrap() = DrawMode::Browse;
        self.reset_search();
    }

    /// Full reset of everything derived from a drawn ring. Bumps the epoch
    /// so in-flight camera and search completions are dropped on arrival.
    fn reset_search(&mut self) {
        self.epoch.bump();
        self.results = ResultsState {
            sort: self.results.sort,
            filter_text: std::mem::take(&mut self.results.filter_text),
            ..ResultsState::default()
        };
        self.panel = PanelDetent::Hidden;
        self.status = None;
    }

    /// Validate a finished stroke into a completed ring.
    ///
    /// Returns the ring and its fit clamp floor on success; on failure the
    /// mode returns to `Armed` and a status message is set.
    pub fn finish_stroke(&mut self, capture: DrawCapture) -> Option<(Ring, f64)> {
        let zoom_floor = capture.zoom_floor();
        match Ring::new(capture.stroke) {
            Ok(ring) => {
                tracing::info!(vertices = ring.len(), "lasso completed");
                *self.draw.write().unwrap() = DrawMode::Complete {
                    ring: ring.clone(),
                    zoom_floor,
                };
                Some((ring, zoom_floor))
            }
            Err(e) => {
                tracing::debug!("stroke rejected: {e}");
                self.status = Some("Draw a larger shape (at least 3 points)".to_string());
                *self.draw.write().unwrap() = DrawMode::Armed;
                None
            }
        }
    }

    /// Kick off a places search for `ring` on a background task.
    ///
    /// The result arrives tagged with the current epoch token; stale results
    /// are dropped in [`AppState::process_search_results`].
    pub fn dispatch_search(&mut self, ring: Ring) {
        let token = self.epoch.current();
        let tx = self.search_tx.clone();
        let index = self.places_index.clone();
        let tolerance = self.effective_tolerance();

        self.results.searching = true;

        tokio::task::spawn_blocking(move || {
            profiling::scope!("places_search");

            let circle = ring.bounding_circle();
            let candidates = index.read().unwrap().search_circle(&circle);
            tracing::debug!(
                candidates = candidates.len(),
                radius_m = circle.radius_m,
                "circle query"
            );

            let hits = filter_to_ring(&ring, candidates, tolerance);
            // A dropped receiver just means the app is shutting down
            let _ = tx.send(SearchOutcome { token, hits });
        });
    }

    /// Drain finished searches; stale epochs are ignored. Returns true when
    /// fresh results were applied.
    pub fn process_search_results(&mut self) -> bool {
        let mut applied = false;
        while let Ok(outcome) = self.search_rx.try_recv() {
            if !self.epoch.is_current(outcome.token) {
                tracing::debug!("dropping stale search result");
                continue;
            }
            self.results.hits = outcome.hits;
            self.results.searching = false;
            self.results.selected = None;
            self.sort_results();
            if self.panel == PanelDetent::Hidden {
                self.panel = PanelDetent::Peek;
            }
            applied = true;
        }
        applied
    }

    /// Re-sort hits by the current sort key.
    pub fn sort_results(&mut self) {
        match self.results.sort {
            SortKey::Distance => self
                .results
                .hits
                .sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m)),
            SortKey::Name => self
                .results
                .hits
                .sort_by(|a, b| a.place.name.to_lowercase().cmp(&b.place.name.to_lowercase())),
            SortKey::Rating => self.results.hits.sort_by(|a, b| {
                b.place
                    .rating
                    .unwrap_or(f32::NEG_INFINITY)
                    .total_cmp(&a.place.rating.unwrap_or(f32::NEG_INFINITY))
            }),
        }
        self.results.selected = None;
    }

    /// Indices of hits matching the text filter, in sort order.
    pub fn visible_hits(&self) -> Vec<usize> {
        let needle = self.results.filter_text.trim().to_lowercase();
        self.results
            .hits
            .iter()
            .enumerate()
            .filter(|(_, hit)| {
                needle.is_empty()
                    || hit.place.name.to_lowercase().contains(&needle)
                    || hit.place.category.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Load one pending dataset file, if any. Returns true when a file was
    /// processed (more work may remain).
    pub fn process_pending_files(&mut self) -> bool {
        let Some(path) = self.places_loader.pending_files.pop() else {
            return false;
        };

        match load_places_file(&path) {
            Ok(places) => {
                let count = places.len();
                self.places_index.write().unwrap().add_dataset(places);
                tracing::info!(?path, count, "loaded dataset");
                self.places_loader.loaded_files.push((path, count));
            }
            Err(e) => {
                tracing::warn!(?path, "dataset failed: {e}");
                self.places_loader.errors.push((path, e.to_string()));
            }
        }
        true
    }

    /// Add a file to the pending load queue
    pub fn queue_file(&mut self, path: PathBuf) {
        let already_loaded = self
            .places_loader
            .loaded_files
            .iter()
            .any(|(p, _)| p == &path);
        if !self.places_loader.pending_files.contains(&path) && !already_loaded {
            self.places_loader.pending_files.push(path);
        }
    }

    /// Remove all loaded datasets
    pub fn clear_datasets(&mut self) {
        self.places_index.write().unwrap().clear();
        self.places_loader.loaded_files.clear();
        self.places_loader.errors.clear();
        self.places_loader.pending_files.clear();
    }

    /// Tolerance actually used by searches, falling back to the default for
    /// nonsensical values.
    pub fn effective_tolerance(&self) -> f64 {
        if self.ui_settings.edge_tolerance_m.is_finite() && self.ui_settings.edge_tolerance_m >= 0.0
        {
            self.ui_settings.edge_tolerance_m
        } else {
            DEFAULT_EDGE_TOLERANCE_M
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasso_search_lib::Place;

    fn settings() -> Settings {
        use clap::Parser;
        Settings::parse_from(["lasso-search"])
    }

    fn triangle_stroke() -> Vec<Point<f64>> {
        vec![
            Point::new(-74.0, 40.0),
            Point::new(-74.0, 40.01),
            Point::new(-73.99, 40.0),
        ]
    }

    #[test]
    fn test_finish_stroke_completes_valid_ring() {
        let mut state = AppState::new(&settings());
        let mut capture = DrawCapture::new(12);
        capture.stroke = triangle_stroke();

        let (ring, floor) = state.finish_stroke(capture).unwrap();
        assert_eq!(ring.len(), 3);
        assert_eq!(floor, 12.0);
        assert!(state.draw.read().unwrap().ring().is_some());
    }

    #[test]
    fn test_finish_stroke_rejects_short_stroke() {
        let mut state = AppState::new(&settings());
        let mut capture = DrawCapture::new(12);
        capture.stroke = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];

        assert!(state.finish_stroke(capture).is_none());
        assert!(state.status.is_some());
        assert!(matches!(*state.draw.read().unwrap(), DrawMode::Armed));
    }

    #[test]
    fn test_zoom_floor_decrements_when_stroke_left_canvas() {
        let mut capture = DrawCapture::new(14);
        assert_eq!(capture.zoom_floor(), 14.0);
        capture.left_canvas = true;
        assert_eq!(capture.zoom_floor(), 13.0);
    }

    #[test]
    fn test_stale_search_results_are_dropped() {
        let mut state = AppState::new(&settings());
        let stale = state.epoch.current();
        state
            .search_tx
            .send(SearchOutcome {
                token: stale,
                hits: Vec::new(),
            })
            .unwrap();

        state.epoch.bump();
        assert!(!state.process_search_results());
        assert_eq!(state.panel, PanelDetent::Hidden);
    }

    #[test]
    fn test_fresh_search_results_open_panel() {
        let mut state = AppState::new(&settings());
        state
            .search_tx
            .send(SearchOutcome {
                token: state.epoch.current(),
                hits: Vec::new(),
            })
            .unwrap();

        assert!(state.process_search_results());
        assert_eq!(state.panel, PanelDetent::Peek);
    }

    #[test]
    fn test_sort_and_filter() {
        let mut state = AppState::new(&settings());
        let hit = |name: &str, distance_m: f64, rating: Option<f32>| PlaceHit {
            place: Place {
                name: name.to_string(),
                position: Point::new(0.0, 0.0),
                category: "cafe".to_string(),
                rating,
            },
            distance_m,
        };
        state.results.hits = vec![
            hit("Zelda", 10.0, Some(3.0)),
            hit("Arthur", 30.0, None),
            hit("Morgan", 20.0, Some(4.5)),
        ];

        state.results.sort = SortKey::Name;
        state.sort_results();
        assert_eq!(state.results.hits[0].place.name, "Arthur");

        state.results.sort = SortKey::Rating;
        state.sort_results();
        assert_eq!(state.results.hits[0].place.name, "Morgan");
        assert_eq!(state.results.hits[2].place.name, "Arthur"); // unrated last

        state.results.sort = SortKey::Distance;
        state.sort_results();
        assert_eq!(state.results.hits[0].place.name, "Zelda");

        state.results.filter_text = "mor".to_string();
        assert_eq!(state.visible_hits().len(), 1);
        state.results.filter_text = "cafe".to_string();
        assert_eq!(state.visible_hits().len(), 3);
    }

    #[test]
    fn test_panel_detent_heights() {
        assert_eq!(PanelDetent::Hidden.height(800.0, 120.0), 0.0);
        assert_eq!(PanelDetent::Peek.height(800.0, 120.0), 120.0);
        assert_eq!(PanelDetent::Half.height(800.0, 120.0), 400.0);
    }
}
