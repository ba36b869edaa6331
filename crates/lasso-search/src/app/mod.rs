//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with the lasso drawing overlay
//! - Bottom-sheet results panel with detents (hidden / peek / half)
//! - Epoch-tagged camera flights framing the drawn polygon
//! - Place dataset loading via CLI, file picker, and drag-and-drop

mod camera;
mod draw_plugin;
mod places;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::camera::{CameraFlight, SettleAction};
use crate::app::draw_plugin::{DrawPlugin, Marker};
use crate::app::settings::Settings;
use crate::app::state::{AppState, DrawMode, PanelDetent, SortKey, TilesProvider};
use eframe::egui;
use lasso_search_lib::{
    CameraPose, CanvasSize, EdgeInsets, Ring, WebMercator, clamp_to_draw_zoom, fit_ring,
};
use walkers::{
    HttpTiles, Map, MapMemory, Position, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

/// Persisted settings (lightweight, no dataset contents)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    tiles_provider: String,
    sort_key: String,
    /// Dataset paths that were loaded (will be reloaded on startup)
    places_file_paths: Vec<String>,
}

/// Main application structure
pub struct LassoSearchApp {
    /// Application state (drawing, places, results, epoch)
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Initial map position, used until the camera detaches
    home: Position,

    /// In-flight camera animation; replaced wholesale by a new fit
    flight: Option<CameraFlight>,

    /// Panel detent at the end of the previous frame, to detect changes
    last_panel: PanelDetent,
}

impl LassoSearchApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let mut state = if !cli_args.ignore_persisted {
            if let Some(storage) = cc.storage {
                Self::load_persisted_settings(storage, &cli_args)
            } else {
                AppState::new(&cli_args)
            }
        } else {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            AppState::new(&cli_args)
        };

        // Add any CLI-specified files to pending (they take priority)
        for file in &cli_args.places_files {
            state.queue_file(file.clone());
        }

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        let _ = map_memory.set_zoom(cli_args.start_zoom);

        tracing::info!(
            pending = state.places_loader.pending_files.len(),
            "initialized"
        );

        Self {
            state,
            tiles_osm,
            tiles_otm,
            map_memory,
            home: walkers::lat_lon(cli_args.start_lat, cli_args.start_lon),
            flight: None,
            last_panel: PanelDetent::Hidden,
        }
    }

    /// Load persisted settings from storage (fast, no dataset contents)
    fn load_persisted_settings(storage: &dyn eframe::Storage, cli_args: &Settings) -> AppState {
        if let Some(json) = storage.get_string("persisted_settings")
            && !json.is_empty()
            && let Ok(persisted) = serde_json::from_str::<PersistedSettings>(&json)
        {
            tracing::info!("Restored settings, will reload datasets");
            return Self::state_from_persisted_settings(persisted, cli_args);
        }

        tracing::info!("No persisted settings found, starting fresh");
        AppState::new(cli_args)
    }

    /// Create AppState from persisted settings
    fn state_from_persisted_settings(persisted: PersistedSettings, cli_args: &Settings) -> AppState {
        let mut state = AppState::new(cli_args);

        state.ui_settings.tiles_provider = match persisted.tiles_provider.as_str() {
            "OpenTopoMap" => TilesProvider::OpenTopoMap,
            _ => TilesProvider::OpenStreetMap,
        };
        state.results.sort = match persisted.sort_key.as_str() {
            "Name" => SortKey::Name,
            "Rating" => SortKey::Rating,
            _ => SortKey::Distance,
        };

        // Queue persisted dataset files for reloading, skipping missing ones
        for path_str in &persisted.places_file_paths {
            let path = std::path::PathBuf::from(path_str);
            if path.exists() {
                state.queue_file(path);
            }
        }

        state
    }

    /// Camera pose the map is currently showing.
    fn current_pose(&self) -> CameraPose {
        let center = self.map_memory.detached().unwrap_or(self.home);
        CameraPose {
            center: geo::Point::new(center.x(), center.y()),
            zoom: self.map_memory.zoom(),
        }
    }

    /// Start (or replace) a flight framing the completed ring under the
    /// current panel obstruction.
    fn start_fit(&mut self, ctx: &egui::Context, on_settle: SettleAction) {
        let (ring, zoom_floor) = {
            let draw = self.state.draw.read().unwrap();
            match &*draw {
                DrawMode::Complete { ring, zoom_floor } => (ring.clone(), *zoom_floor),
                _ => return,
            }
        };

        let viewport = ctx.viewport_rect();
        let canvas = CanvasSize::new(viewport.width() as f64, viewport.height() as f64);
        let obstruction = self.state.panel.height(
            viewport.height(),
            self.state.ui_settings.panel_peek_height,
        ) as f64;
        let insets =
            EdgeInsets::with_bottom_obstruction(self.state.ui_settings.fit_margin, obstruction);

        let pose = fit_ring(
            &WebMercator,
            &ring,
            canvas,
            self.map_memory.zoom(),
            insets,
        );
        let pose = clamp_to_draw_zoom(pose, zoom_floor);

        tracing::debug!(
            zoom = pose.zoom,
            obstruction,
            "starting fit flight"
        );

        self.flight = Some(CameraFlight::new(
            self.current_pose(),
            pose,
            self.state.ui_settings.flight_duration_s,
            self.state.epoch.current(),
            on_settle,
        ));
        ctx.request_repaint();
    }

    /// Advance the in-flight camera animation, if any.
    fn advance_flight(&mut self, ctx: &egui::Context) {
        let Some(flight) = &self.flight else {
            return;
        };

        let (pose, settled) = flight.sample();
        self.map_memory
            .center_at(walkers::lat_lon(pose.center.y(), pose.center.x()));
        let _ = self.map_memory.set_zoom(pose.zoom);

        if settled {
            let flight = self.flight.take().expect("flight checked above");
            // A reset mid-flight makes this completion stale
            if self.state.epoch.is_current(flight.token()) {
                if flight.on_settle() == SettleAction::SearchRing
                    && let Some(ring) = self.completed_ring()
                {
                    self.state.dispatch_search(ring);
                }
            } else {
                tracing::debug!("dropping stale flight completion");
            }
        }
        ctx.request_repaint();
    }

    fn completed_ring(&self) -> Option<Ring> {
        self.state.draw.read().unwrap().ring().cloned()
    }

    /// Markers for the current results, selected hit highlighted.
    fn markers(&self) -> Vec<Marker> {
        self.state
            .results
            .hits
            .iter()
            .enumerate()
            .map(|(i, hit)| Marker {
                position: hit.place.position,
                selected: self.state.results.selected == Some(i),
            })
            .collect()
    }
}

#[profiling::all_functions]
impl eframe::App for LassoSearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::D) && i.modifiers.ctrl {
                self.state.toggle_drawing();
            }
            if i.key_pressed(egui::Key::Escape) {
                self.state.clear_drawing();
            }
        });

        // Dataset plumbing
        ui_panels::handle_drag_and_drop(ctx, &mut self.state);
        ui_panels::show_file_picker(&mut self.state);
        if self.state.process_pending_files() {
            ctx.request_repaint();
        }

        // Finished searches (stale epochs dropped inside)
        self.state.process_search_results();

        // Smoothly apply any in-flight camera animation
        self.advance_flight(ctx);

        let capturing = self.state.draw.read().unwrap().is_capturing();
        let draw_shared = self.state.draw.clone();
        let markers = self.markers();
        let attribution_text = self.state.ui_settings.tiles_provider.attribution();

        // Central panel: full-screen map with the drawing overlay
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match self.state.ui_settings.tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let drag_pan_buttons = if capturing {
                    egui::DragPanButtons::empty()
                } else {
                    egui::DragPanButtons::PRIMARY
                };
                let map = Map::new(Some(tiles), &mut self.map_memory, self.home)
                    .drag_pan_buttons(drag_pan_buttons)
                    .with_plugin(DrawPlugin::new(draw_shared, markers));

                ui.add(map);

                ui_panels::draw_toolbar(ui, &mut self.state);
                ui_panels::status_toast(ui, &self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // A finished stroke becomes a ring, a fit flight, and a search
        let finished = {
            let mut draw = self.state.draw.write().unwrap();
            if let DrawMode::Finished(capture) = &*draw {
                let capture = capture.clone();
                *draw = DrawMode::Browse; // placeholder until validation
                Some(capture)
            } else {
                None
            }
        };
        if let Some(capture) = finished
            && self.state.finish_stroke(capture).is_some()
        {
            self.start_fit(ctx, SettleAction::SearchRing);
        }

        // The results panel overlays the map; its height is the fit
        // engine's bottom obstruction
        ui_panels::results_panel(ctx, &mut self.state);

        // A detent change moves the obstruction, so re-frame the ring
        if self.state.panel != self.last_panel {
            self.last_panel = self.state.panel;
            self.start_fit(ctx, SettleAction::None);
        }

        // Keep animating while a flight or a drawing gesture is active
        if self.flight.is_some() || capturing {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        // Save settings only (no dataset contents - fast).
        // Include pending files too so nothing is lost if the app closes
        // before they load.
        let mut places_file_paths: Vec<String> = self
            .state
            .places_loader
            .loaded_files
            .iter()
            .map(|(path, _)| path.to_string_lossy().to_string())
            .collect();

        for path in &self.state.places_loader.pending_files {
            let path_str = path.to_string_lossy().to_string();
            if !places_file_paths.contains(&path_str) {
                places_file_paths.push(path_str);
            }
        }

        let persisted = PersistedSettings {
            tiles_provider: format!("{:?}", self.state.ui_settings.tiles_provider),
            sort_key: format!("{:?}", self.state.results.sort),
            places_file_paths,
        };

        if let Ok(json) = serde_json::to_string(&persisted) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
