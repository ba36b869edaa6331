//! UI panels for the application
//!
//! The results panel is a bottom sheet that slides over the map rather than
//! reserving layout space, because its height doubles as the fit engine's
//! bottom obstruction. Toolbar buttons overlay the top corners of the map.

use crate::app::state::{AppState, PanelDetent, SortKey, TilesProvider};
use egui::{Align2, Color32, RichText, Ui};

/// Render the draw/clear toolbar overlaid on the top-left of the map.
pub fn draw_toolbar(ui: &mut Ui, state: &mut AppState) {
    let margin = 10.0;
    let rect = ui.max_rect();

    egui::Area::new(egui::Id::new("draw_toolbar"))
        .fixed_pos(rect.left_top() + egui::vec2(margin, margin))
        .show(ui.ctx(), |ui| {
            egui::Frame::window(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let capturing = state.draw.read().unwrap().is_capturing();
                    let label = if capturing { "✏ Drawing…" } else { "✏ Draw" };
                    if ui.selectable_label(capturing, label).clicked() {
                        state.toggle_drawing();
                    }

                    let has_ring = state.draw.read().unwrap().ring().is_some();
                    if has_ring && ui.button("🗑 Clear").clicked() {
                        state.clear_drawing();
                    }
                });
            });
        });
}

/// Render the transient status message under the toolbar.
pub fn status_toast(ui: &mut Ui, state: &AppState) {
    if let Some(message) = &state.status {
        egui::Area::new(egui::Id::new("status_toast"))
            .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::window(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new(message).strong());
                });
            });
    }
}

/// Render the bottom-sheet results panel.
///
/// The sheet overlays the map; [`PanelDetent::height`] is what the fit
/// engine sees as the bottom obstruction.
pub fn results_panel(ctx: &egui::Context, state: &mut AppState) {
    let screen = ctx.viewport_rect();
    let height = state
        .panel
        .height(screen.height(), state.ui_settings.panel_peek_height);

    if state.panel == PanelDetent::Hidden {
        return;
    }

    egui::Area::new(egui::Id::new("results_panel"))
        .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Frame::window(ui.style()).show(ui, |ui| {
                ui.set_width(screen.width() - 24.0);
                ui.set_height(height);

                detent_handle(ui, state);
                ui.separator();

                match state.panel {
                    PanelDetent::Peek => results_summary(ui, state),
                    PanelDetent::Half => {
                        results_controls(ui, state);
                        ui.separator();
                        results_list(ui, state);
                        datasets_section(ui, state);
                    }
                    PanelDetent::Hidden => {}
                }
            });
        });
}

/// Detent controls at the top of the sheet.
fn detent_handle(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        let count = state.results.hits.len();
        let title = if state.results.searching {
            "⏳ Searching…".to_string()
        } else if count == 1 {
            "1 place".to_string()
        } else {
            format!("{count} places")
        };
        ui.label(RichText::new(title).strong());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").clicked() {
                state.panel = PanelDetent::Hidden;
            }
            match state.panel {
                PanelDetent::Peek => {
                    if ui.small_button("⏶").clicked() {
                        state.panel = PanelDetent::Half;
                    }
                }
                PanelDetent::Half => {
                    if ui.small_button("⏷").clicked() {
                        state.panel = PanelDetent::Peek;
                    }
                }
                PanelDetent::Hidden => {}
            }
        });
    });
}

/// One-line summary shown in the peek detent.
fn results_summary(ui: &mut Ui, state: &AppState) {
    let top: Vec<&str> = state
        .results
        .hits
        .iter()
        .take(3)
        .map(|hit| hit.place.name.as_str())
        .collect();
    if !top.is_empty() {
        ui.label(top.join("  ·  "));
    } else if state.places_index.read().unwrap().is_empty() {
        ui.label("No place datasets loaded yet.");
    } else {
        ui.label("Nothing inside the lasso. Draw a bigger one?");
    }
}

/// Sort and filter controls.
fn results_controls(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.label("Sort by");
        let mut changed = false;
        egui::ComboBox::from_id_salt("sort_key")
            .selected_text(state.results.sort.name())
            .show_ui(ui, |ui| {
                for &key in SortKey::all() {
                    changed |= ui
                        .selectable_value(&mut state.results.sort, key, key.name())
                        .changed();
                }
            });
        if changed {
            state.sort_results();
        }

        ui.separator();
        ui.label("Filter");
        ui.add(
            egui::TextEdit::singleline(&mut state.results.filter_text)
                .hint_text("name or category")
                .desired_width(160.0),
        );
    });
}

/// Scrollable hit list; clicking selects and highlights the marker.
fn results_list(ui: &mut Ui, state: &mut AppState) {
    let visible = state.visible_hits();
    let available_height = (ui.available_height() - 64.0).max(60.0);

    egui::ScrollArea::vertical()
        .id_salt("results_scroll")
        .max_height(available_height)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for index in visible {
                let hit = &state.results.hits[index];
                let selected = state.results.selected == Some(index);

                let label = format!(
                    "{}  —  {}{}",
                    hit.place.name,
                    format_distance(hit.distance_m),
                    match hit.place.rating {
                        Some(rating) => format!("  ·  ★ {rating:.1}"),
                        None => String::new(),
                    }
                );

                let mut response = ui.selectable_label(selected, label);
                if !hit.place.category.is_empty() {
                    response = response.on_hover_text(&hit.place.category);
                }
                if response.clicked() {
                    state.results.selected = if selected { None } else { Some(index) };
                }
            }
        });
}

/// Loaded datasets, load errors, and the picker button.
fn datasets_section(ui: &mut Ui, state: &mut AppState) {
    egui::CollapsingHeader::new("Datasets")
        .default_open(false)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if ui.button("📂 Load places…").clicked() {
                    state.places_loader.show_picker = true;
                }
                if ui.button("🗑 Clear datasets").clicked() {
                    state.clear_datasets();
                }

                ui.separator();
                ui.label("Tiles");
                egui::ComboBox::from_id_salt("tiles_provider")
                    .selected_text(state.ui_settings.tiles_provider.name())
                    .show_ui(ui, |ui| {
                        for &provider in TilesProvider::all() {
                            ui.selectable_value(
                                &mut state.ui_settings.tiles_provider,
                                provider,
                                provider.name(),
                            );
                        }
                    });
            });

            if state.places_loader.is_busy() {
                ui.label(RichText::new("⏳ Loading datasets…").small());
            }

            let indexed = state.places_index.read().unwrap().len();
            ui.label(RichText::new(format!("{indexed} places indexed")).small());

            for (path, count) in &state.places_loader.loaded_files {
                ui.label(
                    RichText::new(format!(
                        "📄 {} ({count} places)",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    ))
                    .small(),
                );
            }

            if !state.places_loader.errors.is_empty() {
                ui.add_space(4.0);
                for (path, error) in &state.places_loader.errors {
                    ui.label(
                        RichText::new(format!(
                            "• {}: {}",
                            path.file_name().unwrap_or_default().to_string_lossy(),
                            error
                        ))
                        .small()
                        .color(Color32::RED),
                    );
                }
                if ui.button("Clear Errors").clicked() {
                    state.places_loader.errors.clear();
                }
            }
        });
}

/// Show the native file picker when requested.
pub fn show_file_picker(state: &mut AppState) {
    if !state.places_loader.show_picker {
        return;
    }
    state.places_loader.show_picker = false;

    if let Some(paths) = rfd::FileDialog::new()
        .add_filter("Place datasets", &["json"])
        .pick_files()
    {
        for path in paths {
            state.queue_file(path);
        }
    }
}

/// Handle files dropped onto the window.
pub fn handle_drag_and_drop(ctx: &egui::Context, state: &mut AppState) {
    let dropped: Vec<_> = ctx.input(|i| i.raw.dropped_files.clone());
    for file in dropped {
        if let Some(path) = file.path {
            state.queue_file(path);
        }
    }
}

/// Format a distance the way people read it.
fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}
