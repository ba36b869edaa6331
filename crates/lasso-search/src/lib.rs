//! Lasso Search - Application Library
//!
//! This is the application crate that wires the geometry and viewport-fit
//! engines into an interactive map: freehand polygon drawing, place search
//! inside the drawn shape, and a bottom-sheet results panel.

mod app;

pub use app::LassoSearchApp;
pub use app::settings::Settings;
