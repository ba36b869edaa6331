use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Lasso Search - draw a freehand polygon on the map and list the places inside it
pub struct Settings {
    /// Place dataset files (JSON) to load on startup
    #[clap(short, long, value_name = "FILE")]
    pub places_files: Vec<PathBuf>,

    /// Initial map latitude
    #[clap(long, default_value = "40.7128", allow_hyphen_values = true)]
    pub start_lat: f64,

    /// Initial map longitude
    #[clap(long, default_value = "-74.0060", allow_hyphen_values = true)]
    pub start_lon: f64,

    /// Initial map zoom level
    #[clap(long, default_value = "12.0")]
    pub start_zoom: f64,

    /// Uniform fit margin around the fitted polygon, in pixels
    #[clap(long, default_value = "24.0")]
    pub fit_margin: f64,

    /// Height of the results panel in its peek detent, in pixels
    #[clap(long, default_value = "120.0")]
    pub panel_peek_height: f32,

    /// Camera flight duration in seconds
    #[clap(long, default_value = "0.8")]
    pub flight_duration: f64,

    /// Boundary tolerance for the polygon post-filter, in meters
    #[clap(long, default_value = "10.0")]
    pub edge_tolerance: f64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse settings from the command line
    pub fn from_cli() -> Self {
        Settings::parse()
    }
}
