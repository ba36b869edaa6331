//! Place datasets and the in-memory search index
//!
//! Datasets are JSON files holding an array of place records. They stand in
//! for a remote places backend: the index answers the same bounding-circle
//! query a provider would, and the exact-shape filtering happens downstream
//! in the engine crate.

use geo::Point;
use lasso_search_lib::{BoundingCircle, Place, geometry};
use std::path::{Path, PathBuf};

/// One record in a dataset file.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct PlaceRecord {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    rating: Option<f32>,
}

impl From<PlaceRecord> for Place {
    fn from(record: PlaceRecord) -> Self {
        Place {
            name: record.name,
            position: Point::new(record.lon, record.lat),
            category: record.category,
            rating: record.rating,
        }
    }
}

/// Error types for dataset loading
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read and parse a dataset file.
pub fn load_places_file(path: &Path) -> Result<Vec<Place>, DatasetError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let records: Vec<PlaceRecord> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(Place::from).collect())
}

/// In-memory index over all loaded places.
///
/// Linear scan per query; dataset sizes (thousands of places) make anything
/// fancier unnecessary.
#[derive(Clone, Debug, Default)]
pub struct PlacesIndex {
    places: Vec<Place>,
}

#[profiling::all_functions]
impl PlacesIndex {
    /// Append a parsed dataset.
    pub fn add_dataset(&mut self, places: Vec<Place>) {
        self.places.extend(places);
    }

    /// Total number of indexed places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.places.clear();
    }

    /// All places within the circle, the query shape a places provider
    /// understands.
    pub fn search_circle(&self, circle: &BoundingCircle) -> Vec<Place> {
        self.places
            .iter()
            .filter(|place| {
                geometry::haversine_distance(circle.center, place.position) <= circle.radius_m
            })
            .cloned()
            .collect()
    }
}

/// Dataset loading state and per-file errors
pub struct PlacesLoader {
    /// Files pending load
    pub pending_files: Vec<PathBuf>,

    /// Load errors
    pub errors: Vec<(PathBuf, String)>,

    /// Successfully loaded files with their place counts
    pub loaded_files: Vec<(PathBuf, usize)>,

    /// Show file picker dialog
    pub show_picker: bool,
}

impl PlacesLoader {
    pub fn new(pending_files: Vec<PathBuf>) -> Self {
        Self {
            pending_files,
            errors: Vec::new(),
            loaded_files: Vec::new(),
            show_picker: false,
        }
    }

    /// Check if any files are waiting to be processed
    pub fn is_busy(&self) -> bool {
        !self.pending_files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lon: f64, lat: f64) -> Place {
        Place {
            name: name.to_string(),
            position: Point::new(lon, lat),
            category: String::new(),
            rating: None,
        }
    }

    #[test]
    fn test_search_circle() {
        let mut index = PlacesIndex::default();
        index.add_dataset(vec![
            place("near", 0.0005, 0.0),
            place("far", 0.5, 0.5),
        ]);

        let circle = BoundingCircle {
            center: Point::new(0.0, 0.0),
            radius_m: 100.0,
        };
        let found = index.search_circle(&circle);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "near");
    }

    #[test]
    fn test_dataset_parse_defaults() {
        let json = r#"[
            {"name": "Blue Bottle", "lat": 40.72, "lon": -74.0, "category": "cafe", "rating": 4.5},
            {"name": "No Frills", "lat": 40.73, "lon": -74.01}
        ]"#;
        let records: Vec<PlaceRecord> = serde_json::from_str(json).unwrap();
        let places: Vec<Place> = records.into_iter().map(Place::from).collect();

        assert_eq!(places[0].rating, Some(4.5));
        assert_eq!(places[1].category, "");
        assert_eq!(places[1].rating, None);
        assert_eq!(places[1].position.x(), -74.01);
    }
}
