use anyhow::{Context, Result};
use serde::Deserialize;

use crate::render::{LineOverlay, Viewport, default_overlays};

pub const DEFAULT_STATIONS_URL: &str = "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";
pub const DEFAULT_TRIPS_URL: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";

/// Feed locations, initial view and decorative layers.
///
/// Stored as JSON on disk; every field is optional:
/// ```json
/// {
///   "stations_url": "data/bluebikes-stations.json",
///   "trips_url": "data/bluebikes-traffic-2024-03.csv",
///   "viewport": { "center": { "lon": -71.09, "lat": 42.36 }, "zoom": 12, "width": 1024, "height": 768 }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub stations_url: String,
    pub trips_url: String,
    pub viewport: Viewport,
    pub overlays: Vec<LineOverlay>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            stations_url: DEFAULT_STATIONS_URL.to_string(),
            trips_url: DEFAULT_TRIPS_URL.to_string(),
            viewport: Viewport::default(),
            overlays: default_overlays(),
        }
    }
}

impl MapConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        let config: MapConfig =
            serde_json::from_str(&content).with_context(|| format!("invalid config in {path}"))?;
        Ok(config)
    }

    /// Applies `STATIONS_URL` and `TRIPS_URL` from the environment, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("STATIONS_URL") {
            self.stations_url = url;
        }
        if let Ok(url) = std::env::var("TRIPS_URL") {
            self.trips_url = url;
        }
        self
    }
}
