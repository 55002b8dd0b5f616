//! Decorative bike-lane line layers drawn beneath the station symbols.

use serde::{Deserialize, Serialize};

pub const BOSTON_BIKE_NETWORK_URL: &str = "https://bostonopendata-boston.opendata.arcgis.com/datasets/boston::existing-bike-network-2022.geojson";
pub const CAMBRIDGE_BIKE_FACILITIES_URL: &str = "https://raw.githubusercontent.com/cambridgegis/cambridgegis_data/main/Recreation/Bike_Facilities/RECREATION_BikeFacilities.geojson";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePaint {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

impl Default for LinePaint {
    fn default() -> Self {
        Self {
            color: "#32D400".to_string(),
            width: 5.0,
            opacity: 0.6,
        }
    }
}

/// A GeoJSON line source the map engine fetches and draws on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOverlay {
    /// Layer id, e.g. `"bike-lanes"`.
    pub id: String,
    pub source_id: String,
    pub url: String,
    #[serde(default)]
    pub paint: LinePaint,
}

impl LineOverlay {
    pub fn new(id: &str, source_id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            source_id: source_id.to_string(),
            url: url.to_string(),
            paint: LinePaint::default(),
        }
    }
}

/// Boston and Cambridge bike lane layers.
pub fn default_overlays() -> Vec<LineOverlay> {
    vec![
        LineOverlay::new("bike-lanes", "boston_route", BOSTON_BIKE_NETWORK_URL),
        LineOverlay::new("cambridge-lanes", "cambridge_route", CAMBRIDGE_BIKE_FACILITIES_URL),
    ]
}
