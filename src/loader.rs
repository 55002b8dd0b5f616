//! Station and trip feed loading.
//!
//! Stations arrive as a GBFS-style `station_information` JSON document and
//! trips as a CSV export. Both may come from a URL or a local path. A failed
//! load never aborts the program: [`load_dataset`] logs the error and carries
//! on with an empty list for that feed.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::fetch::{HttpClient, read_source};
use crate::model::{Station, Trip};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Deserialize)]
struct StationFeed {
    data: StationFeedData,
}

#[derive(Deserialize)]
struct StationFeedData {
    stations: Vec<RawStation>,
}

#[derive(Deserialize)]
struct RawStation {
    short_name: Option<String>,
    name: Option<String>,
    capacity: Option<u32>,
    lat: Option<Coordinate>,
    lon: Option<Coordinate>,
}

/// Feeds publish coordinates either as numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Coordinate::Number(v) => Some(*v),
            Coordinate::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

#[derive(Deserialize)]
struct RawTrip {
    start_station_id: String,
    end_station_id: String,
    started_at: String,
    ended_at: String,
}

/// Everything the map needs, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub stations: Vec<Station>,
    pub trips: Vec<Trip>,
}

/// Parses a station feed document.
///
/// Records without a short name or a usable coordinate are skipped.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let feed: StationFeed =
        serde_json::from_slice(bytes).context("station feed is not valid JSON")?;

    let total = feed.data.stations.len();
    let stations: Vec<Station> = feed
        .data
        .stations
        .into_iter()
        .filter_map(|raw| {
            let id = raw.short_name.filter(|s| !s.trim().is_empty())?;
            let lat = raw.lat.as_ref().and_then(Coordinate::value)?;
            let lon = raw.lon.as_ref().and_then(Coordinate::value)?;
            Some(Station {
                id,
                name: raw.name,
                capacity: raw.capacity,
                lat,
                lon,
            })
        })
        .collect();

    let skipped = total - stations.len();
    if skipped > 0 {
        warn!(skipped, total, "Skipped station records without id or coordinates");
    }

    Ok(stations)
}

/// Parses a trip CSV export.
///
/// Rows the CSV reader cannot decode are skipped. A timestamp that does not
/// parse is kept as `None` so the trip still counts when no filter is active.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Trip>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers = reader.headers().context("trip feed has no header row")?;
    for column in ["start_station_id", "end_station_id", "started_at", "ended_at"] {
        if !headers.iter().any(|h| h == column) {
            return Err(anyhow!("trip feed is missing column '{column}'"));
        }
    }

    let mut trips = Vec::new();
    let mut skipped = 0usize;
    let mut undated = 0usize;

    for record in reader.deserialize::<RawTrip>() {
        let raw = match record {
            Ok(raw) => raw,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let started_at = parse_timestamp(&raw.started_at).ok();
        let ended_at = parse_timestamp(&raw.ended_at).ok();
        if started_at.is_none() || ended_at.is_none() {
            undated += 1;
        }

        trips.push(Trip {
            start_station_id: raw.start_station_id,
            end_station_id: raw.end_station_id,
            started_at,
            ended_at,
        });
    }

    if skipped > 0 {
        warn!(skipped, loaded = trips.len(), "Skipped malformed trip rows");
    }
    if undated > 0 {
        warn!(undated, "Trips with unparseable timestamps only count when unfiltered");
    }

    Ok(trips)
}

/// Parses a trip timestamp, keeping its wall-clock time.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }

    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.naive_local())
        .map_err(|_| anyhow!("unrecognised timestamp '{text}'"))
}

/// Loads and parses the station feed.
#[tracing::instrument(skip(client))]
pub async fn load_stations<C: HttpClient>(client: &C, source: &str) -> Result<Vec<Station>> {
    let bytes = read_source(client, source).await?;
    let stations = parse_stations(&bytes)?;
    info!(count = stations.len(), "Stations loaded");
    Ok(stations)
}

/// Loads and parses the trip feed.
#[tracing::instrument(skip(client))]
pub async fn load_trips<C: HttpClient>(client: &C, source: &str) -> Result<Vec<Trip>> {
    let bytes = read_source(client, source).await?;
    let trips = parse_trips(&bytes)?;
    info!(count = trips.len(), "Trips loaded");
    Ok(trips)
}

/// Loads both feeds concurrently and waits for both.
///
/// Each feed fails independently: the error is logged and that side of the
/// dataset is left empty. Single attempt, no retries.
pub async fn load_dataset<C: HttpClient>(
    client: &C,
    stations_source: &str,
    trips_source: &str,
) -> Dataset {
    let (stations, trips) = tokio::join!(
        load_stations(client, stations_source),
        load_trips(client, trips_source),
    );

    let stations = stations.unwrap_or_else(|e| {
        error!(source = stations_source, error = %e, "Error loading station feed");
        Vec::new()
    });
    let trips = trips.unwrap_or_else(|e| {
        error!(source = trips_source, error = %e, "Error loading trip feed");
        Vec::new()
    });

    Dataset { stations, trips }
}
