//! Core data types shared by the loader, aggregator, filter and renderer.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

/// Minutes in a day; the time-of-day filter works on `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Half-width of the time-of-day window, in minutes.
pub const FILTER_WINDOW_MINUTES: i32 = 60;

/// A docking station as loaded from the station feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    /// Unique short code, e.g. `"A32000"`. Trips refer to stations by this id.
    pub id: String,
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub lat: f64,
    pub lon: f64,
}

/// One rental, with timestamps already parsed.
///
/// A timestamp the feed got wrong is `None`: the trip still counts towards
/// unfiltered traffic but never matches a time-of-day window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
}

impl Trip {
    /// Time of day the trip started, as `hour * 60 + minute`. The date is ignored.
    pub fn start_minute(&self) -> Option<i32> {
        self.started_at.as_ref().map(minute_of_day)
    }

    /// Time of day the trip ended, as `hour * 60 + minute`. The date is ignored.
    pub fn end_minute(&self) -> Option<i32> {
        self.ended_at.as_ref().map(minute_of_day)
    }
}

fn minute_of_day(ts: &NaiveDateTime) -> i32 {
    (ts.hour() * 60 + ts.minute()) as i32
}

/// Per-station counts derived from a trip set.
///
/// Borrows the station it describes; the station itself is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTraffic<'a> {
    pub station: &'a Station,
    pub arrivals: u32,
    pub departures: u32,
}

impl StationTraffic<'_> {
    pub fn total_traffic(&self) -> u32 {
        self.arrivals + self.departures
    }

    /// Share of this station's traffic that is departures. `NaN` when there is no traffic.
    pub fn departure_ratio(&self) -> f64 {
        self.departures as f64 / self.total_traffic() as f64
    }
}

/// Time-of-day filter selected by the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeFilter {
    /// No filtering; every trip counts.
    #[default]
    Any,
    /// Keep trips starting or ending within the window around this minute of day.
    Around(i32),
}

impl TimeFilter {
    /// Slider value used when no filter is selected.
    pub const SLIDER_ANY: i32 = -1;

    /// Interprets a raw slider value. Negative values mean "no filter".
    pub fn from_slider(value: i32) -> Self {
        if value < 0 {
            TimeFilter::Any
        } else {
            TimeFilter::Around(value)
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TimeFilter::Around(_))
    }

    /// Whether a time of day, in minutes, falls inside the window.
    ///
    /// Plain clock-minute arithmetic: there is no wraparound at midnight.
    pub fn contains(&self, minute: i32) -> bool {
        match *self {
            TimeFilter::Any => true,
            TimeFilter::Around(center) => (minute - center).abs() <= FILTER_WINDOW_MINUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 30)
    }

    fn station(id: &str) -> Station {
        Station {
            id: id.to_string(),
            name: None,
            capacity: None,
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn test_trip_minutes_ignore_seconds_and_date() {
        let trip = Trip {
            start_station_id: "A".into(),
            end_station_id: "B".into(),
            started_at: ts(8, 0),
            ended_at: ts(23, 50),
        };
        assert_eq!(trip.start_minute(), Some(480));
        assert_eq!(trip.end_minute(), Some(1430));
    }

    #[test]
    fn test_trip_minutes_missing_timestamp() {
        let trip = Trip {
            start_station_id: "A".into(),
            end_station_id: "B".into(),
            started_at: None,
            ended_at: ts(9, 15),
        };
        assert_eq!(trip.start_minute(), None);
        assert_eq!(trip.end_minute(), Some(555));
    }

    #[test]
    fn test_total_traffic_is_sum() {
        let s = station("A");
        let t = StationTraffic {
            station: &s,
            arrivals: 3,
            departures: 4,
        };
        assert_eq!(t.total_traffic(), 7);
        assert!((t.departure_ratio() - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_departure_ratio_nan_without_traffic() {
        let s = station("A");
        let t = StationTraffic {
            station: &s,
            arrivals: 0,
            departures: 0,
        };
        assert!(t.departure_ratio().is_nan());
    }

    #[test]
    fn test_from_slider() {
        assert_eq!(TimeFilter::from_slider(-1), TimeFilter::Any);
        assert_eq!(TimeFilter::from_slider(-30), TimeFilter::Any);
        assert_eq!(TimeFilter::from_slider(0), TimeFilter::Around(0));
        assert_eq!(TimeFilter::from_slider(1439), TimeFilter::Around(1439));
        assert!(!TimeFilter::Any.is_active());
        assert!(TimeFilter::Around(5).is_active());
    }

    #[test]
    fn test_contains_window_edges() {
        let f = TimeFilter::Around(480);
        assert!(f.contains(420));
        assert!(f.contains(540));
        assert!(!f.contains(419));
        assert!(!f.contains(541));
    }

    #[test]
    fn test_contains_has_no_midnight_wraparound() {
        assert!(!TimeFilter::Around(30).contains(1430));
        assert!(!TimeFilter::Around(1430).contains(30));
    }
}
