//! Per-station arrival and departure counts.

use std::collections::HashMap;

use crate::model::{Station, StationTraffic, Trip};

/// Counts trips per station id, keyed on the departure or arrival side.
fn rollup<'t, I, F>(trips: I, key: F) -> HashMap<&'t str, u32>
where
    I: IntoIterator<Item = &'t Trip>,
    F: Fn(&'t Trip) -> &'t str,
{
    let mut counts = HashMap::new();
    for trip in trips {
        *counts.entry(key(trip)).or_insert(0) += 1;
    }
    counts
}

/// Computes arrivals, departures and total traffic for every station.
///
/// Output preserves input station order, one entry per station. Stations no
/// trip refers to get zero counts; trips referring to unknown stations are
/// not attributed anywhere. The input stations are left untouched, so every
/// call starts from the same baseline regardless of earlier calls.
pub fn aggregate<'s, 't, I>(stations: &'s [Station], trips: I) -> Vec<StationTraffic<'s>>
where
    I: IntoIterator<Item = &'t Trip>,
    I::IntoIter: Clone,
{
    let trips = trips.into_iter();
    let departures = rollup(trips.clone(), |t| t.start_station_id.as_str());
    let arrivals = rollup(trips, |t| t.end_station_id.as_str());

    stations
        .iter()
        .map(|station| StationTraffic {
            station,
            arrivals: arrivals.get(station.id.as_str()).copied().unwrap_or(0),
            departures: departures.get(station.id.as_str()).copied().unwrap_or(0),
        })
        .collect()
}

/// Largest total traffic among `traffic`, or 0 when empty.
pub fn max_total_traffic(traffic: &[StationTraffic<'_>]) -> u32 {
    traffic
        .iter()
        .map(StationTraffic::total_traffic)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(h: u32, m: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
    }

    fn station(id: &str, lat: f64, lon: f64) -> Station {
        Station {
            id: id.to_string(),
            name: None,
            capacity: None,
            lat,
            lon,
        }
    }

    fn trip(start: &str, end: &str) -> Trip {
        Trip {
            start_station_id: start.to_string(),
            end_station_id: end.to_string(),
            started_at: ts(8, 0),
            ended_at: ts(8, 10),
        }
    }

    #[test]
    fn test_aggregate_single_trip() {
        let stations = vec![station("A", 0.0, 0.0), station("B", 1.0, 1.0)];
        let trips = vec![trip("A", "B")];

        let traffic = aggregate(&stations, &trips);

        assert_eq!(traffic[0].station.id, "A");
        assert_eq!(
            (traffic[0].arrivals, traffic[0].departures, traffic[0].total_traffic()),
            (0, 1, 1)
        );
        assert_eq!(traffic[1].station.id, "B");
        assert_eq!(
            (traffic[1].arrivals, traffic[1].departures, traffic[1].total_traffic()),
            (1, 0, 1)
        );
    }

    #[test]
    fn test_aggregate_empty_trips_all_zero() {
        let stations = vec![station("A", 0.0, 0.0), station("B", 1.0, 1.0)];
        let traffic = aggregate(&stations, &Vec::<Trip>::new());

        assert_eq!(traffic.len(), 2);
        for t in &traffic {
            assert_eq!((t.arrivals, t.departures, t.total_traffic()), (0, 0, 0));
        }
        assert_eq!(max_total_traffic(&traffic), 0);
    }

    #[test]
    fn test_aggregate_ignores_unknown_stations() {
        let stations = vec![station("A", 0.0, 0.0)];
        let trips = vec![trip("A", "ZZZ"), trip("ZZZ", "YYY"), trip("YYY", "A")];

        let traffic = aggregate(&stations, &trips);
        assert_eq!(traffic.len(), 1);
        assert_eq!(traffic[0].departures, 1);
        assert_eq!(traffic[0].arrivals, 1);
    }

    #[test]
    fn test_aggregate_round_trip_counts_both_ways() {
        let stations = vec![station("A", 0.0, 0.0)];
        let trips = vec![trip("A", "A"), trip("A", "A")];

        let traffic = aggregate(&stations, &trips);
        assert_eq!(traffic[0].departures, 2);
        assert_eq!(traffic[0].arrivals, 2);
        assert_eq!(traffic[0].total_traffic(), 4);
    }

    #[test]
    fn test_aggregate_preserves_station_order() {
        let stations = vec![
            station("C", 0.0, 0.0),
            station("A", 0.0, 0.0),
            station("B", 0.0, 0.0),
        ];
        let trips = vec![trip("A", "B")];
        let ids: Vec<_> = aggregate(&stations, &trips)
            .iter()
            .map(|t| t.station.id.clone())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_aggregate_repeated_calls_do_not_compound() {
        let stations = vec![station("A", 0.0, 0.0), station("B", 1.0, 1.0)];
        let trips = vec![trip("A", "B"), trip("B", "A"), trip("A", "B")];

        let full = aggregate(&stations, &trips);
        let subset = aggregate(&stations, &trips[..1]);
        let again = aggregate(&stations, &trips);

        assert_eq!(full, again);
        assert_eq!(subset[0].departures, 1);
        assert_eq!(subset[1].arrivals, 1);
        assert_eq!(max_total_traffic(&full), 3);
    }

    #[test]
    fn test_aggregate_accepts_filtered_references() {
        let stations = vec![station("A", 0.0, 0.0), station("B", 1.0, 1.0)];
        let trips = vec![trip("A", "B"), trip("B", "A")];
        let selected: Vec<&Trip> = trips.iter().filter(|t| t.start_station_id == "B").collect();

        let traffic = aggregate(&stations, selected.iter().copied());
        assert_eq!((traffic[0].arrivals, traffic[0].departures), (1, 0));
        assert_eq!((traffic[1].arrivals, traffic[1].departures), (0, 1));
    }
}
