//! Time-of-day trip filtering.

use crate::model::{TimeFilter, Trip};

/// Selects the trips that started or ended within an hour of the filter minute.
///
/// With [`TimeFilter::Any`] every trip is returned, in input order. Minutes
/// are clock minutes with the date discarded, and the comparison does not
/// wrap at midnight: 23:50 is 1400 minutes away from 00:30, not 40. A missing
/// timestamp never falls inside a window.
pub fn filter_by_time(trips: &[Trip], filter: TimeFilter) -> Vec<&Trip> {
    match filter {
        TimeFilter::Any => trips.iter().collect(),
        TimeFilter::Around(_) => trips
            .iter()
            .filter(|trip| {
                let inside = |minute: Option<i32>| minute.is_some_and(|m| filter.contains(m));
                inside(trip.start_minute()) || inside(trip.end_minute())
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip(start: (u32, u32), end: (u32, u32)) -> Trip {
        let day = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        Trip {
            start_station_id: "A".into(),
            end_station_id: "B".into(),
            started_at: day.and_hms_opt(start.0, start.1, 0),
            ended_at: day.and_hms_opt(end.0, end.1, 0),
        }
    }

    #[test]
    fn test_no_filter_is_identity() {
        let trips = vec![trip((8, 0), (8, 10)), trip((23, 50), (0, 5)), trip((12, 0), (13, 0))];
        let selected = filter_by_time(&trips, TimeFilter::from_slider(-1));

        assert_eq!(selected.len(), trips.len());
        for (got, want) in selected.iter().zip(&trips) {
            assert!(std::ptr::eq(*got, want));
        }
    }

    #[test]
    fn test_window_is_inclusive_on_either_end() {
        let trips = vec![
            trip((7, 0), (7, 5)),   // start exactly 60 before
            trip((5, 0), (9, 0)),   // end exactly 60 after
            trip((6, 59), (6, 59)), // 61 before
            trip((9, 1), (9, 30)),  // 61 after
        ];
        let selected = filter_by_time(&trips, TimeFilter::Around(480));

        assert_eq!(selected.len(), 2);
        assert!(std::ptr::eq(selected[0], &trips[0]));
        assert!(std::ptr::eq(selected[1], &trips[1]));
    }

    #[test]
    fn test_no_wraparound_at_midnight() {
        let trips = vec![trip((23, 50), (23, 55))];
        assert!(filter_by_time(&trips, TimeFilter::Around(30)).is_empty());
    }

    #[test]
    fn test_overnight_trip_matches_by_end_time() {
        let trips = vec![trip((23, 50), (0, 20))];
        assert_eq!(filter_by_time(&trips, TimeFilter::Around(30)).len(), 1);
    }

    #[test]
    fn test_date_is_ignored() {
        let mut late = trip((8, 0), (8, 10));
        late.started_at = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0);
        let trips = vec![late];
        assert_eq!(filter_by_time(&trips, TimeFilter::Around(480)).len(), 1);
    }

    #[test]
    fn test_missing_timestamps_only_count_unfiltered() {
        let mut undated = trip((8, 0), (8, 10));
        undated.started_at = None;
        let mut blank = trip((8, 0), (8, 10));
        blank.started_at = None;
        blank.ended_at = None;
        let trips = vec![undated, blank];

        assert_eq!(filter_by_time(&trips, TimeFilter::Any).len(), 2);

        let morning = filter_by_time(&trips, TimeFilter::Around(480));
        assert_eq!(morning.len(), 1);
        assert!(std::ptr::eq(morning[0], &trips[0]));
    }

    #[test]
    fn test_filter_leaves_input_untouched() {
        let trips = vec![trip((8, 0), (8, 10)), trip((18, 0), (18, 10))];
        let before = trips.clone();
        let _ = filter_by_time(&trips, TimeFilter::Around(480));
        assert_eq!(trips, before);
    }
}
