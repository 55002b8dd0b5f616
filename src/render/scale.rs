//! Value-to-visual scales for the station symbols.

use serde::Serialize;

use crate::model::TimeFilter;

/// Radius range, in pixels, when every trip is shown.
pub const UNFILTERED_RADIUS: (f64, f64) = (0.0, 25.0);

/// Radius range, in pixels, while a time filter is active. Counts are smaller
/// under a filter, so symbols are drawn larger.
pub const FILTERED_RADIUS: (f64, f64) = (3.0, 50.0);

/// Square-root scale from `[0, max]` traffic onto a pixel radius range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    max: f64,
    range: (f64, f64),
}

impl RadiusScale {
    pub fn new(max: u32, range: (f64, f64)) -> Self {
        Self {
            max: max as f64,
            range,
        }
    }

    /// Scale for the given filter state over `[0, max]`.
    pub fn for_filter(max: u32, filter: TimeFilter) -> Self {
        let range = if filter.is_active() {
            FILTERED_RADIUS
        } else {
            UNFILTERED_RADIUS
        };
        Self::new(max, range)
    }

    /// Maps a traffic count to a radius. A zero maximum maps everything to the
    /// bottom of the range.
    pub fn radius(&self, value: u32) -> f64 {
        let (lo, hi) = self.range;
        if self.max <= 0.0 {
            return lo;
        }
        let t = (value as f64).sqrt() / self.max.sqrt();
        lo + (hi - lo) * t
    }
}

/// Three-way quantization of the departure ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowBucket {
    /// Mostly arrivals (ratio below 1/3).
    Arrivals,
    Balanced,
    /// Mostly departures (ratio 2/3 and above).
    Departures,
}

impl FlowBucket {
    /// Quantizes a ratio in `[0, 1]` into equal thirds. Out-of-range values
    /// clamp; `NaN` (a station with no traffic) has no bucket.
    pub fn from_ratio(ratio: f64) -> Option<Self> {
        if ratio.is_nan() {
            return None;
        }
        let bucket = if ratio < 1.0 / 3.0 {
            FlowBucket::Arrivals
        } else if ratio < 2.0 / 3.0 {
            FlowBucket::Balanced
        } else {
            FlowBucket::Departures
        };
        Some(bucket)
    }

    /// Value handed to presentation as the `--departure-ratio` style parameter.
    pub fn value(&self) -> f64 {
        match self {
            FlowBucket::Arrivals => 0.0,
            FlowBucket::Balanced => 0.5,
            FlowBucket::Departures => 1.0,
        }
    }
}
