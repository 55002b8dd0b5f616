//! Event handling for the slider and the map viewport.
//!
//! [`MapController`] owns the loaded data and the current view state. Each
//! event runs the whole pipeline synchronously (filter, aggregate, build
//! symbols) before returning, so a returned [`Frame`] never shows counts from
//! an earlier filter.

use chrono::NaiveTime;
use serde::Serialize;
use tracing::debug;

use crate::filter::filter_by_time;
use crate::loader::Dataset;
use crate::model::{MINUTES_PER_DAY, TimeFilter};
use crate::render::{
    LineOverlay, RadiusScale, Reconciliation, SymbolSet, Viewport, ViewportEvent, build_symbols,
    reconcile, reposition,
};
use crate::traffic::{aggregate, max_total_traffic};

/// Formats a minute of day as a 12-hour clock time, e.g. `"8:05 PM"`.
///
/// Minutes past the end of the day roll over into the next one.
pub fn format_time(minutes: i32) -> String {
    let seconds = (minutes.rem_euclid(MINUTES_PER_DAY) * 60) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .map(|t| t.format("%-I:%M %p").to_string())
        .unwrap_or_default()
}

/// Text shown next to the slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeLabel {
    pub text: String,
    /// Whether the "(any time)" hint is displayed.
    pub any_time_visible: bool,
}

impl TimeLabel {
    pub fn for_filter(filter: TimeFilter) -> Self {
        match filter {
            TimeFilter::Any => Self {
                text: String::new(),
                any_time_visible: true,
            },
            TimeFilter::Around(minute) => Self {
                text: format_time(minute),
                any_time_visible: false,
            },
        }
    }
}

/// Result of handling one event.
#[derive(Debug, Serialize)]
pub struct Frame<'a> {
    pub filter: TimeFilter,
    pub label: TimeLabel,
    pub changes: Reconciliation,
    pub symbols: &'a SymbolSet,
}

/// Everything needed to draw the current map state.
#[derive(Debug, Serialize)]
pub struct Scene<'a> {
    pub viewport: &'a Viewport,
    pub filter: TimeFilter,
    pub label: TimeLabel,
    pub overlays: &'a [LineOverlay],
    pub symbols: Vec<&'a crate::render::Symbol>,
}

pub struct MapController {
    dataset: Dataset,
    overlays: Vec<LineOverlay>,
    viewport: Viewport,
    filter: TimeFilter,
    symbols: SymbolSet,
    /// Busiest station's total over all trips; the radius domain for every filter.
    radius_domain: u32,
}

impl MapController {
    /// Creates the controller and performs the initial render for `initial_slider`.
    pub fn new(
        dataset: Dataset,
        viewport: Viewport,
        overlays: Vec<LineOverlay>,
        initial_slider: i32,
    ) -> Self {
        let radius_domain = unfiltered_max(&dataset);
        let mut controller = Self {
            radius_domain,
            dataset,
            overlays,
            viewport,
            filter: TimeFilter::Any,
            symbols: SymbolSet::new(),
        };
        controller.on_slider_input(initial_slider);
        controller
    }

    pub fn filter(&self) -> TimeFilter {
        self.filter
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Handles a slider value: updates the filter and redraws from scratch.
    #[tracing::instrument(skip(self))]
    pub fn on_slider_input(&mut self, value: i32) -> Frame<'_> {
        let filter = TimeFilter::from_slider(value);
        let symbols = render(&self.dataset, filter, &self.viewport, self.radius_domain);
        let changes = reconcile(&self.symbols, &symbols);

        debug!(
            trips = self.dataset.trips.len(),
            enter = changes.enter.len(),
            update = changes.update.len(),
            exit = changes.exit.len(),
            "Slider render"
        );

        self.filter = filter;
        self.symbols = symbols;

        Frame {
            filter,
            label: TimeLabel::for_filter(filter),
            changes,
            symbols: &self.symbols,
        }
    }

    /// Handles a map movement. Only screen positions change; the data is not
    /// re-aggregated.
    ///
    /// The viewport should already reflect the event (see [`Self::viewport_mut`]).
    pub fn on_viewport_event(&mut self, event: ViewportEvent) -> Frame<'_> {
        debug!(?event, zoom = self.viewport.zoom, "Viewport changed");
        reposition(&mut self.symbols, &self.viewport);

        Frame {
            filter: self.filter,
            label: TimeLabel::for_filter(self.filter),
            changes: Reconciliation {
                update: self.symbols.keys().cloned().collect(),
                ..Default::default()
            },
            symbols: &self.symbols,
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            viewport: &self.viewport,
            filter: self.filter,
            label: TimeLabel::for_filter(self.filter),
            overlays: &self.overlays,
            symbols: self.symbols.values().collect(),
        }
    }
}

/// Largest station total with no time filter applied.
pub fn unfiltered_max(dataset: &Dataset) -> u32 {
    max_total_traffic(&aggregate(&dataset.stations, &dataset.trips))
}

/// Filter, aggregate and build symbols, always starting from the pristine station list.
///
/// Radii are measured against `radius_domain` whatever the filter; only the
/// pixel range changes when a filter is active.
pub fn render(
    dataset: &Dataset,
    filter: TimeFilter,
    viewport: &Viewport,
    radius_domain: u32,
) -> SymbolSet {
    let trips = filter_by_time(&dataset.trips, filter);
    let traffic = aggregate(&dataset.stations, trips.iter().copied());
    build_symbols(&traffic, RadiusScale::for_filter(radius_domain, filter), viewport)
}
