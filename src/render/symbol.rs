//! Proportional station symbols and keyed reconciliation.

use serde::Serialize;
use std::collections::BTreeMap;

use super::projection::{LngLat, Projection};
use super::scale::{FlowBucket, RadiusScale};
use crate::model::StationTraffic;

/// Fixed presentation attributes shared by every station circle.
pub const FILL: &str = "steelblue";
pub const STROKE: &str = "white";
pub const STROKE_WIDTH: f64 = 1.0;
pub const OPACITY: f64 = 0.6;

/// One circle on the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub id: String,
    pub position: LngLat,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    /// `None` when the station had no traffic and so no departure ratio.
    pub flow: Option<FlowBucket>,
    pub title: String,
}

/// Symbols keyed by station id.
pub type SymbolSet = BTreeMap<String, Symbol>;

/// Ids that appear, stay, and disappear between two symbol sets. Each list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub enter: Vec<String>,
    pub update: Vec<String>,
    pub exit: Vec<String>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }
}

pub fn tooltip(traffic: &StationTraffic<'_>) -> String {
    format!(
        "{} trips ({} departures, {} arrivals)",
        traffic.total_traffic(),
        traffic.departures,
        traffic.arrivals
    )
}

/// Builds one symbol per station, sized by `scale`.
///
/// The scale's domain comes from the caller; under a time filter it stays
/// anchored to the unfiltered maximum so radii remain comparable across times.
pub fn build_symbols<P: Projection>(
    traffic: &[StationTraffic<'_>],
    scale: RadiusScale,
    projection: &P,
) -> SymbolSet {
    traffic
        .iter()
        .map(|t| {
            let position = LngLat::new(t.station.lon, t.station.lat);
            let screen = projection.project(position);
            let symbol = Symbol {
                id: t.station.id.clone(),
                position,
                cx: screen.x,
                cy: screen.y,
                r: scale.radius(t.total_traffic()),
                flow: FlowBucket::from_ratio(t.departure_ratio()),
                title: tooltip(t),
            };
            (symbol.id.clone(), symbol)
        })
        .collect()
}

/// Recomputes screen positions only. Radius, flow and title are left alone.
pub fn reposition<P: Projection>(symbols: &mut SymbolSet, projection: &P) {
    for symbol in symbols.values_mut() {
        let screen = projection.project(symbol.position);
        symbol.cx = screen.x;
        symbol.cy = screen.y;
    }
}

/// Matches symbols by id, never by position in the list.
pub fn reconcile(old: &SymbolSet, new: &SymbolSet) -> Reconciliation {
    let mut plan = Reconciliation::default();

    for id in new.keys() {
        if old.contains_key(id) {
            plan.update.push(id.clone());
        } else {
            plan.enter.push(id.clone());
        }
    }
    plan.exit = old
        .keys()
        .filter(|id| !new.contains_key(*id))
        .cloned()
        .collect();

    plan
}
