//! Output formatting and persistence for station traffic and map frames.
//!
//! Supports a per-station CSV summary, a JSON scene dump, and a standalone
//! SVG rendering of the symbol layer.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use tracing::{debug, info};

use crate::controller::Scene;
use crate::model::StationTraffic;
use crate::render::symbol::{FILL, OPACITY, STROKE, STROKE_WIDTH};
use csv::WriterBuilder;

/// One CSV row of the per-station summary.
#[derive(Debug, Serialize)]
struct StationRow<'a> {
    station_id: &'a str,
    name: Option<&'a str>,
    lat: f64,
    lon: f64,
    arrivals: u32,
    departures: u32,
    total_traffic: u32,
}

impl<'a> From<&'a StationTraffic<'a>> for StationRow<'a> {
    fn from(t: &'a StationTraffic<'a>) -> Self {
        Self {
            station_id: &t.station.id,
            name: t.station.name.as_deref(),
            lat: t.station.lat,
            lon: t.station.lon,
            arrivals: t.arrivals,
            departures: t.departures,
            total_traffic: t.total_traffic(),
        }
    }
}

/// Writes per-station traffic to a CSV file, replacing any existing file.
pub fn write_station_csv(path: &str, traffic: &[StationTraffic<'_>]) -> Result<()> {
    debug!(path, rows = traffic.len(), "Writing station CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in traffic {
        writer.serialize(StationRow::from(row))?;
    }
    writer.flush()?;

    Ok(())
}

/// Logs the scene as pretty-printed JSON.
pub fn print_json(scene: &Scene<'_>) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(scene)?);
    Ok(())
}

pub fn write_json(path: &str, scene: &Scene<'_>) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, scene)?;
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders the symbol layer as an SVG document sized to the viewport.
///
/// Symbols without flow data carry no `--departure-ratio` style.
pub fn to_svg(scene: &Scene<'_>) -> String {
    let vp = scene.viewport;
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        vp.width, vp.height, vp.width, vp.height
    );
    if !scene.label.text.is_empty() {
        let _ = writeln!(out, "  <title>{}</title>", escape(&scene.label.text));
    }
    let _ = writeln!(out, "  <g>");

    for symbol in &scene.symbols {
        let style = match symbol.flow {
            Some(flow) => format!(r#" style="--departure-ratio: {}""#, flow.value()),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            r#"    <circle data-id="{}" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{FILL}" stroke="{STROKE}" stroke-width="{STROKE_WIDTH}" opacity="{OPACITY}"{style}><title>{}</title></circle>"#,
            escape(&symbol.id),
            symbol.cx,
            symbol.cy,
            symbol.r,
            escape(&symbol.title),
        );
    }

    let _ = writeln!(out, "  </g>");
    out.push_str("</svg>\n");
    out
}

pub fn write_svg(path: &str, scene: &Scene<'_>) -> Result<()> {
    std::fs::write(path, to_svg(scene))?;
    info!(path, symbols = scene.symbols.len(), "SVG written");
    Ok(())
}
