//! CLI entry point for the bike-share traffic map.
//!
//! Provides subcommands for writing a per-station traffic summary, rendering
//! a single map frame to SVG, and driving the map interactively from stdin.

use anyhow::{Result, anyhow};
use bikeshare_traffic::{
    config::MapConfig,
    controller::{Frame, MapController},
    fetch::BasicClient,
    filter::filter_by_time,
    loader::{Dataset, load_dataset},
    model::TimeFilter,
    output::{write_json, write_station_csv, write_svg},
    render::{LngLat, Viewport, ViewportEvent},
    traffic::aggregate,
};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_traffic")]
#[command(about = "Bike-share station traffic on a map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FeedArgs {
    /// JSON config file with feed URLs, viewport and overlays
    #[arg(short, long)]
    config: Option<String>,

    /// Station feed path or URL (overrides config)
    #[arg(long)]
    stations: Option<String>,

    /// Trip CSV path or URL (overrides config)
    #[arg(long)]
    trips: Option<String>,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long, allow_negative_numbers = true)]
    center_lon: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    center_lat: Option<f64>,

    #[arg(long)]
    zoom: Option<f64>,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    height: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write arrivals, departures and total traffic per station to CSV
    Summary {
        #[command(flatten)]
        feeds: FeedArgs,

        /// Minute of day to filter around (-1 = any time)
        #[arg(short, long, default_value_t = TimeFilter::SLIDER_ANY, allow_negative_numbers = true)]
        time: i32,

        /// CSV file to write
        #[arg(short, long, default_value = "stations.csv")]
        output: String,
    },
    /// Render one map frame as SVG
    Render {
        #[command(flatten)]
        feeds: FeedArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Minute of day to filter around (-1 = any time)
        #[arg(short, long, default_value_t = TimeFilter::SLIDER_ANY, allow_negative_numbers = true)]
        time: i32,

        /// SVG file to write
        #[arg(short, long, default_value = "map.svg")]
        output: String,

        /// Optional: also write the scene (viewport, overlays, symbols) as JSON
        #[arg(long)]
        scene: Option<String>,
    },
    /// Drive the map from stdin: `time N`, `pan DX DY`, `zoom Z`, `resize W H`, `moveend`, `quit`
    Explore {
        #[command(flatten)]
        feeds: FeedArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Initial slider value
        #[arg(short, long, default_value_t = TimeFilter::SLIDER_ANY, allow_negative_numbers = true)]
        time: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            feeds,
            time,
            output,
        } => {
            let config = resolve_config(&feeds)?;
            let dataset = load(&config).await;

            let filter = TimeFilter::from_slider(time);
            let trips = filter_by_time(&dataset.trips, filter);
            let traffic = aggregate(&dataset.stations, trips.iter().copied());

            write_station_csv(&output, &traffic)?;
            info!(
                output = %output,
                stations = traffic.len(),
                trips = trips.len(),
                "Station summary written"
            );
        }
        Commands::Render {
            feeds,
            view,
            time,
            output,
            scene,
        } => {
            let config = resolve_config(&feeds)?;
            let viewport = resolve_viewport(&config, &view);
            let dataset = load(&config).await;

            let controller = MapController::new(dataset, viewport, config.overlays, time);
            write_svg(&output, &controller.scene())?;
            if let Some(path) = scene {
                write_json(&path, &controller.scene())?;
                info!(path = %path, "Scene written");
            }
        }
        Commands::Explore { feeds, view, time } => {
            let config = resolve_config(&feeds)?;
            let viewport = resolve_viewport(&config, &view);
            let dataset = load(&config).await;

            let mut controller = MapController::new(dataset, viewport, config.overlays, time);
            explore(&mut controller).await?;
        }
    }

    Ok(())
}

/// Config file (or defaults), then environment, then command-line flags.
fn resolve_config(feeds: &FeedArgs) -> Result<MapConfig> {
    let mut config = match &feeds.config {
        Some(path) => MapConfig::load(path)?,
        None => MapConfig::default(),
    }
    .with_env_overrides();

    if let Some(stations) = &feeds.stations {
        config.stations_url = stations.clone();
    }
    if let Some(trips) = &feeds.trips {
        config.trips_url = trips.clone();
    }
    Ok(config)
}

fn resolve_viewport(config: &MapConfig, view: &ViewArgs) -> Viewport {
    let base = config.viewport;
    Viewport::new(
        LngLat::new(
            view.center_lon.unwrap_or(base.center.lon),
            view.center_lat.unwrap_or(base.center.lat),
        ),
        view.zoom.unwrap_or(base.zoom),
        view.width.unwrap_or(base.width),
        view.height.unwrap_or(base.height),
    )
}

async fn load(config: &MapConfig) -> Dataset {
    let client = BasicClient::new();
    let dataset = load_dataset(&client, &config.stations_url, &config.trips_url).await;
    info!(
        stations = dataset.stations.len(),
        trips = dataset.trips.len(),
        "Dataset ready"
    );
    dataset
}

/// One line of input in `explore` mode.
#[derive(Debug, PartialEq)]
enum Command {
    Time(i32),
    Pan(f64, f64),
    Zoom(f64),
    Resize(f64, f64),
    MoveEnd,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().ok_or_else(|| anyhow!("empty command"))?;
    let args: Vec<&str> = parts.collect();

    let command = match (verb, args.as_slice()) {
        ("time", [v]) => Command::Time(v.parse()?),
        ("pan", [dx, dy]) => Command::Pan(dx.parse()?, dy.parse()?),
        ("zoom", [z]) => Command::Zoom(z.parse()?),
        ("resize", [w, h]) => Command::Resize(w.parse()?, h.parse()?),
        ("moveend", []) => Command::MoveEnd,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(anyhow!("unrecognised command '{line}'")),
    };
    Ok(command)
}

fn log_frame(frame: &Frame<'_>) {
    let label = if frame.label.any_time_visible {
        "(any time)"
    } else {
        frame.label.text.as_str()
    };
    info!(
        label,
        symbols = frame.symbols.len(),
        enter = frame.changes.enter.len(),
        update = frame.changes.update.len(),
        exit = frame.changes.exit.len(),
        "Frame"
    );
}

/// Reads commands from stdin until EOF or `quit`, handling each one fully
/// before reading the next.
async fn explore(controller: &mut MapController) -> Result<()> {
    info!(
        symbols = controller.symbols().len(),
        filter = ?controller.filter(),
        "Initial render"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Ignoring input");
                continue;
            }
        };

        let frame = match command {
            Command::Time(value) => controller.on_slider_input(value),
            Command::Pan(dx, dy) => {
                controller.viewport_mut().pan_by(dx, dy);
                controller.on_viewport_event(ViewportEvent::Move)
            }
            Command::Zoom(z) => {
                controller.viewport_mut().zoom_to(z);
                controller.on_viewport_event(ViewportEvent::Zoom)
            }
            Command::Resize(w, h) => {
                controller.viewport_mut().resize(w, h);
                controller.on_viewport_event(ViewportEvent::Resize)
            }
            Command::MoveEnd => controller.on_viewport_event(ViewportEvent::MoveEnd),
            Command::Quit => break,
        };
        log_frame(&frame);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("time 480").unwrap(), Command::Time(480));
        assert_eq!(parse_command("time -1").unwrap(), Command::Time(-1));
        assert_eq!(parse_command("pan 10 -5.5").unwrap(), Command::Pan(10.0, -5.5));
        assert_eq!(parse_command("  zoom 13 ").unwrap(), Command::Zoom(13.0));
        assert_eq!(
            parse_command("resize 800 600").unwrap(),
            Command::Resize(800.0, 600.0)
        );
        assert_eq!(parse_command("moveend").unwrap(), Command::MoveEnd);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_command_rejects_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("time").is_err());
        assert!(parse_command("time noon").is_err());
        assert!(parse_command("fly 1 2").is_err());
    }

    #[test]
    fn test_resolve_viewport_prefers_flags() {
        let config = MapConfig::default();
        let view = ViewArgs {
            center_lon: Some(-71.0),
            center_lat: None,
            zoom: Some(40.0),
            width: None,
            height: Some(300.0),
        };
        let vp = resolve_viewport(&config, &view);
        assert_eq!(vp.center.lon, -71.0);
        assert_eq!(vp.center.lat, config.viewport.center.lat);
        assert_eq!(vp.zoom, 18.0);
        assert_eq!(vp.width, config.viewport.width);
        assert_eq!(vp.height, 300.0);
    }
}
