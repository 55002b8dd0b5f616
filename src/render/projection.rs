//! Geographic to screen projection for the current map viewport.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Pixel size of one zoom-0 tile, as used by vector map engines.
pub const TILE_SIZE: f64 = 512.0;

pub const MIN_ZOOM: f64 = 5.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Web Mercator stops being defined at the poles.
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Anything that can place a geographic coordinate on screen.
pub trait Projection {
    fn project(&self, point: LngLat) -> ScreenPoint;
}

/// The map events that invalidate screen positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Move,
    Zoom,
    Resize,
    MoveEnd,
}

/// A Web Mercator view: centre, zoom and canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LngLat,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LngLat::new(-71.09415, 42.36027), 12.0, 1024.0, 768.0)
    }
}

impl Viewport {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Absolute pixel position at the current zoom, origin at the north-west corner.
    fn world_point(&self, point: LngLat) -> (f64, f64) {
        let size = self.world_size();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = (180.0 + point.lon) / 360.0 * size;
        let y = (180.0 - (180.0 / PI) * (PI / 4.0 + lat * PI / 360.0).tan().ln()) / 360.0 * size;
        (x, y)
    }

    fn unproject_world(&self, x: f64, y: f64) -> LngLat {
        let size = self.world_size();
        let lon = x / size * 360.0 - 180.0;
        let y2 = 180.0 - y / size * 360.0;
        let lat = 360.0 / PI * (y2 * PI / 180.0).exp().atan() - 90.0;
        LngLat::new(lon, lat)
    }

    /// Moves the view by a screen-pixel offset; positive `dx` pans east.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.world_point(self.center);
        self.center = self.unproject_world(cx + dx, cy + dy);
    }

    pub fn zoom_to(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

impl Projection for Viewport {
    fn project(&self, point: LngLat) -> ScreenPoint {
        let (px, py) = self.world_point(point);
        let (cx, cy) = self.world_point(self.center);
        ScreenPoint {
            x: px - cx + self.width / 2.0,
            y: py - cy + self.height / 2.0,
        }
    }
}
