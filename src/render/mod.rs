//! Map overlay rendering.
//!
//! Turns aggregated station traffic into keyed proportional symbols placed
//! through a [`Projection`], and works out which symbols enter, update or
//! exit between two renders.

pub mod overlay;
pub mod projection;
pub mod scale;
pub mod symbol;

pub use overlay::{LineOverlay, LinePaint, default_overlays};
pub use projection::{LngLat, Projection, ScreenPoint, Viewport, ViewportEvent};
pub use scale::{FlowBucket, RadiusScale};
pub use symbol::{Reconciliation, Symbol, SymbolSet, build_symbols, reconcile, reposition};
