//! Rendering: the backend capability trait, per-cell pipelines and caches.
//!
//! This module provides:
//! - [`Graphics`], the drawing capability set every stage talks to
//! - an in-memory recording backend, and a Canvas 2D backend on wasm32
//! - the per-cell draw pipeline and its value providers
//! - the per-cell image cache and the double-buffered viewport tile cache

pub mod backend;
pub mod cache;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod colors;
pub mod pipeline;
pub mod recording;
pub mod tile_cache;
pub mod visible;

pub use backend::{Font, Graphics, ImageHandle, Padding, TextAlign, TextFormat, VerticalAlign};
pub use cache::Cache;
#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasGraphics, CanvasImage};
pub use colors::Color;
pub use pipeline::{CellStage, Stage};
pub use recording::{DrawOp, RecordedImage, RecordingGraphics};
pub use tile_cache::{TileStats, ViewportTileCache};
pub use visible::{CellAdapter, DrawVisible, VisibleLayers, VisibleStage};
