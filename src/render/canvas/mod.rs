//! Canvas 2D backend.
//!
//! Implements [`Graphics`](crate::render::backend::Graphics) over the HTML
//! Canvas 2D API via web-sys. Offscreen captures are detached canvas elements;
//! releasing an image shrinks its canvas to zero.

mod graphics;

pub use graphics::{CanvasGraphics, CanvasImage};
