//! datagrid - virtualized 2D cell grid
//!
//! Draws only the cells that intersect a scrolled viewport, on axes that may
//! be fixed-size, variable-size, unbounded or wrapping:
//! - Visible index resolution and hit testing per axis
//! - Composable per-cell draw pipelines over value providers
//! - Per-cell image cache and a double-buffered viewport tile cache
//! - Five-pane layout with frozen edges that follow the center's scrolling
//! - Cell, whole-row and whole-column selection
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//! use datagrid::{
//!     layout::FixedDimension,
//!     render::{pipeline, CellAdapter, RecordingGraphics},
//!     viewer::Panel,
//!     GridConfig, Rect,
//! };
//!
//! let cols = Rc::new(FixedDimension::new(100, 80.0, false)?);
//! let rows = Rc::new(FixedDimension::unbounded(20.0)?);
//! let stage = pipeline::text_with(pipeline::a1_labels(), Default::default());
//! let panel = Panel::new(cols, rows, CellAdapter::new(stage), &GridConfig::default());
//! panel.set_frame(Rect::sized(400.0, 300.0));
//! panel.set_content_offset(120.0, 45.0);
//!
//! let mut gr = RecordingGraphics::new(400.0, 300.0);
//! panel.draw(&mut gr);
//! assert_eq!(gr.texts().first().copied(), Some("B3"));
//! # Ok::<(), datagrid::GridError>(())
//! ```

pub mod cell_ref;
pub mod config;
pub mod error;
pub mod layout;
pub mod observer;
pub mod render;
pub mod types;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use config::{AxisConfig, GridConfig, SceneConfig};
pub use error::{GridError, Result};
pub use observer::{ListenerId, Notifier};
pub use viewer::{DataGrid, FrozenPanels, HostView, Panel};

pub use types::*;

/// Get the library version
#[must_use]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
