//! Scrollable panels and the five-pane grid built from them.

mod grid;
mod panel;

pub use grid::{select_on_tap, DataGrid, FrozenPanels, TapBindings};
pub use panel::{HostView, Panel};
