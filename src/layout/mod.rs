//! Axis geometry: dimensions, visible index resolution, hit testing, cell
//! boxes and the five-pane frame computation.

mod box_getter;
mod dimension;
mod five_pane;
mod viewport;

pub use box_getter::BoxGetter;
pub use dimension::{validate_size, wraps, Dimension, FixedDimension, FnDimension, SizeTable};
pub use five_pane::{FivePaneFrames, PaneExtents};
pub use viewport::{
    calc_visible, calc_visible_bounded, find_index, find_index_bounded, total_size,
    which_window, Edge, EdgeLookup, Visible, DEFAULT_SCAN_LIMIT,
};
