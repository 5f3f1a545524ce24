//! Per-cell draw pipeline.
//!
//! Stages form a tree: each stage may read per-cell values, paint, and
//! delegate to child stages. Every stage re-emits the change notifications of
//! its inputs and children so caches at the root can invalidate.

mod cell_cache;
mod display_type;
pub mod rowlist;
mod stage;
mod stages;
pub mod values;

use std::rc::Rc;

use crate::observer::Notifier;
use crate::types::{CellRange, CellTarget, Rect};

use super::backend::Graphics;

pub use cell_cache::CellImageCache;
pub use display_type::{DisplaySwitch, DisplayTypeMap};
pub use rowlist::{
    CachedRowList, Field, FieldRowValues, IndexedRowValues, RowList, Rows, VecRowList,
};
pub use stage::{ChildRect, DrawCell, Inputs, NoInputs, OneInput, Paint, StageBuilder, TwoInputs};
pub use stages::{
    fill, fill_color, fill_if_selected, layers, oval, padded, padding, rounded_rect,
    rounded_rect_radius, text, text_with, SelectedCells,
};
pub use values::{
    a1_labels, column_letters_values, column_numbers, row_numbers, AxisMemo, CachedValues,
    ForAllCells, FromFn, Steady, ValueProvider, Values,
};

/// One node of the per-cell draw tree.
pub trait CellStage<G: Graphics> {
    /// Called once before the cells of `range` are drawn.
    fn begin_update(&self, _range: &CellRange) {}

    /// Called once after the cells of a range were drawn.
    fn end_update(&self) {}

    /// Draw cell `(col, row)` into `rect`.
    fn draw_cell(&self, col: u32, row: u32, rect: Rect, gr: &mut G);

    /// Emits the cells whose rendering changed.
    fn changed(&self) -> &Notifier<CellTarget>;
}

/// Shared handle to a stage.
pub type Stage<G> = Rc<dyn CellStage<G>>;
