//! Drawing a whole visible range at once.

use std::rc::{Rc, Weak};

use crate::layout::BoxGetter;
use crate::observer::{subscribe_weak, Notifier};
use crate::types::{CellRange, CellTarget, Point};

use super::backend::Graphics;
use super::pipeline::Stage;

/// Draws every cell of a resolved visible range.
pub trait DrawVisible<G: Graphics> {
    /// `boxes` gives world-space cell boxes; `offset` maps them to the target.
    fn draw(&self, offset: Point, range: &CellRange, boxes: &BoxGetter, gr: &mut G);

    fn changed(&self) -> &Notifier<CellTarget>;
}

pub type VisibleStage<G> = Rc<dyn DrawVisible<G>>;

/// Drives a per-cell stage over a range, row by row.
pub struct CellAdapter<G: Graphics> {
    stage: Stage<G>,
    changed: Notifier<CellTarget>,
}

impl<G: Graphics + 'static> CellAdapter<G> {
    pub fn new(stage: Stage<G>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(stage.changed(), weak, |me: &Self, e| me.changed.notify(e));
            Self {
                stage,
                changed: Notifier::new(),
            }
        })
    }

    pub fn stage(&self) -> &Stage<G> {
        &self.stage
    }
}

impl<G: Graphics + 'static> DrawVisible<G> for CellAdapter<G> {
    fn draw(&self, offset: Point, range: &CellRange, boxes: &BoxGetter, gr: &mut G) {
        self.stage.begin_update(range);
        for cell in range.cells() {
            if let Some(b) = boxes.cell_box(cell.column, cell.row) {
                self.stage
                    .draw_cell(cell.column, cell.row, b.translate(offset.x, offset.y), gr);
            }
        }
        self.stage.end_update();
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

/// Draws several visible-level layers in order.
pub struct VisibleLayers<G: Graphics> {
    layers: Vec<VisibleStage<G>>,
    changed: Notifier<CellTarget>,
}

impl<G: Graphics + 'static> VisibleLayers<G> {
    pub fn new(layers: Vec<VisibleStage<G>>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            for layer in &layers {
                subscribe_weak(layer.changed(), weak, |me: &Self, e| me.changed.notify(e));
            }
            Self {
                layers,
                changed: Notifier::new(),
            }
        })
    }
}

impl<G: Graphics + 'static> DrawVisible<G> for VisibleLayers<G> {
    fn draw(&self, offset: Point, range: &CellRange, boxes: &BoxGetter, gr: &mut G) {
        for layer in &self.layers {
            layer.draw(offset, range, boxes, gr);
        }
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}
