//! Per-cell image cache stage.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::layout::Dimension;
use crate::observer::{subscribe_weak, Notifier};
use crate::render::backend::{Graphics, ImageHandle};
use crate::render::cache::Cache;
use crate::types::{CellRange, CellTarget, Rect, Which};

use super::{CellStage, Stage};

/// Renders each cell of `next` once into an offscreen image and blits it on
/// later draws.
///
/// Column size changes drop that column's images, row size changes drop that
/// row's, and content changes from `next` drop whatever they name. Every
/// dropped image is released.
pub struct CellImageCache<G: Graphics> {
    next: Stage<G>,
    images: RefCell<Cache<G::Image>>,
    changed: Notifier<CellTarget>,
}

impl<G: Graphics + 'static> CellImageCache<G> {
    pub fn new(next: Stage<G>, columns: &dyn Dimension, rows: &dyn Dimension) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(next.changed(), weak, |me: &Self, target: &CellTarget| {
                debug!(?target, "Cell images invalidated by content change");
                me.images.borrow_mut().apply(*target);
                me.changed.notify(target);
            });
            subscribe_weak(columns.changed(), weak, |me: &Self, which: &Which| {
                let mut images = me.images.borrow_mut();
                match which {
                    Which::All => images.invalidate_all(),
                    Which::Index(c) => images.invalidate_column(*c),
                }
            });
            subscribe_weak(rows.changed(), weak, |me: &Self, which: &Which| {
                let mut images = me.images.borrow_mut();
                match which {
                    Which::All => images.invalidate_all(),
                    Which::Index(r) => images.invalidate_row(*r),
                }
            });
            Self {
                next,
                images: RefCell::new(Cache::with_disposer(|image: G::Image| {
                    if let Err(e) = image.release() {
                        warn!(error = %e, "Failed to release cached cell image");
                    }
                })),
                changed: Notifier::new(),
            }
        })
    }

    /// Number of cached cell images.
    pub fn cached_len(&self) -> usize {
        self.images.borrow().len()
    }

    /// Drop and release every cached image.
    pub fn clear(&self) {
        self.images.borrow_mut().invalidate_all();
    }

    fn render(&self, col: u32, row: u32, rect: Rect, gr: &mut G) -> Option<G::Image> {
        if let Err(e) = gr.begin_offscreen(rect.width, rect.height, None) {
            warn!(error = %e, col, row, "Cell capture unavailable, drawing directly");
            return None;
        }
        self.next
            .draw_cell(col, row, Rect::sized(rect.width, rect.height), gr);
        match gr.end_offscreen() {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, col, row, "Cell capture failed, drawing directly");
                None
            }
        }
    }
}

impl<G: Graphics + 'static> CellStage<G> for CellImageCache<G> {
    fn begin_update(&self, range: &CellRange) {
        self.next.begin_update(range);
    }

    fn end_update(&self) {
        self.next.end_update();
    }

    fn draw_cell(&self, col: u32, row: u32, rect: Rect, gr: &mut G) {
        if let Some(image) = self.images.borrow().get(col, row) {
            gr.draw_image(image, rect.origin());
            return;
        }
        match self.render(col, row, rect, gr) {
            Some(image) => {
                gr.draw_image(&image, rect.origin());
                self.images.borrow_mut().insert(col, row, image);
            }
            None => self.next.draw_cell(col, row, rect, gr),
        }
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}
