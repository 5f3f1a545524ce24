//! Double-buffered viewport tile cache.
//!
//! Two tiles alternate. Each holds an image of a padded range of cells. A
//! draw whose range fits inside either tile is a single blit. Otherwise the
//! stale tile is rebuilt around the new range: the overlap is copied from the
//! current tile and only the uncovered bands are drawn.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::GridConfig;
use crate::layout::{BoxGetter, Dimension};
use crate::observer::{subscribe_weak, Notifier};
use crate::types::{CellRange, CellTarget, Point, Which};

use super::backend::{Graphics, ImageHandle};
use super::visible::{DrawVisible, VisibleStage};

struct Tile<I> {
    range: CellRange,
    /// World position of the tile's top-left cell.
    origin: Point,
    image: I,
}

/// Counters for one [`ViewportTileCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TileStats {
    /// Draws served by blitting an existing tile.
    pub hits: u64,
    /// Tiles rebuilt reusing part of the previous tile.
    pub incremental: u64,
    /// Tiles rebuilt from scratch.
    pub full: u64,
    /// Draws that bypassed the cache.
    pub direct: u64,
}

pub struct ViewportTileCache<G: Graphics> {
    next: VisibleStage<G>,
    columns: Rc<dyn Dimension>,
    rows: Rc<dyn Dimension>,
    margin_cols: u32,
    margin_rows: u32,
    tiles: RefCell<[Option<Tile<G::Image>>; 2]>,
    current: Cell<usize>,
    generation: Cell<u64>,
    stats: Cell<TileStats>,
    changed: Notifier<CellTarget>,
}

fn release<I: ImageHandle>(image: &I) {
    if let Err(e) = image.release() {
        warn!(error = %e, "Failed to release tile image");
    }
}

fn last_index(dim: &dyn Dimension) -> Option<u32> {
    dim.count().map(|n| n.saturating_sub(1))
}

impl<G: Graphics + 'static> ViewportTileCache<G> {
    pub fn new(
        next: VisibleStage<G>,
        columns: Rc<dyn Dimension>,
        rows: Rc<dyn Dimension>,
        config: &GridConfig,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(next.changed(), weak, |me: &Self, target: &CellTarget| {
                me.invalidate();
                me.changed.notify(target);
            });
            for dim in [&columns, &rows] {
                subscribe_weak(dim.changed(), weak, |me: &Self, _: &Which| me.invalidate());
            }
            Self {
                next,
                columns,
                rows,
                margin_cols: config.tile_margin_cols,
                margin_rows: config.tile_margin_rows,
                tiles: RefCell::new([None, None]),
                current: Cell::new(0),
                generation: Cell::new(0),
                stats: Cell::new(TileStats::default()),
                changed: Notifier::new(),
            }
        })
    }

    /// Drop both tiles, releasing their images.
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
        let dropped: Vec<Tile<G::Image>> = {
            let mut tiles = self.tiles.borrow_mut();
            tiles.iter_mut().filter_map(Option::take).collect()
        };
        if !dropped.is_empty() {
            debug!(tiles = dropped.len(), "Viewport tiles invalidated");
        }
        for tile in &dropped {
            release(&tile.image);
        }
    }

    /// Ranges currently held, current tile first.
    pub fn cached_ranges(&self) -> Vec<CellRange> {
        let tiles = self.tiles.borrow();
        let cur = self.current.get();
        [cur, 1 - cur]
            .iter()
            .filter_map(|i| tiles.get(*i)?.as_ref().map(|t| t.range))
            .collect()
    }

    pub fn stats(&self) -> TileStats {
        self.stats.get()
    }

    fn bump(&self, f: impl FnOnce(&mut TileStats)) {
        let mut s = self.stats.get();
        f(&mut s);
        self.stats.set(s);
    }

    /// Index of a tile whose range covers `range`.
    fn usable(&self, range: &CellRange) -> Option<usize> {
        let tiles = self.tiles.borrow();
        let cur = self.current.get();
        [cur, 1 - cur].into_iter().find(|i| {
            tiles
                .get(*i)
                .and_then(Option::as_ref)
                .is_some_and(|t| t.range.contains_range(range))
        })
    }

    fn blit(&self, index: usize, offset: Point, gr: &mut G) {
        let tiles = self.tiles.borrow();
        if let Some(Some(tile)) = tiles.get(index) {
            gr.draw_image(
                &tile.image,
                Point::new(offset.x + tile.origin.x, offset.y + tile.origin.y),
            );
        }
    }

    /// Render a new tile around `range` into the stale slot.
    fn rebuild(&self, range: &CellRange, boxes: &BoxGetter, gr: &mut G) -> Option<usize> {
        let padded = range.padded(
            self.margin_cols,
            self.margin_rows,
            last_index(self.columns.as_ref()),
            last_index(self.rows.as_ref()),
        );
        let extended = match boxes.extended(self.columns.as_ref(), self.rows.as_ref(), &padded) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Tile edges unavailable, drawing directly");
                return None;
            }
        };
        let bounds = extended.range_box(&padded)?;
        let cur = self.current.get();
        let slot = 1 - cur;
        let stale = self
            .tiles
            .borrow_mut()
            .get_mut(slot)
            .and_then(Option::take)
            .map(|t| t.image);
        if let Err(e) = gr.begin_offscreen(bounds.width, bounds.height, stale) {
            warn!(error = %e, "Tile capture unavailable, drawing directly");
            return None;
        }
        let generation = self.generation.get();
        let local = Point::new(-bounds.x, -bounds.y);

        let previous = {
            let tiles = self.tiles.borrow();
            match tiles.get(cur) {
                Some(Some(prev)) if prev.range.intersect(&padded).is_some() => {
                    gr.draw_image(
                        &prev.image,
                        Point::new(prev.origin.x - bounds.x, prev.origin.y - bounds.y),
                    );
                    Some(prev.range)
                }
                _ => None,
            }
        };
        match previous {
            Some(prev) => {
                let missing = padded.subtract(&prev);
                debug!(?padded, ?prev, pieces = missing.len(), "Incremental tile rebuild");
                for piece in &missing {
                    self.next.draw(local, piece, &extended, gr);
                }
                self.bump(|s| s.incremental += 1);
            }
            None => {
                debug!(?padded, "Full tile rebuild");
                self.next.draw(local, &padded, &extended, gr);
                self.bump(|s| s.full += 1);
            }
        }

        let image = match gr.end_offscreen() {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Tile capture failed, drawing directly");
                return None;
            }
        };
        if self.generation.get() != generation {
            // Content changed while the tile was drawn.
            release(&image);
            return None;
        }
        if let Some(s) = self.tiles.borrow_mut().get_mut(slot) {
            *s = Some(Tile {
                range: padded,
                origin: bounds.origin(),
                image,
            });
        }
        self.current.set(slot);
        Some(slot)
    }
}

impl<G: Graphics + 'static> DrawVisible<G> for ViewportTileCache<G> {
    fn draw(&self, offset: Point, range: &CellRange, boxes: &BoxGetter, gr: &mut G) {
        if let Some(i) = self.usable(range) {
            trace!(?range, tile = i, "Tile hit");
            self.current.set(i);
            self.bump(|s| s.hits += 1);
            self.blit(i, offset, gr);
            return;
        }
        match self.rebuild(range, boxes, gr) {
            Some(i) => self.blit(i, offset, gr),
            None => {
                self.bump(|s| s.direct += 1);
                self.next.draw(offset, range, boxes, gr);
            }
        }
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

impl<G: Graphics> Drop for ViewportTileCache<G> {
    fn drop(&mut self) {
        for tile in self.tiles.get_mut().iter_mut().filter_map(Option::take) {
            release(&tile.image);
        }
    }
}
