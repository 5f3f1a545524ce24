//! A scrollable center panel framed by up to four frozen panels.

use std::rc::{Rc, Weak};

use tracing::warn;

use crate::error::{GridError, Result};
use crate::layout::{FivePaneFrames, PaneExtents};
use crate::observer::{subscribe_weak, ListenerId, Notifier};
use crate::render::Graphics;
use crate::types::{CellCoords, Point, Rect, Selection, SelectionKey};

use super::panel::Panel;

/// The optional frozen panels around the center.
///
/// Top and bottom panels share the center's columns; left and right panels
/// share its rows.
pub struct FrozenPanels<G: Graphics> {
    pub top: Option<Rc<Panel<G>>>,
    pub bottom: Option<Rc<Panel<G>>>,
    pub left: Option<Rc<Panel<G>>>,
    pub right: Option<Rc<Panel<G>>>,
}

impl<G: Graphics> Default for FrozenPanels<G> {
    fn default() -> Self {
        Self {
            top: None,
            bottom: None,
            left: None,
            right: None,
        }
    }
}

/// Five-pane grid. Scrolling the center pane drags the frozen panes along
/// the shared axis.
pub struct DataGrid<G: Graphics> {
    main: Rc<Panel<G>>,
    frozen: FrozenPanels<G>,
}

/// Width (columns) or height (rows) a frozen panel needs.
fn frozen_extent<G: Graphics + 'static>(panel: &Panel<G>, rows: bool) -> Result<f64> {
    let (total, axis) = if rows {
        (panel.total_height()?, "rows")
    } else {
        (panel.total_width()?, "columns")
    };
    total.ok_or_else(|| GridError::UnboundedExtent(format!("frozen panel {axis}")))
}

fn extent<G: Graphics + 'static>(panel: Option<&Rc<Panel<G>>>, rows: bool) -> Option<f64> {
    let panel = panel?;
    match frozen_extent(panel, rows) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, "Frozen panel laid out at 0");
            Some(0.0)
        }
    }
}

impl<G: Graphics + 'static> DataGrid<G> {
    pub fn new(main: Rc<Panel<G>>, frozen: FrozenPanels<G>) -> Self {
        let weak = |p: &Option<Rc<Panel<G>>>| p.as_ref().map(Rc::downgrade);
        let (top, bottom) = (weak(&frozen.top), weak(&frozen.bottom));
        let (left, right) = (weak(&frozen.left), weak(&frozen.right));
        main.on_scroll().subscribe(move |at: &Point| {
            let follow = |p: &Option<Weak<Panel<G>>>, x: f64, y: f64| {
                if let Some(p) = p.as_ref().and_then(Weak::upgrade) {
                    p.set_content_offset(x, y);
                }
            };
            follow(&top, at.x, 0.0);
            follow(&left, 0.0, at.y);
            follow(&bottom, at.x, 0.0);
            follow(&right, 0.0, at.y);
        });
        Self { main, frozen }
    }

    pub fn main(&self) -> &Rc<Panel<G>> {
        &self.main
    }

    pub fn frozen(&self) -> &FrozenPanels<G> {
        &self.frozen
    }

    fn frozen_in_setup_order(&self) -> impl Iterator<Item = &Rc<Panel<G>>> {
        [
            &self.frozen.left,
            &self.frozen.top,
            &self.frozen.right,
            &self.frozen.bottom,
        ]
        .into_iter()
        .flatten()
    }

    /// Hand the center panel and then each present frozen panel to the
    /// caller for wiring.
    pub fn setup(&self, main: impl FnOnce(&Rc<Panel<G>>), mut frozen: impl FnMut(&Rc<Panel<G>>)) {
        main(&self.main);
        for panel in self.frozen_in_setup_order() {
            frozen(panel);
        }
    }

    /// Size every panel for a `width` x `height` container.
    pub fn layout(&self, width: f64, height: f64) -> FivePaneFrames {
        let extents = PaneExtents {
            top: extent(self.frozen.top.as_ref(), true),
            bottom: extent(self.frozen.bottom.as_ref(), true),
            left: extent(self.frozen.left.as_ref(), false),
            right: extent(self.frozen.right.as_ref(), false),
        };
        let frames = FivePaneFrames::compute(width, height, extents);
        self.main.set_frame(frames.center);
        let place = |panel: &Option<Rc<Panel<G>>>, frame: Option<Rect>| {
            if let (Some(panel), Some(frame)) = (panel, frame) {
                panel.set_frame(frame);
            }
        };
        place(&self.frozen.top, frames.top);
        place(&self.frozen.bottom, frames.bottom);
        place(&self.frozen.left, frames.left);
        place(&self.frozen.right, frames.right);
        frames
    }

    /// Scroll the center panel; frozen panels follow.
    pub fn set_content_offset(&self, x: f64, y: f64) {
        self.main.set_content_offset(x, y);
    }

    /// Draw every pane into its frame, center first.
    pub fn draw(&self, gr: &mut G) {
        let panes = std::iter::once(&self.main).chain(self.frozen_in_setup_order());
        for panel in panes {
            let frame = panel.frame();
            if frame.is_empty() {
                continue;
            }
            gr.save_state();
            gr.translate(frame.x, frame.y);
            gr.clip_rect(Rect::sized(frame.width, frame.height));
            panel.draw(gr);
            gr.restore_state();
        }
    }
}

/// Listener ids created by [`select_on_tap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapBindings {
    pub single: ListenerId,
    pub double: ListenerId,
    pub long: ListenerId,
}

fn toggle_on(
    source: &Notifier<CellCoords>,
    selection: &Rc<Selection>,
    key: fn(CellCoords) -> SelectionKey,
) -> ListenerId {
    subscribe_weak(source, &Rc::downgrade(selection), move |sel: &Selection, at| {
        sel.toggle(key(*at));
    })
}

/// Toggle selection from a panel's gestures: a tap toggles the cell, a double
/// tap the whole row and a long press the whole column.
pub fn select_on_tap<G: Graphics + 'static>(
    panel: &Panel<G>,
    selection: &Rc<Selection>,
) -> TapBindings {
    TapBindings {
        single: toggle_on(panel.on_single_tap(), selection, SelectionKey::Cell),
        double: toggle_on(panel.on_double_tap(), selection, |at| {
            SelectionKey::Row(at.row)
        }),
        long: toggle_on(panel.on_long_press(), selection, |at| {
            SelectionKey::Column(at.column)
        }),
    }
}
