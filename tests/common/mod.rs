//! Common test utilities for building axes, panels and inspecting draws.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use datagrid::layout::{BoxGetter, Dimension, FixedDimension, SizeTable};
use datagrid::render::pipeline::{a1_labels, text_with};
use datagrid::render::{CellAdapter, DrawOp, DrawVisible, RecordingGraphics, VisibleStage};
use datagrid::viewer::{HostView, Panel};
use datagrid::{CellRange, CellTarget, GridConfig, Notifier, Point, Rect};

pub type G = RecordingGraphics;

// ============================================================================
// Axes
// ============================================================================

pub fn fixed(count: u32, size: f64) -> Rc<dyn Dimension> {
    Rc::new(FixedDimension::new(count, size, false).expect("valid fixed axis"))
}

pub fn wrapping(count: u32, size: f64) -> Rc<dyn Dimension> {
    Rc::new(FixedDimension::new(count, size, true).expect("valid wrapping axis"))
}

pub fn unbounded(size: f64) -> Rc<dyn Dimension> {
    Rc::new(FixedDimension::unbounded(size).expect("valid unbounded axis"))
}

pub fn table(sizes: &[f64]) -> Rc<SizeTable> {
    Rc::new(SizeTable::new(sizes.to_vec(), false).expect("valid size table"))
}

// ============================================================================
// Panels and host views
// ============================================================================

/// Host view that counts redraw requests and records frames.
#[derive(Default)]
pub struct CountingView {
    pub redraws: Cell<usize>,
    pub frames: RefCell<Vec<Rect>>,
}

impl HostView for CountingView {
    fn set_frame(&self, frame: Rect) {
        self.frames.borrow_mut().push(frame);
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}

pub fn attach_view(panel: &Panel<G>) -> Rc<CountingView> {
    let view = Rc::new(CountingView::default());
    panel.set_view(Rc::clone(&view) as Rc<dyn HostView>);
    view
}

/// Panel that draws each cell's A1 label.
pub fn label_panel(cols: &Rc<dyn Dimension>, rows: &Rc<dyn Dimension>) -> Rc<Panel<G>> {
    Panel::new(
        Rc::clone(cols),
        Rc::clone(rows),
        CellAdapter::new(text_with(a1_labels(), Default::default())),
        &GridConfig::default(),
    )
}

/// Panel over a [`Recorder`] drawer.
pub fn recorder_panel(
    cols: &Rc<dyn Dimension>,
    rows: &Rc<dyn Dimension>,
    frame: Rect,
) -> (Rc<Panel<G>>, Rc<Recorder>) {
    let recorder = Rc::new(Recorder::default());
    let panel = Panel::new(
        Rc::clone(cols),
        Rc::clone(rows),
        Rc::clone(&recorder) as VisibleStage<G>,
        &GridConfig::default(),
    );
    panel.set_frame(frame);
    (panel, recorder)
}

// ============================================================================
// Drawers
// ============================================================================

/// Visible-level drawer that records what it was asked to draw.
#[derive(Default)]
pub struct Recorder {
    pub calls: RefCell<Vec<(Point, CellRange)>>,
    pub changed: Notifier<CellTarget>,
}

impl Recorder {
    pub fn ranges(&self) -> Vec<CellRange> {
        self.calls.borrow().iter().map(|(_, r)| *r).collect()
    }

    pub fn offsets(&self) -> Vec<Point> {
        self.calls.borrow().iter().map(|(p, _)| *p).collect()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl DrawVisible<G> for Recorder {
    fn draw(&self, offset: Point, range: &CellRange, _boxes: &BoxGetter, _gr: &mut G) {
        self.calls.borrow_mut().push((offset, *range));
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

// ============================================================================
// Recorded op inspection
// ============================================================================

/// Text ops with the rect they were drawn into.
pub fn text_rects(gr: &G) -> Vec<(String, Rect)> {
    gr.ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, rect, .. } => Some((text.clone(), *rect)),
            _ => None,
        })
        .collect()
}

/// Image ops as `(image id, rect)`.
pub fn image_draws(gr: &G) -> Vec<(u64, Rect)> {
    gr.ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Image { image, rect } => Some((*image, *rect)),
            _ => None,
        })
        .collect()
}

pub fn count_of(gr: &G, kind: &str) -> usize {
    gr.op_counts().get(kind).copied().unwrap_or(0)
}
