//! A scrollable view onto a grid of cells.
//!
//! A [`Panel`] owns a content offset and a frame, clamps scrolling to the
//! extent of its axes, resolves the visible cells on every draw and hands
//! them to a [`DrawVisible`](crate::render::DrawVisible) stage. On wrapping
//! axes the visible span is cut at every period boundary and each piece is
//! drawn separately, so content repeats seamlessly.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::config::GridConfig;
use crate::error::Result;
use crate::layout::{
    calc_visible_bounded, find_index_bounded, total_size, which_window, wraps, BoxGetter,
    Dimension,
};
use crate::observer::{subscribe_weak, Notifier};
use crate::render::{Graphics, VisibleStage};
use crate::types::{CellCoords, CellRange, Point, Rect};

/// The host view a panel is displayed in.
pub trait HostView {
    /// The panel's frame in container coordinates changed.
    fn set_frame(&self, frame: Rect);

    /// The panel needs to be drawn again.
    fn request_redraw(&self);
}

/// One period-aligned slice of the visible span on an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    /// Start within the period.
    begin: f64,
    length: f64,
    /// World offset of the period.
    shift: f64,
}

/// Slices `[begin, begin + length)` at every period boundary of a wrapping
/// axis. Non-wrapping axes yield the span unchanged.
#[allow(clippy::cast_precision_loss)]
fn windows(begin: f64, length: f64, dim: &dyn Dimension) -> Result<Vec<Window>> {
    if length <= 0.0 {
        return Ok(Vec::new());
    }
    if !wraps(dim) {
        return Ok(vec![Window {
            begin,
            length,
            shift: 0.0,
        }]);
    }
    let period = total_size(dim)?.unwrap_or(0.0);
    if period <= 0.0 {
        return Ok(Vec::new());
    }
    let end = begin + length;
    let mut out = Vec::new();
    for n in which_window(begin, period)..=which_window(end, period) {
        let shift = n as f64 * period;
        let lo = begin.max(shift);
        let hi = end.min(shift + period);
        if hi > lo {
            out.push(Window {
                begin: lo - shift,
                length: hi - lo,
                shift,
            });
        }
    }
    Ok(out)
}

/// Offset bounds of one axis: `(min, max)`, `None` where unconstrained.
fn axis_bounds(dim: &dyn Dimension, frame_len: f64) -> Result<(Option<f64>, Option<f64>)> {
    if wraps(dim) {
        return Ok((None, None));
    }
    Ok(match total_size(dim)? {
        Some(total) => (Some(0.0), Some((total - frame_len).max(0.0))),
        None => (Some(0.0), None),
    })
}

fn clamp_axis(v: f64, (min, max): (Option<f64>, Option<f64>)) -> f64 {
    let v = max.map_or(v, |m| v.min(m));
    min.map_or(v, |m| v.max(m))
}

/// Scrollable, drawable view over a column and a row axis.
pub struct Panel<G: Graphics> {
    columns: Rc<dyn Dimension>,
    rows: Rc<dyn Dimension>,
    drawer: VisibleStage<G>,
    max_scan: u32,
    view: RefCell<Option<Rc<dyn HostView>>>,
    frame: Cell<Rect>,
    offset: Cell<Point>,
    drawing: Cell<bool>,
    redraw_pending: Cell<bool>,
    drawn: RefCell<Vec<CellRange>>,
    on_scroll: Notifier<Point>,
    single_tap: Notifier<CellCoords>,
    double_tap: Notifier<CellCoords>,
    long_press: Notifier<CellCoords>,
}

impl<G: Graphics + 'static> Panel<G> {
    pub fn new(
        columns: Rc<dyn Dimension>,
        rows: Rc<dyn Dimension>,
        drawer: VisibleStage<G>,
        config: &GridConfig,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(columns.changed(), weak, |me: &Self, which| {
                debug!(?which, "Column dimension changed");
                me.dimension_changed();
            });
            subscribe_weak(rows.changed(), weak, |me: &Self, which| {
                debug!(?which, "Row dimension changed");
                me.dimension_changed();
            });
            subscribe_weak(drawer.changed(), weak, |me: &Self, _| me.request_redraw());
            Self {
                columns,
                rows,
                drawer,
                max_scan: config.max_scan,
                view: RefCell::new(None),
                frame: Cell::new(Rect::default()),
                offset: Cell::new(Point::ZERO),
                drawing: Cell::new(false),
                redraw_pending: Cell::new(false),
                drawn: RefCell::new(Vec::new()),
                on_scroll: Notifier::new(),
                single_tap: Notifier::new(),
                double_tap: Notifier::new(),
                long_press: Notifier::new(),
            }
        })
    }

    pub fn columns(&self) -> &Rc<dyn Dimension> {
        &self.columns
    }

    pub fn rows(&self) -> &Rc<dyn Dimension> {
        &self.rows
    }

    pub fn drawer(&self) -> &VisibleStage<G> {
        &self.drawer
    }

    /// Attach the host view; the current frame is pushed to it.
    pub fn set_view(&self, view: Rc<dyn HostView>) {
        view.set_frame(self.frame.get());
        *self.view.borrow_mut() = Some(view);
    }

    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    /// Move or resize the panel. The offset is re-clamped to the new size.
    pub fn set_frame(&self, frame: Rect) {
        self.frame.set(frame);
        let view = self.view.borrow().clone();
        if let Some(view) = view {
            view.set_frame(frame);
        }
        self.reclamp();
        self.request_redraw();
    }

    pub fn content_offset(&self) -> Point {
        self.offset.get()
    }

    /// Scroll to `(x, y)`, clamped to the axes' extents.
    ///
    /// Redraws only when the clamped offset differs from the current one.
    /// Scroll observers are told the resulting offset either way.
    pub fn set_content_offset(&self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            warn!(x, y, "Ignoring non-finite content offset");
            return;
        }
        let next = self.clamp_offset(Point::new(x, y));
        if next != self.offset.get() {
            self.offset.set(next);
            self.request_redraw();
        }
        self.on_scroll.notify(&next);
    }

    /// Clamp a requested offset to what the axes allow for the current frame.
    pub fn clamp_offset(&self, p: Point) -> Point {
        let frame = self.frame.get();
        let x = match axis_bounds(self.columns.as_ref(), frame.width) {
            Ok(bounds) => clamp_axis(p.x, bounds),
            Err(e) => {
                warn!(error = %e, "Column extent unavailable, clamping at 0");
                p.x.max(0.0)
            }
        };
        let y = match axis_bounds(self.rows.as_ref(), frame.height) {
            Ok(bounds) => clamp_axis(p.y, bounds),
            Err(e) => {
                warn!(error = %e, "Row extent unavailable, clamping at 0");
                p.y.max(0.0)
            }
        };
        Point::new(x, y)
    }

    fn reclamp(&self) {
        let cur = self.offset.get();
        let next = self.clamp_offset(cur);
        if next != cur {
            self.offset.set(next);
            self.on_scroll.notify(&next);
        }
    }

    /// Fired with the new offset after every [`Panel::set_content_offset`].
    pub fn on_scroll(&self) -> &Notifier<Point> {
        &self.on_scroll
    }

    /// Total width of all columns, `None` when unbounded.
    pub fn total_width(&self) -> Result<Option<f64>> {
        total_size(self.columns.as_ref())
    }

    /// Total height of all rows, `None` when unbounded.
    pub fn total_height(&self) -> Result<Option<f64>> {
        total_size(self.rows.as_ref())
    }

    /// Ask the host for a redraw, or defer it to the end of the current draw.
    pub fn request_redraw(&self) {
        if self.drawing.get() {
            self.redraw_pending.set(true);
            return;
        }
        let view = self.view.borrow().clone();
        if let Some(view) = view {
            view.request_redraw();
        }
    }

    fn dimension_changed(&self) {
        self.reclamp();
        self.request_redraw();
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.get()
    }

    /// Draw the visible cells in panel-local coordinates.
    ///
    /// Redraw requests raised while drawing are delivered once afterwards.
    pub fn draw(&self, gr: &mut G) {
        self.drawing.set(true);
        self.drawn.borrow_mut().clear();
        let frame = self.frame.get();
        let offset = self.offset.get();
        let viz = Rect::new(offset.x, offset.y, frame.width, frame.height);
        if let Err(e) = self.draw_wraparound(viz, gr) {
            warn!(error = %e, "Panel draw skipped");
        }
        self.drawing.set(false);
        if self.redraw_pending.replace(false) {
            self.request_redraw();
        }
    }

    /// Ranges handed to the drawer by the last [`Panel::draw`], one per
    /// wraparound window.
    pub fn drawn_ranges(&self) -> Vec<CellRange> {
        self.drawn.borrow().clone()
    }

    fn draw_wraparound(&self, viz: Rect, gr: &mut G) -> Result<()> {
        let xs = windows(viz.x, viz.width, self.columns.as_ref())?;
        let ys = windows(viz.y, viz.height, self.rows.as_ref())?;
        for wy in &ys {
            for wx in &xs {
                self.draw_window(wx, wy, gr)?;
            }
        }
        Ok(())
    }

    fn draw_window(&self, wx: &Window, wy: &Window, gr: &mut G) -> Result<()> {
        let Some(cols) =
            calc_visible_bounded(wx.begin, wx.length, self.columns.as_ref(), self.max_scan)?
        else {
            return Ok(());
        };
        let Some(rows) =
            calc_visible_bounded(wy.begin, wy.length, self.rows.as_ref(), self.max_scan)?
        else {
            return Ok(());
        };
        let range = CellRange::from_bounds((cols.first, cols.last), (rows.first, rows.last));
        trace!(?range, shift_x = wx.shift, shift_y = wy.shift, "Drawing window");
        let boxes = BoxGetter::new(cols.edges, rows.edges);
        let content = self.offset.get();
        let shift = Point::new(wx.shift - content.x, wy.shift - content.y);
        self.drawn.borrow_mut().push(range);
        self.drawer.draw(shift, &range, &boxes, gr);
        Ok(())
    }

    /// Cell under a panel-local point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<CellCoords> {
        let offset = self.offset.get();
        let lookup = |v: f64, dim: &dyn Dimension| match find_index_bounded(v, dim, self.max_scan)
        {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Hit test gave up");
                None
            }
        };
        let column = lookup(x + offset.x, self.columns.as_ref())?;
        let row = lookup(y + offset.y, self.rows.as_ref())?;
        Some(CellCoords::new(column, row))
    }

    fn dispatch(&self, x: f64, y: f64, target: &Notifier<CellCoords>) -> bool {
        match self.hit_test(x, y) {
            Some(cell) => {
                target.notify(&cell);
                true
            }
            None => false,
        }
    }

    /// Returns false when the point is not over a cell.
    pub fn single_tap(&self, x: f64, y: f64) -> bool {
        self.dispatch(x, y, &self.single_tap)
    }

    pub fn double_tap(&self, x: f64, y: f64) -> bool {
        self.dispatch(x, y, &self.double_tap)
    }

    pub fn long_press(&self, x: f64, y: f64) -> bool {
        self.dispatch(x, y, &self.long_press)
    }

    pub fn on_single_tap(&self) -> &Notifier<CellCoords> {
        &self.single_tap
    }

    pub fn on_double_tap(&self) -> &Notifier<CellCoords> {
        &self.double_tap
    }

    pub fn on_long_press(&self) -> &Notifier<CellCoords> {
        &self.long_press
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::layout::{FixedDimension, SizeTable};
    use crate::render::pipeline::{a1_labels, text_with};
    use crate::render::{CellAdapter, RecordingGraphics};

    type G = RecordingGraphics;

    #[derive(Default)]
    struct CountingView {
        redraws: Cell<usize>,
        frames: RefCell<Vec<Rect>>,
    }

    impl HostView for CountingView {
        fn set_frame(&self, frame: Rect) {
            self.frames.borrow_mut().push(frame);
        }

        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }
    }

    fn panel(cols: Rc<dyn Dimension>, rows: Rc<dyn Dimension>) -> Rc<Panel<G>> {
        let drawer = CellAdapter::new(text_with(a1_labels(), Default::default()));
        Panel::new(cols, rows, drawer, &GridConfig::default())
    }

    fn fixed(count: u32, size: f64, wrap: bool) -> Rc<dyn Dimension> {
        Rc::new(FixedDimension::new(count, size, wrap).unwrap())
    }

    #[test]
    fn clamps_finite_axis_to_extent_minus_frame() {
        let p = panel(fixed(10, 50.0, false), fixed(10, 20.0, false));
        p.set_frame(Rect::sized(400.0, 100.0));
        p.set_content_offset(1000.0, -5.0);
        assert_eq!(p.content_offset(), Point::new(100.0, 0.0));
    }

    #[test]
    fn frame_larger_than_content_pins_to_zero() {
        let p = panel(fixed(2, 50.0, false), fixed(2, 20.0, false));
        p.set_frame(Rect::sized(400.0, 400.0));
        p.set_content_offset(30.0, 30.0);
        assert_eq!(p.content_offset(), Point::ZERO);
    }

    #[test]
    fn wrapping_and_unbounded_axes() {
        let cols = fixed(4, 10.0, true);
        let rows: Rc<dyn Dimension> = Rc::new(FixedDimension::unbounded(10.0).unwrap());
        let p = panel(cols, rows);
        p.set_frame(Rect::sized(20.0, 20.0));
        p.set_content_offset(-35.0, 1.0e6);
        assert_eq!(p.content_offset(), Point::new(-35.0, 1.0e6));
        p.set_content_offset(0.0, -3.0);
        assert_eq!(p.content_offset().y, 0.0);
    }

    #[test]
    fn redraws_only_on_change_but_always_reports_scroll() {
        let p = panel(fixed(10, 50.0, false), fixed(10, 20.0, false));
        let view = Rc::new(CountingView::default());
        p.set_view(Rc::clone(&view) as Rc<dyn HostView>);
        p.set_frame(Rect::sized(100.0, 100.0));
        let base = view.redraws.get();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        p.on_scroll().subscribe(move |pt| s.borrow_mut().push(*pt));

        p.set_content_offset(10.0, 0.0);
        p.set_content_offset(10.0, 0.0);
        assert_eq!(view.redraws.get(), base + 1);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn draws_visible_cells_in_local_space() {
        let p = panel(fixed(10, 50.0, false), fixed(10, 20.0, false));
        p.set_frame(Rect::sized(100.0, 40.0));
        p.set_content_offset(25.0, 20.0);
        let mut gr = RecordingGraphics::new(100.0, 40.0);
        p.draw(&mut gr);
        assert_eq!(p.drawn_ranges(), vec![CellRange::new(0, 2, 1, 3)]);
        assert_eq!(gr.texts()[0], "A2");
    }

    #[test]
    fn wrapping_axis_draws_one_range_per_period() {
        let p = panel(fixed(4, 10.0, true), fixed(1, 10.0, false));
        p.set_frame(Rect::sized(30.0, 10.0));
        p.set_content_offset(25.0, 0.0);
        let mut gr = RecordingGraphics::new(30.0, 10.0);
        p.draw(&mut gr);
        assert_eq!(
            p.drawn_ranges(),
            vec![CellRange::new(2, 3, 0, 0), CellRange::new(0, 1, 0, 0)]
        );
        assert_eq!(gr.texts(), vec!["C1", "D1", "A1", "B1"]);
    }

    #[test]
    fn hit_test_adds_offset_and_misses_outside() {
        let p = panel(fixed(10, 50.0, false), fixed(10, 20.0, false));
        p.set_frame(Rect::sized(100.0, 100.0));
        p.set_content_offset(60.0, 0.0);
        assert_eq!(p.hit_test(45.0, 25.0), Some(CellCoords::new(2, 1)));
        assert_eq!(p.hit_test(-100.0, 0.0), None);

        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = Rc::clone(&hits);
        p.on_long_press().subscribe(move |c| h.borrow_mut().push(*c));
        assert!(p.long_press(0.0, 0.0));
        assert!(!p.long_press(0.0, 500.0));
        assert_eq!(*hits.borrow(), vec![CellCoords::new(1, 0)]);
    }

    #[test]
    fn dimension_change_reclamps_and_redraws() {
        let cols = Rc::new(SizeTable::new(vec![100.0; 5], false).unwrap());
        let p = panel(Rc::clone(&cols) as Rc<dyn Dimension>, fixed(1, 10.0, false));
        let view = Rc::new(CountingView::default());
        p.set_view(Rc::clone(&view) as Rc<dyn HostView>);
        p.set_frame(Rect::sized(200.0, 10.0));
        p.set_content_offset(300.0, 0.0);
        let before = view.redraws.get();

        cols.set_size(4, 10.0).unwrap();
        assert_eq!(p.content_offset().x, 210.0);
        assert_eq!(view.redraws.get(), before + 1);
    }

    #[test]
    fn redraw_during_draw_is_coalesced() {
        let p = panel(fixed(10, 50.0, false), fixed(10, 20.0, false));
        let view = Rc::new(CountingView::default());
        p.set_view(Rc::clone(&view) as Rc<dyn HostView>);
        p.set_frame(Rect::sized(100.0, 100.0));
        let before = view.redraws.get();

        p.drawing.set(true);
        p.request_redraw();
        p.request_redraw();
        assert_eq!(view.redraws.get(), before);
        p.drawing.set(false);
        let mut gr = RecordingGraphics::new(100.0, 100.0);
        p.draw(&mut gr);
        assert_eq!(view.redraws.get(), before + 1);
    }
}
