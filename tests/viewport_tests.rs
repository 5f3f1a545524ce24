//! Viewport resolution, hit testing and scroll clamping tests
//!
//! Covers visible index calculation on every kind of axis, the wraparound
//! window arithmetic, and how panels clamp and tile their content offset.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::rc::Rc;

use common::{attach_view, fixed, label_panel, recorder_panel, table, text_rects, unbounded, wrapping};
use datagrid::layout::{
    calc_visible, calc_visible_bounded, find_index, find_index_bounded, total_size, which_window,
    BoxGetter, Dimension, FnDimension,
};
use datagrid::{CellCoords, CellRange, GridError, Point, Rect, Which};
use test_case::test_case;

// ============================================================================
// calc_visible
// ============================================================================

#[test_case(0.0, 100.0 => Some((0, 2)); "first window")]
#[test_case(75.0, 50.0 => Some((1, 2)); "straddles edges")]
#[test_case(50.0, 50.0 => Some((1, 2)); "end on boundary includes next")]
#[test_case(450.0, 200.0 => Some((9, 9)); "clamped to last")]
#[test_case(500.0, 10.0 => None; "past the end")]
#[test_case(10.0, 0.0 => None; "zero length")]
fn fixed_axis_visible(begin: f64, len: f64) -> Option<(u32, u32)> {
    let dim = fixed(10, 50.0);
    calc_visible(begin, len, dim.as_ref())
        .unwrap()
        .map(|v| (v.first, v.last))
}

#[test]
fn variable_axis_reports_edges() {
    let dim = table(&[10.0, 20.0, 30.0, 40.0]);
    let v = calc_visible(15.0, 20.0, dim.as_ref()).unwrap().unwrap();
    assert_eq!((v.first, v.last), (1, 2));
    let e = v.edges.edge(2).unwrap();
    assert_eq!((e.start, e.length), (30.0, 30.0));
    assert!(v.edges.edge(3).is_none());
}

#[test]
fn unbounded_variable_scan_is_bounded() {
    let dim = FnDimension::new(None, false, |_| 1.0).unwrap();
    let err = calc_visible_bounded(1.0e9, 10.0, &dim, 1000).unwrap_err();
    assert!(matches!(err, GridError::ScanLimit { limit: 1000 }));
}

#[test]
fn invalid_size_is_reported_with_index() {
    let dim = FnDimension::new(Some(5), false, |i| if i == 3 { 0.0 } else { 10.0 }).unwrap();
    let err = calc_visible(0.0, 100.0, &dim).unwrap_err();
    assert!(matches!(err, GridError::InvalidSize { index: Some(3), .. }));
}

#[test]
fn box_getter_from_two_axes() {
    let cols = table(&[10.0, 20.0, 30.0]);
    let rows = fixed(100, 15.0);
    let c = calc_visible(0.0, 60.0, cols.as_ref()).unwrap().unwrap();
    let r = calc_visible(0.0, 30.0, rows.as_ref()).unwrap().unwrap();
    let boxes = BoxGetter::new(c.edges, r.edges);
    assert_eq!(boxes.cell_box(2, 1), Some(Rect::new(30.0, 15.0, 30.0, 15.0)));
    assert_eq!(
        boxes.range_box(&CellRange::new(1, 2, 0, 1)),
        Some(Rect::new(10.0, 0.0, 50.0, 30.0))
    );
}

// ============================================================================
// Hit testing
// ============================================================================

#[test_case(-200.0 => -2)]
#[test_case(-0.5 => -1)]
#[test_case(0.0 => 0)]
#[test_case(99.99 => 0)]
#[test_case(100.0 => 1)]
fn which_window_floors(x: f64) -> i64 {
    which_window(x, 100.0)
}

#[test]
fn find_index_on_each_axis_kind() {
    assert_eq!(find_index(125.0, fixed(10, 50.0).as_ref()).unwrap(), Some(2));
    assert_eq!(find_index(525.0, fixed(10, 50.0).as_ref()).unwrap(), None);
    assert_eq!(find_index(-1.0, fixed(10, 50.0).as_ref()).unwrap(), None);
    assert_eq!(find_index(-1.0, wrapping(4, 25.0).as_ref()).unwrap(), Some(3));
    assert_eq!(find_index(1.0e7, unbounded(10.0).as_ref()).unwrap(), Some(1_000_000));
    assert_eq!(find_index(35.0, table(&[10.0, 20.0, 30.0]).as_ref()).unwrap(), Some(2));

    let endless = FnDimension::new(None, false, |_| 1.0).unwrap();
    assert!(find_index_bounded(5000.0, &endless, 100).is_err());
}

#[test]
fn total_size_by_axis_kind() {
    assert_eq!(total_size(fixed(10, 50.0).as_ref()).unwrap(), Some(500.0));
    assert_eq!(total_size(table(&[1.0, 2.0, 3.5]).as_ref()).unwrap(), Some(6.5));
    assert_eq!(total_size(unbounded(5.0).as_ref()).unwrap(), None);
}

// ============================================================================
// Panel clamping
// ============================================================================

#[test]
fn offset_past_end_clamps_to_extent_minus_frame() {
    let (panel, _) = recorder_panel(&fixed(10, 50.0), &fixed(10, 50.0), Rect::sized(400.0, 400.0));
    panel.set_content_offset(1000.0, 0.0);
    assert_eq!(panel.content_offset(), Point::new(100.0, 0.0));
}

#[test_case(-50.0, -50.0 => (0.0, 0.0); "negative clamps to zero")]
#[test_case(300.0, 1.0e6 => (300.0, 1.0e6); "unbounded rows have no max")]
#[test_case(900.0, 5.0 => (600.0, 5.0); "columns capped")]
fn finite_columns_unbounded_rows(x: f64, y: f64) -> (f64, f64) {
    let (panel, _) = recorder_panel(&fixed(10, 100.0), &unbounded(20.0), Rect::sized(400.0, 300.0));
    panel.set_content_offset(x, y);
    let p = panel.content_offset();
    (p.x, p.y)
}

#[test]
fn wrapping_axis_is_never_clamped() {
    let (panel, _) = recorder_panel(&wrapping(10, 10.0), &wrapping(5, 10.0), Rect::sized(30.0, 30.0));
    panel.set_content_offset(-1234.0, 98765.0);
    assert_eq!(panel.content_offset(), Point::new(-1234.0, 98765.0));
}

#[test]
fn shrinking_frame_keeps_offset_and_growing_reclamps() {
    let (panel, _) = recorder_panel(&fixed(10, 50.0), &fixed(1, 50.0), Rect::sized(200.0, 50.0));
    panel.set_content_offset(300.0, 0.0);
    assert_eq!(panel.content_offset().x, 300.0);
    panel.set_frame(Rect::sized(400.0, 50.0));
    assert_eq!(panel.content_offset().x, 100.0);
}

#[test]
fn unchanged_offset_does_not_redraw() {
    let (panel, _) = recorder_panel(&fixed(10, 50.0), &fixed(10, 50.0), Rect::sized(100.0, 100.0));
    let view = attach_view(&panel);
    panel.set_content_offset(0.0, 0.0);
    assert_eq!(view.redraws.get(), 0);
    panel.set_content_offset(2000.0, 0.0);
    panel.set_content_offset(2000.0, 0.0);
    assert_eq!(view.redraws.get(), 1);
}

// ============================================================================
// Wraparound tiling
// ============================================================================

#[test]
fn wrapping_columns_repeat_across_the_seam() {
    let (panel, recorder) = recorder_panel(&wrapping(4, 25.0), &fixed(2, 10.0), Rect::sized(100.0, 20.0));
    panel.set_content_offset(60.0, 0.0);
    panel.draw(&mut common::G::new(100.0, 20.0));
    assert_eq!(
        recorder.ranges(),
        vec![CellRange::new(2, 3, 0, 1), CellRange::new(0, 2, 0, 1)]
    );
    // Second period starts at world x = 100, i.e. 40 px into the view.
    assert_eq!(
        recorder.offsets(),
        vec![Point::new(-60.0, 0.0), Point::new(40.0, 0.0)]
    );
}

#[test]
fn negative_offset_on_wrapping_axis_draws_previous_period() {
    let (panel, recorder) = recorder_panel(&wrapping(4, 25.0), &fixed(1, 10.0), Rect::sized(50.0, 10.0));
    panel.set_content_offset(-30.0, 0.0);
    panel.draw(&mut common::G::new(50.0, 10.0));
    assert_eq!(
        recorder.ranges(),
        vec![CellRange::new(2, 3, 0, 0), CellRange::new(0, 0, 0, 0)]
    );
    assert_eq!(
        recorder.offsets(),
        vec![Point::new(-70.0, 0.0), Point::new(30.0, 0.0)]
    );
}

#[test]
fn wrapping_both_axes_tiles_a_grid_of_windows() {
    let (panel, recorder) = recorder_panel(&wrapping(2, 10.0), &wrapping(2, 10.0), Rect::sized(30.0, 30.0));
    panel.set_content_offset(15.0, 15.0);
    panel.draw(&mut common::G::new(30.0, 30.0));
    // [15, 45) spans periods 0, 1 and 2 on both axes.
    assert_eq!(recorder.ranges().len(), 9);
}

#[test]
fn labels_repeat_in_view_space() {
    let cols = wrapping(3, 20.0);
    let rows = fixed(1, 10.0);
    let panel = label_panel(&cols, &rows);
    panel.set_frame(Rect::sized(80.0, 10.0));
    panel.set_content_offset(30.0, 0.0);
    let mut gr = common::G::new(80.0, 10.0);
    panel.draw(&mut gr);
    let texts = text_rects(&gr);
    let labels: Vec<&str> = texts.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(labels, vec!["B1", "C1", "A1", "B1", "C1"]);
    assert_eq!(texts[0].1, Rect::new(-10.0, 0.0, 20.0, 10.0));
    assert_eq!(texts[2].1, Rect::new(30.0, 0.0, 20.0, 10.0));
}

#[test]
fn variable_axis_change_reclamps_panel() {
    let cols = table(&[100.0, 100.0, 100.0, 100.0]);
    let (panel, _) = recorder_panel(
        &(Rc::clone(&cols) as Rc<dyn Dimension>),
        &fixed(1, 10.0),
        Rect::sized(100.0, 10.0),
    );
    panel.set_content_offset(300.0, 0.0);
    cols.set_size(3, 50.0).unwrap();
    assert_eq!(panel.content_offset().x, 250.0);
}

// ============================================================================
// Panel hit testing
// ============================================================================

#[test]
fn taps_resolve_through_content_offset() {
    let (panel, _) = recorder_panel(&fixed(10, 50.0), &fixed(10, 20.0), Rect::sized(200.0, 100.0));
    panel.set_content_offset(70.0, 30.0);
    assert_eq!(panel.hit_test(0.0, 0.0), Some(CellCoords::new(1, 1)));
    assert_eq!(panel.hit_test(199.0, 99.0), Some(CellCoords::new(5, 6)));
}

#[test]
fn taps_on_wrapping_axis_land_in_period() {
    let (panel, _) = recorder_panel(&wrapping(4, 25.0), &fixed(1, 10.0), Rect::sized(50.0, 10.0));
    panel.set_content_offset(-30.0, 0.0);
    assert_eq!(panel.hit_test(0.0, 5.0), Some(CellCoords::new(2, 0)));
    assert_eq!(panel.hit_test(35.0, 5.0), Some(CellCoords::new(0, 0)));
}

#[test]
fn tap_outside_cells_is_unhandled() {
    let (panel, _) = recorder_panel(&fixed(2, 50.0), &fixed(2, 20.0), Rect::sized(300.0, 300.0));
    let fired = Rc::new(std::cell::Cell::new(0));
    let f = Rc::clone(&fired);
    panel.on_single_tap().subscribe(move |_| f.set(f.get() + 1));
    panel.on_double_tap().subscribe(|_| panic!("double tap fired"));
    assert!(!panel.single_tap(250.0, 10.0));
    assert!(panel.single_tap(10.0, 10.0));
    assert_eq!(fired.get(), 1);
}

#[test]
fn dimension_notification_carries_which() {
    let cols = table(&[10.0, 10.0]);
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    cols.changed().subscribe(move |w| s.borrow_mut().push(*w));
    cols.set_size(1, 12.0).unwrap();
    assert_eq!(*seen.borrow(), vec![Which::Index(1)]);
}
