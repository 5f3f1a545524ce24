//! Five-pane grid tests
//!
//! Layout of frozen panes around the center, scroll propagation, pane draw
//! order, and the scene files the CLI renders.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::rc::Rc;

use common::{fixed, label_panel, text_rects, unbounded, G};
use datagrid::layout::{Dimension, FivePaneFrames};
use datagrid::render::pipeline::{column_letters_values, row_numbers, text_with};
use datagrid::render::{CellAdapter, DrawOp, RecordingGraphics};
use datagrid::{
    AxisConfig, DataGrid, FrozenPanels, GridConfig, GridError, Panel, Point, Rect, SceneConfig,
};

struct Axes {
    cols: Rc<dyn Dimension>,
    rows: Rc<dyn Dimension>,
}

/// 50 columns of 40 by 100 rows of 20.
fn axes() -> Axes {
    Axes {
        cols: fixed(50, 40.0),
        rows: fixed(100, 20.0),
    }
}

fn header(cols: Rc<dyn Dimension>, rows: Rc<dyn Dimension>, letters: bool) -> Rc<Panel<G>> {
    let values = if letters {
        column_letters_values()
    } else {
        row_numbers()
    };
    Panel::new(
        cols,
        rows,
        CellAdapter::new(text_with(values, Default::default())),
        &GridConfig::default(),
    )
}

/// Center plus all four frozen panes: 30 high top, 25 high bottom, 60 wide
/// left and 40 wide right.
fn full_grid(a: &Axes) -> DataGrid<G> {
    let main = label_panel(&a.cols, &a.rows);
    let frozen = FrozenPanels {
        top: Some(header(Rc::clone(&a.cols), fixed(1, 30.0), true)),
        bottom: Some(header(Rc::clone(&a.cols), fixed(1, 25.0), true)),
        left: Some(header(fixed(1, 60.0), Rc::clone(&a.rows), false)),
        right: Some(header(fixed(2, 20.0), Rc::clone(&a.rows), false)),
    };
    DataGrid::new(main, frozen)
}

fn frozen_offsets(grid: &DataGrid<G>) -> [Point; 4] {
    let f = grid.frozen();
    let offset = |p: &Option<Rc<Panel<G>>>| p.as_ref().unwrap().content_offset();
    [
        offset(&f.top),
        offset(&f.bottom),
        offset(&f.left),
        offset(&f.right),
    ]
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn frozen_extents_frame_the_center() {
    let a = axes();
    let grid = full_grid(&a);
    let frames = grid.layout(800.0, 600.0);

    assert_eq!(frames.center, Rect::new(60.0, 30.0, 700.0, 545.0));
    assert_eq!(frames.top, Some(Rect::new(60.0, 0.0, 700.0, 30.0)));
    assert_eq!(frames.bottom, Some(Rect::new(60.0, 575.0, 700.0, 25.0)));
    assert_eq!(frames.left, Some(Rect::new(0.0, 30.0, 60.0, 545.0)));
    assert_eq!(frames.right, Some(Rect::new(760.0, 30.0, 40.0, 545.0)));

    assert_eq!(grid.main().frame(), frames.center);
    let right = grid.frozen().right.as_ref().unwrap();
    assert_eq!(right.frame(), frames.right.unwrap());
}

#[test]
fn center_only_grid_takes_the_whole_container() {
    let a = axes();
    let grid = DataGrid::new(label_panel(&a.cols, &a.rows), FrozenPanels::default());
    let frames = grid.layout(320.0, 200.0);
    assert_eq!(
        frames,
        FivePaneFrames {
            center: Rect::new(0.0, 0.0, 320.0, 200.0),
            top: None,
            bottom: None,
            left: None,
            right: None,
        }
    );
}

#[test]
fn unbounded_frozen_pane_is_laid_out_empty() {
    let a = axes();
    let frozen = FrozenPanels {
        left: Some(header(unbounded(30.0), Rc::clone(&a.rows), false)),
        ..FrozenPanels::default()
    };
    let grid = DataGrid::new(label_panel(&a.cols, &a.rows), frozen);
    let frames = grid.layout(400.0, 300.0);
    assert_eq!(frames.left, Some(Rect::new(0.0, 0.0, 0.0, 300.0)));
    assert_eq!(frames.center, Rect::new(0.0, 0.0, 400.0, 300.0));

    // The empty pane is skipped entirely.
    let mut gr = RecordingGraphics::new(400.0, 300.0);
    grid.draw(&mut gr);
    assert_eq!(gr.op_counts().get("clip"), Some(&1));
}

// ============================================================================
// Scroll propagation
// ============================================================================

#[test]
fn frozen_panes_follow_the_shared_axis() {
    let a = axes();
    let grid = full_grid(&a);
    grid.layout(800.0, 600.0);
    grid.set_content_offset(200.0, 300.0);

    assert_eq!(grid.main().content_offset(), Point::new(200.0, 300.0));
    assert_eq!(
        frozen_offsets(&grid),
        [
            Point::new(200.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(0.0, 300.0),
            Point::new(0.0, 300.0),
        ]
    );
}

#[test]
fn propagated_offsets_are_clamped() {
    let a = axes();
    // The center scrolls down to 2000 - 545; the left pane's 300 fit its frame.
    let frozen = FrozenPanels {
        left: Some(header(fixed(1, 60.0), fixed(15, 20.0), false)),
        ..FrozenPanels::default()
    };
    let grid = DataGrid::new(label_panel(&a.cols, &a.rows), frozen);
    grid.layout(800.0, 545.0);
    grid.set_content_offset(5000.0, 5000.0);

    assert_eq!(grid.main().content_offset(), Point::new(1260.0, 1455.0));
    let left = grid.frozen().left.as_ref().unwrap();
    assert_eq!(left.content_offset(), Point::ZERO);
}

#[test]
fn scrolling_a_frozen_pane_does_not_move_the_center() {
    let a = axes();
    let grid = full_grid(&a);
    grid.layout(800.0, 600.0);
    grid.frozen().top.as_ref().unwrap().set_content_offset(120.0, 0.0);
    assert_eq!(grid.main().content_offset(), Point::ZERO);
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn panes_draw_clipped_in_setup_order() {
    let a = axes();
    let grid = full_grid(&a);
    let frames = grid.layout(800.0, 600.0);
    let mut gr = RecordingGraphics::new(800.0, 600.0);
    grid.draw(&mut gr);

    let clips: Vec<Rect> = gr
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Clip { rect } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(
        clips,
        vec![
            frames.center,
            frames.left.unwrap(),
            frames.top.unwrap(),
            frames.right.unwrap(),
            frames.bottom.unwrap(),
        ]
    );
    assert_eq!(gr.state_depth(), 0);
}

#[test]
fn header_row_tracks_horizontal_scroll() {
    let a = axes();
    let grid = full_grid(&a);
    grid.layout(800.0, 600.0);
    grid.set_content_offset(40.0, 0.0);

    let mut gr = RecordingGraphics::new(800.0, 600.0);
    grid.draw(&mut gr);
    let texts = text_rects(&gr);

    // Center first: B1 lands at the center frame's origin.
    assert_eq!(texts[0], ("B1".to_string(), Rect::new(60.0, 30.0, 40.0, 20.0)));
    let letter = texts
        .iter()
        .find(|(t, r)| t == "B" && r.y == 0.0)
        .expect("top header draws column B");
    assert_eq!(letter.1, Rect::new(60.0, 0.0, 40.0, 30.0));
    // The left header did not scroll: row 1 is still at the top.
    let number = texts
        .iter()
        .find(|(_, r)| r.x == 0.0)
        .expect("left header draws row numbers");
    assert_eq!(number.0, "1");
}

#[test]
fn setup_visits_every_pane() {
    let a = axes();
    let grid = full_grid(&a);
    let mut main_seen = false;
    let mut frozen_seen = 0;
    grid.setup(|_| main_seen = true, |_| frozen_seen += 1);
    assert!(main_seen);
    assert_eq!(frozen_seen, 4);
}

// ============================================================================
// Scene files
// ============================================================================

const SCENE: &str = r#"{
    "grid": { "tile_margin_cols": 4 },
    "columns": { "count": 26, "size": 80 },
    "rows": { "sizes": [20, 30, 20, 40], "wraparound": true },
    "width": 640,
    "height": 480,
    "offset": { "x": 100, "y": 10 },
    "header_row": 24,
    "tile_cache": true,
    "selected": ["B2", "A1:C3"],
    "taps": [{ "x": 5, "y": 5 }]
}"#;

#[test]
fn scene_parses_with_defaults() {
    let scene = SceneConfig::from_json(SCENE).unwrap();
    assert_eq!(scene.grid.tile_margin_cols, 4);
    assert_eq!(scene.grid.tile_margin_rows, 2);
    assert_eq!(scene.columns, AxisConfig::fixed(Some(26), 80.0));
    assert_eq!(scene.header_row, Some(24.0));
    assert_eq!(scene.header_column, None);
    assert_eq!(scene.offset, Point::new(100.0, 10.0));
    assert_eq!(scene.taps, vec![Point::new(5.0, 5.0)]);

    let rows = scene.rows.build().unwrap();
    assert!(rows.wraparound());
    assert_eq!(rows.count(), Some(4));
    assert_eq!(rows.size_of(3), 40.0);
}

#[test]
fn scene_validation_rejects_bad_values() {
    let negative = SCENE.replace("\"width\": 640", "\"width\": -1");
    assert!(matches!(
        SceneConfig::from_json(&negative),
        Err(GridError::Config(_))
    ));

    let zero_header = SCENE.replace("\"header_row\": 24", "\"header_row\": 0");
    assert!(matches!(
        SceneConfig::from_json(&zero_header),
        Err(GridError::InvalidSize { .. })
    ));

    assert!(matches!(
        SceneConfig::from_json("{ \"width\": 1 }"),
        Err(GridError::Json(_))
    ));
}

#[test]
fn scene_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("datagrid-scene-{}.json", std::process::id()));
    std::fs::write(&path, SCENE).unwrap();
    let scene = SceneConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(scene.selected, vec!["B2", "A1:C3"]);

    let missing = SceneConfig::load(&path);
    assert!(matches!(missing, Err(GridError::Io(_))));
}

#[test]
fn unbounded_wrapping_axis_is_rejected() {
    let axis: AxisConfig = serde_json::from_str(r#"{ "size": 10, "wraparound": true }"#).unwrap();
    assert!(matches!(
        axis.build(),
        Err(GridError::WraparoundWithoutCount)
    ));
}
