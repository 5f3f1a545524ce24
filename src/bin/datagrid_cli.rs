//! CLI tool for datagrid - renders a scene headlessly and outputs a JSON report
//!
//! Usage:
//!   datagrid_cli <scene.json>              # Output JSON to stdout
//!   datagrid_cli <scene.json> -o out.json  # Output JSON to file
//!
//! Set `RUST_LOG=debug` to see cache and tile activity on stderr.

#![allow(clippy::exit)]

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use datagrid::cell_ref::parse_cell_range;
use datagrid::layout::{Dimension, FivePaneFrames, FixedDimension};
use datagrid::render::pipeline::{
    a1_labels, column_letters_values, fill_color, fill_if_selected, layers, padded, row_numbers,
    text_with, CellImageCache, Stage,
};
use datagrid::render::{
    CellAdapter, Color, DrawOp, Padding, RecordingGraphics, TextAlign, TextFormat, TileStats,
    VerticalAlign, ViewportTileCache, VisibleStage,
};
use datagrid::viewer::{select_on_tap, DataGrid, FrozenPanels, Panel};
use datagrid::{
    CellCoords, CellRange, GridConfig, GridError, Point, Result, SceneConfig, Selection,
    SelectionKey,
};

type G = RecordingGraphics;

#[derive(Serialize)]
struct PaneReport {
    pane: &'static str,
    offset: Point,
    ranges: Vec<CellRange>,
}

#[derive(Serialize)]
struct Report<'a> {
    version: String,
    frames: FivePaneFrames,
    panes: Vec<PaneReport>,
    selected: Vec<CellCoords>,
    tiles: Option<TileStats>,
    cached_cells: usize,
    captures: usize,
    live_images: usize,
    op_counts: BTreeMap<&'static str, usize>,
    ops: &'a [DrawOp],
}

/// Boxed, centered label on white.
fn label_stage(texts: Stage<G>) -> Stage<G> {
    layers(vec![
        fill_color(Color::WHITE),
        padded(Padding::uniform(1.0), padded(Padding::uniform(4.0), texts)),
    ])
}

fn centered() -> TextFormat {
    TextFormat::default().with_align(TextAlign::Center, VerticalAlign::Middle)
}

fn header_panel(
    cols: Rc<dyn Dimension>,
    rows: Rc<dyn Dimension>,
    stage: Stage<G>,
    grid: &GridConfig,
) -> Rc<Panel<G>> {
    Panel::new(
        cols,
        rows,
        CellAdapter::new(layers(vec![fill_color(Color::GRAY), stage])),
        grid,
    )
}

fn select_ranges(selection: &Selection, labels: &[String]) -> Result<()> {
    for label in labels {
        let range = parse_cell_range(label)
            .ok_or_else(|| GridError::Config(format!("bad cell range {label:?}")))?;
        for cell in range.cells() {
            selection.select(SelectionKey::Cell(cell));
        }
    }
    Ok(())
}

fn run(scene: &SceneConfig) -> Result<String> {
    let cols = scene.columns.build()?;
    let rows = scene.rows.build()?;

    let selection = Rc::new(Selection::new());
    select_ranges(&selection, &scene.selected)?;

    let cells = CellImageCache::new(
        label_stage(text_with(a1_labels(), centered())),
        cols.as_ref(),
        rows.as_ref(),
    );
    let body: Stage<G> = layers(vec![
        Rc::clone(&cells) as Stage<G>,
        fill_if_selected(&selection, Color::rgba(0, 0, 255, 64)),
    ]);
    let adapter: VisibleStage<G> = CellAdapter::new(body);
    let tiles = scene.tile_cache.then(|| {
        ViewportTileCache::new(
            Rc::clone(&adapter),
            Rc::clone(&cols),
            Rc::clone(&rows),
            &scene.grid,
        )
    });
    let drawer = match &tiles {
        Some(t) => Rc::clone(t) as VisibleStage<G>,
        None => adapter,
    };

    let main = Panel::new(Rc::clone(&cols), Rc::clone(&rows), drawer, &scene.grid);
    let mut frozen = FrozenPanels::default();
    if let Some(h) = scene.header_row {
        let header: Rc<dyn Dimension> = Rc::new(FixedDimension::new(1, h, false)?);
        let letters = text_with(column_letters_values(), centered());
        frozen.top = Some(header_panel(Rc::clone(&cols), header, letters, &scene.grid));
    }
    if let Some(w) = scene.header_column {
        let header: Rc<dyn Dimension> = Rc::new(FixedDimension::new(1, w, false)?);
        let numbers = text_with(row_numbers(), centered());
        frozen.left = Some(header_panel(header, Rc::clone(&rows), numbers, &scene.grid));
    }
    let grid = DataGrid::new(main, frozen);
    select_on_tap(grid.main(), &selection);

    let frames = grid.layout(scene.width, scene.height);
    grid.set_content_offset(scene.offset.x, scene.offset.y);

    let mut gr = RecordingGraphics::new(scene.width, scene.height);
    grid.draw(&mut gr);
    if !scene.taps.is_empty() {
        for tap in &scene.taps {
            let hit = grid.main().single_tap(tap.x, tap.y);
            info!(x = tap.x, y = tap.y, hit, "Applied tap");
        }
        gr.clear();
        grid.draw(&mut gr);
    }

    let mut panes = vec![("main", grid.main())];
    if let Some(p) = &grid.frozen().top {
        panes.push(("top", p));
    }
    if let Some(p) = &grid.frozen().left {
        panes.push(("left", p));
    }
    let report = Report {
        version: datagrid::version(),
        frames,
        panes: panes
            .into_iter()
            .map(|(pane, p)| PaneReport {
                pane,
                offset: p.content_offset(),
                ranges: p.drawn_ranges(),
            })
            .collect(),
        selected: selection.selected_cells(),
        tiles: tiles.as_ref().map(|t| t.stats()),
        cached_cells: cells.cached_len(),
        captures: gr.captures(),
        live_images: gr.live_images(),
        op_counts: gr.op_counts(),
        ops: gr.ops(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let Some(input_path) = args.get(1) else {
        eprintln!("Usage: datagrid_cli <scene.json> [-o output.json]");
        std::process::exit(1);
    };
    let output_path = match (args.get(2), args.get(3)) {
        (Some(flag), Some(path)) if flag == "-o" => Some(path),
        _ => None,
    };

    let scene = match SceneConfig::load(Path::new(input_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading {input_path}: {e}");
            std::process::exit(1);
        }
    };

    let json = match run(&scene) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error rendering scene: {e}");
            std::process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {path}: {e}");
                std::process::exit(1);
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut out = io::stdout();
            if let Err(e) = out.write_all(json.as_bytes()).and_then(|()| writeln!(out)) {
                eprintln!("Error writing output: {e}");
                std::process::exit(1);
            }
        }
    }
}
