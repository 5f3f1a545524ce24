//! Ready-made stages built on [`StageBuilder`].

use std::rc::{Rc, Weak};

use crate::observer::{subscribe_weak, Notifier};
use crate::render::backend::{Graphics, Padding, TextFormat};
use crate::render::colors::Color;
use crate::types::{CellTarget, Rect, Selection, SelectionChange};

use super::stage::{NoInputs, StageBuilder};
use super::values::{Steady, ValueProvider, Values};
use super::Stage;

/// Fill the cell with its color. Cells without a color draw nothing.
pub fn fill<G: Graphics + 'static>(colors: Values<Color>) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new()
        .input(colors)
        .paint(|color, _, r, gr: &mut G| {
            gr.set_color(*color);
            gr.fill_rect(r);
        })
}

/// Fill every cell with one color.
pub fn fill_color<G: Graphics + 'static>(color: Color) -> Stage<G> {
    fill(Steady::new(color))
}

/// Draw the cell's string with its format.
pub fn text<G: Graphics + 'static>(
    texts: Values<String>,
    formats: Values<TextFormat>,
) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new()
        .input(texts)
        .input(formats)
        .paint(|(s, fmt), _, r, gr: &mut G| {
            gr.set_font(&fmt.font);
            gr.set_color(fmt.color);
            gr.draw_text(s, r, fmt.align, fmt.valign);
        })
}

/// Draw the cell's string with one format for every cell.
pub fn text_with<G: Graphics + 'static>(texts: Values<String>, format: TextFormat) -> Stage<G> {
    text(texts, Steady::new(format))
}

pub fn oval<G: Graphics + 'static>(color: Color) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new()
        .input(Steady::new(color) as Values<Color>)
        .paint(|color, _, r, gr: &mut G| {
            gr.set_color(*color);
            gr.fill_oval(r);
        })
}

/// Corner radius used by [`rounded_rect`].
pub fn rounded_rect_radius(r: Rect) -> f64 {
    r.width.min(r.height) / 6.0
}

pub fn rounded_rect<G: Graphics + 'static>(color: Color) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new()
        .input(Steady::new(color) as Values<Color>)
        .paint(|color, _, r, gr: &mut G| {
            gr.set_color(*color);
            gr.fill_rounded_rect(r, rounded_rect_radius(r));
        })
}

/// Inset the rect per cell before drawing `child`.
///
/// A cell without a padding value draws nothing.
pub fn padding<G: Graphics + 'static>(pads: Values<Padding>, child: Stage<G>) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new()
        .input(pads)
        .child_rect(|pad, r| pad.apply(r))
        .child(child)
        .build()
}

/// Inset every cell by the same padding.
pub fn padded<G: Graphics + 'static>(pad: Padding, child: Stage<G>) -> Stage<G> {
    padding(Steady::new(pad), child)
}

/// Draw each stage over the same rect, first to last.
pub fn layers<G: Graphics + 'static>(stages: Vec<Stage<G>>) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new().children(stages).build()
}

/// Whether each cell is selected, as a value provider.
pub struct SelectedCells {
    selection: Rc<Selection>,
    changed: Notifier<CellTarget>,
}

impl SelectedCells {
    pub fn new(selection: &Rc<Selection>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(
                selection.changed(),
                weak,
                |me: &Self, change: &SelectionChange| {
                    me.changed.notify(&change.key.target());
                },
            );
            Self {
                selection: Rc::clone(selection),
                changed: Notifier::new(),
            }
        })
    }
}

impl ValueProvider<bool> for SelectedCells {
    fn value(&self, at: CellTarget) -> Option<bool> {
        Some(
            self.selection
                .contains_cell(at.column.index()?, at.row.index()?),
        )
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

/// Fill selected cells with `color`.
pub fn fill_if_selected<G: Graphics + 'static>(
    selection: &Rc<Selection>,
    color: Color,
) -> Stage<G> {
    StageBuilder::<G, NoInputs>::new()
        .input(SelectedCells::new(selection) as Values<bool>)
        .paint(move |selected, _, r, gr: &mut G| {
            if *selected {
                gr.set_color(color);
                gr.fill_rect(r);
            }
        })
}
