//! The generic draw stage and its builder.
//!
//! A [`DrawCell`] fetches zero, one or two per-cell values, paints with them,
//! and then draws its child stages over the same (optionally transformed)
//! rect. When any value is missing the stage and its children draw nothing.

use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::observer::{subscribe_weak, Notifier};
use crate::render::backend::Graphics;
use crate::types::{CellCoords, CellRange, CellTarget, Rect};

use super::values::Values;
use super::{CellStage, Stage};

/// The value providers a stage reads from.
pub trait Inputs: 'static {
    type Values;

    fn fetch(&self, at: CellTarget) -> Option<Self::Values>;
    fn begin_update(&self, range: &CellRange);
    fn end_update(&self);
    fn notifiers(&self) -> Vec<&Notifier<CellTarget>>;
}

/// No per-cell values; the stage always draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInputs;

impl Inputs for NoInputs {
    type Values = ();

    fn fetch(&self, _at: CellTarget) -> Option<()> {
        Some(())
    }

    fn begin_update(&self, _range: &CellRange) {}

    fn end_update(&self) {}

    fn notifiers(&self) -> Vec<&Notifier<CellTarget>> {
        Vec::new()
    }
}

pub struct OneInput<A>(pub Values<A>);

impl<A: 'static> Inputs for OneInput<A> {
    type Values = A;

    fn fetch(&self, at: CellTarget) -> Option<A> {
        self.0.value(at)
    }

    fn begin_update(&self, range: &CellRange) {
        self.0.begin_update(range);
    }

    fn end_update(&self) {
        self.0.end_update();
    }

    fn notifiers(&self) -> Vec<&Notifier<CellTarget>> {
        vec![self.0.changed()]
    }
}

pub struct TwoInputs<A, B>(pub Values<A>, pub Values<B>);

impl<A: 'static, B: 'static> Inputs for TwoInputs<A, B> {
    type Values = (A, B);

    fn fetch(&self, at: CellTarget) -> Option<(A, B)> {
        Some((self.0.value(at)?, self.1.value(at)?))
    }

    fn begin_update(&self, range: &CellRange) {
        self.0.begin_update(range);
        self.1.begin_update(range);
    }

    fn end_update(&self) {
        self.0.end_update();
        self.1.end_update();
    }

    fn notifiers(&self) -> Vec<&Notifier<CellTarget>> {
        vec![self.0.changed(), self.1.changed()]
    }
}

/// Painter called with the fetched values, the cell and its rect.
pub type Paint<G, V> = Box<dyn Fn(&V, CellCoords, Rect, &mut G)>;

/// Rect transform applied before the children draw.
pub type ChildRect<V> = Box<dyn Fn(&V, Rect) -> Rect>;

/// Generic draw stage.
pub struct DrawCell<G: Graphics, I: Inputs> {
    inputs: I,
    paint: Option<Paint<G, I::Values>>,
    child_rect: Option<ChildRect<I::Values>>,
    children: Vec<Stage<G>>,
    changed: Notifier<CellTarget>,
}

impl<G: Graphics + 'static, I: Inputs> DrawCell<G, I> {
    pub fn children(&self) -> &[Stage<G>] {
        &self.children
    }
}

impl<G: Graphics + 'static, I: Inputs> CellStage<G> for DrawCell<G, I> {
    fn begin_update(&self, range: &CellRange) {
        self.inputs.begin_update(range);
        for child in &self.children {
            child.begin_update(range);
        }
    }

    fn end_update(&self) {
        self.inputs.end_update();
        for child in &self.children {
            child.end_update();
        }
    }

    fn draw_cell(&self, col: u32, row: u32, rect: Rect, gr: &mut G) {
        let Some(values) = self.inputs.fetch(CellTarget::cell(col, row)) else {
            return;
        };
        if let Some(paint) = &self.paint {
            paint(&values, CellCoords::new(col, row), rect, gr);
        }
        if self.children.is_empty() {
            return;
        }
        let child_rect = self.child_rect.as_ref().map_or(rect, |f| f(&values, rect));
        for child in &self.children {
            child.draw_cell(col, row, child_rect, gr);
        }
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

/// Type-state builder for [`DrawCell`].
///
/// Inputs are added first (none, then one, then two) and before any rect
/// transform; `paint` or `build` finishes the stage.
pub struct StageBuilder<G: Graphics, I: Inputs> {
    inputs: I,
    child_rect: Option<ChildRect<I::Values>>,
    children: Vec<Stage<G>>,
    _graphics: PhantomData<fn(&mut G)>,
}

impl<G: Graphics + 'static> Default for StageBuilder<G, NoInputs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Graphics + 'static> StageBuilder<G, NoInputs> {
    pub fn new() -> Self {
        Self {
            inputs: NoInputs,
            child_rect: None,
            children: Vec::new(),
            _graphics: PhantomData,
        }
    }

    pub fn input<A: 'static>(self, values: Values<A>) -> StageBuilder<G, OneInput<A>> {
        debug_assert!(self.child_rect.is_none(), "inputs must precede child_rect");
        StageBuilder {
            inputs: OneInput(values),
            child_rect: None,
            children: self.children,
            _graphics: PhantomData,
        }
    }
}

impl<G: Graphics + 'static, A: 'static> StageBuilder<G, OneInput<A>> {
    pub fn input<B: 'static>(self, values: Values<B>) -> StageBuilder<G, TwoInputs<A, B>> {
        debug_assert!(self.child_rect.is_none(), "inputs must precede child_rect");
        StageBuilder {
            inputs: TwoInputs(self.inputs.0, values),
            child_rect: None,
            children: self.children,
            _graphics: PhantomData,
        }
    }
}

impl<G: Graphics + 'static, I: Inputs> StageBuilder<G, I> {
    #[must_use]
    pub fn child(mut self, stage: Stage<G>) -> Self {
        self.children.push(stage);
        self
    }

    #[must_use]
    pub fn children(mut self, stages: impl IntoIterator<Item = Stage<G>>) -> Self {
        self.children.extend(stages);
        self
    }

    /// Transform the rect handed to the children, using the fetched values.
    #[must_use]
    pub fn child_rect(mut self, f: impl Fn(&I::Values, Rect) -> Rect + 'static) -> Self {
        self.child_rect = Some(Box::new(f));
        self
    }

    /// Finish with a painter.
    pub fn paint(
        self,
        f: impl Fn(&I::Values, CellCoords, Rect, &mut G) + 'static,
    ) -> Rc<DrawCell<G, I>> {
        self.finish(Some(Box::new(f)))
    }

    /// Finish without a painter (pure composition).
    pub fn build(self) -> Rc<DrawCell<G, I>> {
        self.finish(None)
    }

    fn finish(self, paint: Option<Paint<G, I::Values>>) -> Rc<DrawCell<G, I>> {
        let Self {
            inputs,
            child_rect,
            children,
            ..
        } = self;
        Rc::new_cyclic(|weak: &Weak<DrawCell<G, I>>| {
            let upstream = inputs
                .notifiers()
                .into_iter()
                .chain(children.iter().map(|c| c.changed()));
            for n in upstream {
                subscribe_weak(n, weak, |me: &DrawCell<G, I>, e| me.changed.notify(e));
            }
            DrawCell {
                inputs,
                paint,
                child_rect,
                children,
                changed: Notifier::new(),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::render::pipeline::values::{FromFn, Steady};
    use crate::render::recording::{DrawOp, RecordingGraphics};
    use std::cell::Cell;

    type G = RecordingGraphics;

    fn marker(label: &'static str) -> Stage<G> {
        StageBuilder::<G, NoInputs>::new().paint(move |(), _, r, gr: &mut G| {
            gr.draw_text(label, r, Default::default(), Default::default());
        })
    }

    #[test]
    fn missing_value_skips_paint_and_children() {
        let odd_rows = FromFn::new(|at| at.row.index().filter(|r| r % 2 == 1));
        let stage = StageBuilder::<G, NoInputs>::new()
            .input(odd_rows as Values<u32>)
            .child(marker("child"))
            .paint(|r, _, rect, gr: &mut G| {
                gr.draw_text(&r.to_string(), rect, Default::default(), Default::default());
            });
        let mut gr = RecordingGraphics::new(100.0, 100.0);
        stage.draw_cell(0, 0, Rect::sized(10.0, 10.0), &mut gr);
        assert!(gr.ops().is_empty());
        stage.draw_cell(0, 1, Rect::sized(10.0, 10.0), &mut gr);
        assert_eq!(gr.texts(), vec!["1", "child"]);
    }

    #[test]
    fn two_inputs_need_both() {
        let a = FromFn::new(|at| at.column.index());
        let b = FromFn::new(|at| at.column.index().filter(|c| *c > 0).map(|c| c * 2));
        let stage = StageBuilder::<G, NoInputs>::new()
            .input(a as Values<u32>)
            .input(b as Values<u32>)
            .paint(|(x, y), _, r, gr: &mut G| {
                gr.draw_text(&format!("{x}:{y}"), r, Default::default(), Default::default());
            });
        let mut gr = RecordingGraphics::new(10.0, 10.0);
        stage.draw_cell(0, 0, Rect::sized(1.0, 1.0), &mut gr);
        stage.draw_cell(3, 0, Rect::sized(1.0, 1.0), &mut gr);
        assert_eq!(gr.texts(), vec!["3:6"]);
    }

    #[test]
    fn child_rect_transforms_only_children() {
        let stage = StageBuilder::<G, NoInputs>::new()
            .child_rect(|(), r| r.inset(1.0, 1.0, 1.0, 1.0))
            .child(marker("inner"))
            .paint(|(), _, r, gr: &mut G| gr.fill_rect(r));
        let mut gr = RecordingGraphics::new(10.0, 10.0);
        stage.draw_cell(0, 0, Rect::sized(10.0, 10.0), &mut gr);
        assert_eq!(
            gr.ops()[0],
            DrawOp::FillRect {
                rect: Rect::sized(10.0, 10.0)
            }
        );
        match &gr.ops()[1] {
            DrawOp::Text { rect, .. } => assert_eq!(*rect, Rect::new(1.0, 1.0, 8.0, 8.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn changes_propagate_from_inputs_and_children() {
        let color = Steady::new(1u8);
        let inner_src = Steady::new(2u8);
        let inner = StageBuilder::<G, NoInputs>::new()
            .input(Rc::clone(&inner_src) as Values<u8>)
            .build();
        let outer = StageBuilder::<G, NoInputs>::new()
            .input(Rc::clone(&color) as Values<u8>)
            .child(inner)
            .build();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        outer.changed().subscribe(move |_| h.set(h.get() + 1));
        color.set(5);
        inner_src.set(6);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn batches_reach_every_input_and_child() {
        let begun = Rc::new(Cell::new(0));
        let make = |b: Rc<Cell<i32>>| {
            FromFn::with_batch(|_| Some(0u8), move |_| b.set(b.get() + 1), || {})
        };
        let child = StageBuilder::<G, NoInputs>::new()
            .input(make(Rc::clone(&begun)) as Values<u8>)
            .build();
        let stage = StageBuilder::<G, NoInputs>::new()
            .input(make(Rc::clone(&begun)) as Values<u8>)
            .child(child)
            .build();
        stage.begin_update(&CellRange::new(0, 0, 0, 0));
        stage.end_update();
        assert_eq!(begun.get(), 2);
    }
}
