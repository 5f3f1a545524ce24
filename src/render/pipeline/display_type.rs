//! Per-cell dispatch to one of several stage trees.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::observer::{subscribe_weak, Notifier};
use crate::render::backend::Graphics;
use crate::types::{CellRange, CellTarget, Rect};

use super::values::Values;
use super::{CellStage, Stage};

/// Display-type key to stage tree.
///
/// `K` is usually a small enum of the cell variants a grid shows.
pub struct DisplayTypeMap<G: Graphics, K> {
    stages: HashMap<K, Stage<G>>,
}

impl<G: Graphics + 'static, K: Eq + Hash + Copy + Debug + 'static> Default for DisplayTypeMap<G, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Graphics + 'static, K: Eq + Hash + Copy + Debug + 'static> DisplayTypeMap<G, K> {
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// Register the stage for `key`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, key: K, stage: Stage<G>) -> Self {
        self.stages.insert(key, stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Dispatch on the display type `selector` yields for each cell.
    pub fn switch_on(self, selector: Values<K>) -> Rc<DisplaySwitch<G, K>> {
        DisplaySwitch::new(selector, self)
    }
}

/// Draws each cell with the stage registered for its display type.
///
/// Cells whose type has no registered stage are skipped; each such type is
/// reported once.
pub struct DisplaySwitch<G: Graphics, K> {
    selector: Values<K>,
    stages: HashMap<K, Stage<G>>,
    reported: RefCell<HashSet<K>>,
    changed: Notifier<CellTarget>,
}

impl<G: Graphics + 'static, K: Eq + Hash + Copy + Debug + 'static> DisplaySwitch<G, K> {
    pub fn new(selector: Values<K>, map: DisplayTypeMap<G, K>) -> Rc<Self> {
        let stages = map.stages;
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let upstream =
                std::iter::once(selector.changed()).chain(stages.values().map(|s| s.changed()));
            for n in upstream {
                subscribe_weak(n, weak, |me: &Self, e| me.changed.notify(e));
            }
            Self {
                selector,
                stages,
                reported: RefCell::new(HashSet::new()),
                changed: Notifier::new(),
            }
        })
    }

    /// Display types that were requested but had no stage.
    pub fn unmapped(&self) -> Vec<K> {
        self.reported.borrow().iter().copied().collect()
    }
}

impl<G: Graphics + 'static, K: Eq + Hash + Copy + Debug + 'static> CellStage<G>
    for DisplaySwitch<G, K>
{
    fn begin_update(&self, range: &CellRange) {
        self.selector.begin_update(range);
        for stage in self.stages.values() {
            stage.begin_update(range);
        }
    }

    fn end_update(&self) {
        self.selector.end_update();
        for stage in self.stages.values() {
            stage.end_update();
        }
    }

    fn draw_cell(&self, col: u32, row: u32, rect: Rect, gr: &mut G) {
        let Some(key) = self.selector.value(CellTarget::cell(col, row)) else {
            return;
        };
        match self.stages.get(&key) {
            Some(stage) => stage.draw_cell(col, row, rect, gr),
            None => {
                if self.reported.borrow_mut().insert(key) {
                    warn!(display_type = ?key, col, row, "No stage registered for display type");
                }
            }
        }
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::render::colors::Color;
    use crate::render::pipeline::stages::{fill_color, oval, rounded_rect};
    use crate::render::pipeline::values::FromFn;
    use crate::render::recording::{DrawOp, RecordingGraphics};

    type G = RecordingGraphics;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Plain,
        Round,
        Dot,
        Missing,
    }

    #[test]
    fn dispatches_by_cell_kind() {
        let kinds = FromFn::new(|at| {
            Some(match (at.column.index()? + at.row.index()?) % 3 {
                0 => Kind::Plain,
                1 => Kind::Round,
                _ => Kind::Dot,
            })
        });
        let switch = DisplayTypeMap::<G, Kind>::new()
            .with(Kind::Plain, fill_color(Color::WHITE))
            .with(Kind::Round, rounded_rect(Color::BLUE))
            .with(Kind::Dot, oval(Color::RED))
            .switch_on(kinds);
        let mut gr = RecordingGraphics::new(100.0, 100.0);
        for (col, row) in [(0, 0), (1, 0), (1, 1), (2, 2)] {
            switch.draw_cell(col, row, Rect::sized(10.0, 10.0), &mut gr);
        }
        let shapes: Vec<_> = gr
            .ops()
            .iter()
            .filter(|op| !matches!(op, DrawOp::SetColor { .. }))
            .map(DrawOp::kind)
            .collect();
        assert_eq!(
            shapes,
            vec!["fill_rect", "fill_rounded_rect", "fill_oval", "fill_oval"]
        );
    }

    #[test]
    fn unmapped_kind_is_skipped_and_reported_once() {
        let kinds = FromFn::new(|at| Some(if at.row.index()? == 0 { Kind::Plain } else { Kind::Missing }));
        let switch = DisplayTypeMap::<G, Kind>::new()
            .with(Kind::Plain, fill_color(Color::WHITE))
            .switch_on(kinds);
        let mut gr = RecordingGraphics::new(100.0, 100.0);
        for row in 0..4 {
            switch.draw_cell(0, row, Rect::sized(10.0, 10.0), &mut gr);
        }
        assert_eq!(gr.op_counts().get("fill_rect"), Some(&1));
        assert_eq!(switch.unmapped(), vec![Kind::Missing]);
    }

    #[test]
    fn selector_changes_propagate() {
        let kinds = FromFn::new(|_| Some(Kind::Plain));
        let switch = DisplayTypeMap::<G, Kind>::new().switch_on(Rc::clone(&kinds) as Values<Kind>);
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = Rc::clone(&hits);
        switch.changed().subscribe(move |t| h.borrow_mut().push(*t));
        kinds.notify_changed(CellTarget::column(4));
        assert_eq!(*hits.borrow(), vec![CellTarget::column(4)]);
    }
}
