//! Selection state: whole rows, whole columns, or individual cells.
//!
//! Only one mode holds members at a time. A change aimed at another mode
//! first clears the current one, emitting a deselect event per member.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::observer::Notifier;

use super::coords::{CellCoords, CellTarget};

/// Which kind of member a selection holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    WholeColumn,
    WholeRow,
    Cells,
}

/// One member of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKey {
    Column(u32),
    Row(u32),
    Cell(CellCoords),
}

impl SelectionKey {
    pub fn mode(self) -> SelectionMode {
        match self {
            Self::Column(_) => SelectionMode::WholeColumn,
            Self::Row(_) => SelectionMode::WholeRow,
            Self::Cell(_) => SelectionMode::Cells,
        }
    }

    /// The cells whose appearance depends on this member.
    pub fn target(self) -> CellTarget {
        match self {
            Self::Column(c) => CellTarget::column(c),
            Self::Row(r) => CellTarget::row(r),
            Self::Cell(c) => c.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Select,
    Unselect,
    Toggle,
}

/// Payload of [`Selection::changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    pub key: SelectionKey,
    pub selected: bool,
}

#[derive(Debug, Default)]
struct Members {
    columns: BTreeSet<u32>,
    rows: BTreeSet<u32>,
    cells: BTreeMap<u32, BTreeSet<u32>>,
}

impl Members {
    fn mode(&self) -> Option<SelectionMode> {
        if !self.columns.is_empty() {
            Some(SelectionMode::WholeColumn)
        } else if !self.rows.is_empty() {
            Some(SelectionMode::WholeRow)
        } else if self.cells.values().any(|rows| !rows.is_empty()) {
            Some(SelectionMode::Cells)
        } else {
            None
        }
    }

    fn contains(&self, key: SelectionKey) -> bool {
        match key {
            SelectionKey::Column(c) => self.columns.contains(&c),
            SelectionKey::Row(r) => self.rows.contains(&r),
            SelectionKey::Cell(c) => self
                .cells
                .get(&c.column)
                .is_some_and(|rows| rows.contains(&c.row)),
        }
    }

    fn set(&mut self, key: SelectionKey, on: bool) {
        match (key, on) {
            (SelectionKey::Column(c), true) => {
                self.columns.insert(c);
            }
            (SelectionKey::Column(c), false) => {
                self.columns.remove(&c);
            }
            (SelectionKey::Row(r), true) => {
                self.rows.insert(r);
            }
            (SelectionKey::Row(r), false) => {
                self.rows.remove(&r);
            }
            (SelectionKey::Cell(c), true) => {
                self.cells.entry(c.column).or_default().insert(c.row);
            }
            (SelectionKey::Cell(c), false) => {
                if let Some(rows) = self.cells.get_mut(&c.column) {
                    rows.remove(&c.row);
                    if rows.is_empty() {
                        self.cells.remove(&c.column);
                    }
                }
            }
        }
    }

    fn drain(&mut self) -> Vec<SelectionKey> {
        let mut out: Vec<SelectionKey> = std::mem::take(&mut self.columns)
            .into_iter()
            .map(SelectionKey::Column)
            .collect();
        out.extend(std::mem::take(&mut self.rows).into_iter().map(SelectionKey::Row));
        for (col, rows) in std::mem::take(&mut self.cells) {
            out.extend(
                rows.into_iter()
                    .map(|row| SelectionKey::Cell(CellCoords::new(col, row))),
            );
        }
        out
    }
}

/// Mutually exclusive row / column / cell selection with change events.
#[derive(Debug, Default)]
pub struct Selection {
    members: RefCell<Members>,
    changed: Notifier<SelectionChange>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode currently holding members, if any.
    pub fn mode(&self) -> Option<SelectionMode> {
        self.members.borrow().mode()
    }

    /// Add `key`. Returns true if membership changed.
    pub fn select(&self, key: SelectionKey) -> bool {
        self.change(Op::Select, key)
    }

    /// Remove `key`. Returns true if membership changed.
    pub fn unselect(&self, key: SelectionKey) -> bool {
        self.change(Op::Unselect, key)
    }

    /// Flip `key`. Returns its new membership.
    pub fn toggle(&self, key: SelectionKey) -> bool {
        self.change(Op::Toggle, key);
        self.contains(key)
    }

    /// Remove every member, one deselect event each.
    pub fn clear(&self) {
        let removed = self.members.borrow_mut().drain();
        self.emit_removed(removed);
    }

    pub fn contains(&self, key: SelectionKey) -> bool {
        self.members.borrow().contains(key)
    }

    /// True if the cell's column, its row, or the cell itself is selected.
    pub fn contains_cell(&self, col: u32, row: u32) -> bool {
        let m = self.members.borrow();
        m.columns.contains(&col)
            || m.rows.contains(&row)
            || m.cells.get(&col).is_some_and(|rows| rows.contains(&row))
    }

    pub fn selected_columns(&self) -> Vec<u32> {
        self.members.borrow().columns.iter().copied().collect()
    }

    pub fn selected_rows(&self) -> Vec<u32> {
        self.members.borrow().rows.iter().copied().collect()
    }

    /// Explicitly selected cells in column-major order.
    pub fn selected_cells(&self) -> Vec<CellCoords> {
        self.members
            .borrow()
            .cells
            .iter()
            .flat_map(|(col, rows)| rows.iter().map(|row| CellCoords::new(*col, *row)))
            .collect()
    }

    pub fn changed(&self) -> &Notifier<SelectionChange> {
        &self.changed
    }

    fn change(&self, op: Op, key: SelectionKey) -> bool {
        let (removed, applied) = {
            let mut m = self.members.borrow_mut();
            let removed = match m.mode() {
                Some(mode) if mode != key.mode() => m.drain(),
                _ => Vec::new(),
            };
            let prev = m.contains(key);
            let next = match op {
                Op::Select => true,
                Op::Unselect => false,
                Op::Toggle => !prev,
            };
            let applied = (prev != next).then(|| {
                m.set(key, next);
                next
            });
            (removed, applied)
        };
        self.emit_removed(removed);
        match applied {
            Some(selected) => {
                self.changed.notify(&SelectionChange { key, selected });
                true
            }
            None => false,
        }
    }

    fn emit_removed(&self, removed: Vec<SelectionKey>) {
        for key in removed {
            self.changed.notify(&SelectionChange {
                key,
                selected: false,
            });
        }
    }
}
