//! Per-cell value sources feeding the draw stages.
//!
//! A provider is queried with a [`CellTarget`]: draw stages ask for concrete
//! cells, while the column/row memos ask their source for a whole column
//! (`column: Index(c), row: All`) or a whole row.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::cell_ref::{a1_label, column_letters};
use crate::observer::{subscribe_weak, Notifier};
use crate::render::cache::Cache;
use crate::types::{CellRange, CellTarget, Which};

/// Source of one value per cell.
pub trait ValueProvider<T> {
    /// Batch hook called before a visible range is drawn.
    fn begin_update(&self, _range: &CellRange) {}

    /// Batch hook called after a visible range is drawn.
    fn end_update(&self) {}

    /// Value at `at`, or `None` when there is none (not an error).
    fn value(&self, at: CellTarget) -> Option<T>;

    /// Emits the cells whose values changed.
    fn changed(&self) -> &Notifier<CellTarget>;
}

/// Shared handle to a provider.
pub type Values<T> = Rc<dyn ValueProvider<T>>;

/// The same value for every cell.
#[derive(Debug)]
pub struct Steady<T> {
    value: RefCell<T>,
    changed: Notifier<CellTarget>,
}

impl<T: Clone + 'static> Steady<T> {
    pub fn new(value: T) -> Rc<Self> {
        Rc::new(Self {
            value: RefCell::new(value),
            changed: Notifier::new(),
        })
    }

    /// Replace the value and announce that every cell changed.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.changed.notify(&CellTarget::ALL);
    }
}

impl<T: Clone> ValueProvider<T> for Steady<T> {
    fn value(&self, _at: CellTarget) -> Option<T> {
        Some(self.value.borrow().clone())
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

type GetFn<T> = Box<dyn Fn(CellTarget) -> Option<T>>;
type BeginFn = Box<dyn Fn(&CellRange)>;
type EndFn = Box<dyn Fn()>;

/// Provider backed by closures.
pub struct FromFn<T> {
    get: GetFn<T>,
    begin: Option<BeginFn>,
    end: Option<EndFn>,
    changed: Notifier<CellTarget>,
}

impl<T: 'static> FromFn<T> {
    pub fn new(get: impl Fn(CellTarget) -> Option<T> + 'static) -> Rc<Self> {
        Rc::new(Self {
            get: Box::new(get),
            begin: None,
            end: None,
            changed: Notifier::new(),
        })
    }

    /// Provider with batch hooks around every visible range.
    pub fn with_batch(
        get: impl Fn(CellTarget) -> Option<T> + 'static,
        begin: impl Fn(&CellRange) + 'static,
        end: impl Fn() + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            get: Box::new(get),
            begin: Some(Box::new(begin)),
            end: Some(Box::new(end)),
            changed: Notifier::new(),
        })
    }

    /// Announce that values under `target` changed.
    pub fn notify_changed(&self, target: CellTarget) {
        self.changed.notify(&target);
    }
}

impl<T> ValueProvider<T> for FromFn<T> {
    fn begin_update(&self, range: &CellRange) {
        if let Some(f) = &self.begin {
            f(range);
        }
    }

    fn end_update(&self) {
        if let Some(f) = &self.end {
            f();
        }
    }

    fn value(&self, at: CellTarget) -> Option<T> {
        (self.get)(at)
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

/// "1", "2", ... for each row.
pub fn row_numbers() -> Rc<FromFn<String>> {
    FromFn::new(|at| at.row.index().map(|r| (u64::from(r) + 1).to_string()))
}

/// "1", "2", ... for each column.
pub fn column_numbers() -> Rc<FromFn<String>> {
    FromFn::new(|at| at.column.index().map(|c| (u64::from(c) + 1).to_string()))
}

/// "A", "B", ..., "AA", ... for each column.
pub fn column_letters_values() -> Rc<FromFn<String>> {
    FromFn::new(|at| at.column.index().map(column_letters))
}

/// "A1"-style label for each cell.
pub fn a1_labels() -> Rc<FromFn<String>> {
    FromFn::new(|at| Some(a1_label(at.column.index()?, at.row.index()?)))
}

/// Memoizes one value for the whole grid, fetched with [`CellTarget::ALL`].
pub struct ForAllCells<T> {
    next: Values<T>,
    memo: RefCell<Option<Option<T>>>,
    changed: Notifier<CellTarget>,
}

impl<T: Clone + 'static> ForAllCells<T> {
    pub fn new(next: Values<T>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(next.changed(), weak, |me: &Self, e| {
                me.memo.borrow_mut().take();
                me.changed.notify(e);
            });
            Self {
                next,
                memo: RefCell::new(None),
                changed: Notifier::new(),
            }
        })
    }
}

impl<T: Clone> ValueProvider<T> for ForAllCells<T> {
    fn begin_update(&self, range: &CellRange) {
        self.next.begin_update(range);
    }

    fn end_update(&self) {
        self.next.end_update();
    }

    fn value(&self, _at: CellTarget) -> Option<T> {
        if let Some(v) = self.memo.borrow().as_ref() {
            return v.clone();
        }
        let v = self.next.value(CellTarget::ALL);
        *self.memo.borrow_mut() = Some(v.clone());
        v
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Column,
    Row,
}

/// Memoizes one value per column or per row.
///
/// A per-column memo asks its source for `(Index(c), All)` and keys on the
/// column; a per-row memo does the same for rows.
pub struct AxisMemo<T> {
    next: Values<T>,
    axis: Axis,
    memo: RefCell<HashMap<u32, T>>,
    changed: Notifier<CellTarget>,
}

impl<T: Clone + 'static> AxisMemo<T> {
    /// One value for each column.
    pub fn per_column(next: Values<T>) -> Rc<Self> {
        Self::build(next, Axis::Column)
    }

    /// One value for each row.
    pub fn per_row(next: Values<T>) -> Rc<Self> {
        Self::build(next, Axis::Row)
    }

    fn build(next: Values<T>, axis: Axis) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(next.changed(), weak, |me: &Self, e: &CellTarget| {
                let key = match me.axis {
                    Axis::Column => e.column,
                    Axis::Row => e.row,
                };
                match key {
                    Which::Index(k) => {
                        me.memo.borrow_mut().remove(&k);
                    }
                    Which::All => me.memo.borrow_mut().clear(),
                }
                me.changed.notify(e);
            });
            Self {
                next,
                axis,
                memo: RefCell::new(HashMap::new()),
                changed: Notifier::new(),
            }
        })
    }
}

impl<T: Clone> ValueProvider<T> for AxisMemo<T> {
    fn begin_update(&self, range: &CellRange) {
        self.next.begin_update(range);
    }

    fn end_update(&self) {
        self.next.end_update();
    }

    fn value(&self, at: CellTarget) -> Option<T> {
        let key = match self.axis {
            Axis::Column => at.column.index(),
            Axis::Row => at.row.index(),
        }?;
        if let Some(v) = self.memo.borrow().get(&key) {
            return Some(v.clone());
        }
        let query = match self.axis {
            Axis::Column => CellTarget::column(key),
            Axis::Row => CellTarget::row(key),
        };
        let v = self.next.value(query)?;
        self.memo.borrow_mut().insert(key, v.clone());
        Some(v)
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

/// Memoizes every cell, invalidated at the granularity of upstream changes.
pub struct CachedValues<T> {
    next: Values<T>,
    cache: RefCell<Cache<T>>,
    changed: Notifier<CellTarget>,
}

impl<T: Clone + 'static> CachedValues<T> {
    pub fn new(next: Values<T>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(next.changed(), weak, |me: &Self, e| {
                me.cache.borrow_mut().apply(*e);
                me.changed.notify(e);
            });
            Self {
                next,
                cache: RefCell::new(Cache::new()),
                changed: Notifier::new(),
            }
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<T: Clone> ValueProvider<T> for CachedValues<T> {
    fn begin_update(&self, range: &CellRange) {
        self.next.begin_update(range);
    }

    fn end_update(&self) {
        self.next.end_update();
    }

    fn value(&self, at: CellTarget) -> Option<T> {
        let (Which::Index(col), Which::Index(row)) = (at.column, at.row) else {
            return self.next.value(at);
        };
        if let Some(v) = self.cache.borrow().get(col, row) {
            return Some(v.clone());
        }
        let v = self.next.value(at)?;
        self.cache.borrow_mut().insert(col, row, v.clone());
        Some(v)
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}
