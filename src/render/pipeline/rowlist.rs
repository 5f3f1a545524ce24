//! Row-oriented data sources and their adapters to per-cell values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::observer::{subscribe_weak, Notifier};
use crate::types::{CellRange, CellTarget, Which};

use super::values::ValueProvider;

/// A list of rows, looked up by index.
pub trait RowList<R> {
    fn begin_update(&self, _range: &CellRange) {}
    fn end_update(&self) {}

    /// Row `index`, or `None` when out of range or not yet available.
    fn row(&self, index: u32) -> Option<R>;

    /// Number of rows, `None` if unknown.
    fn count(&self) -> Option<u32>;

    /// Emits the row that changed, or `All`.
    fn changed(&self) -> &Notifier<Which>;
}

pub type Rows<R> = Rc<dyn RowList<R>>;

/// Rows held in memory.
#[derive(Debug)]
pub struct VecRowList<R> {
    rows: RefCell<Vec<R>>,
    changed: Notifier<Which>,
}

impl<R: Clone + 'static> VecRowList<R> {
    pub fn new(rows: Vec<R>) -> Rc<Self> {
        Rc::new(Self {
            rows: RefCell::new(rows),
            changed: Notifier::new(),
        })
    }

    /// Replace every row.
    pub fn set_rows(&self, rows: Vec<R>) {
        *self.rows.borrow_mut() = rows;
        self.changed.notify(&Which::All);
    }

    /// Replace one row. Returns false when `index` is out of range.
    pub fn set_row(&self, index: u32, row: R) -> bool {
        let replaced = match self.rows.borrow_mut().get_mut(index as usize) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        };
        if replaced {
            self.changed.notify(&Which::Index(index));
        }
        replaced
    }
}

impl<R: Clone> RowList<R> for VecRowList<R> {
    fn row(&self, index: u32) -> Option<R> {
        self.rows.borrow().get(index as usize).cloned()
    }

    fn count(&self) -> Option<u32> {
        u32::try_from(self.rows.borrow().len()).ok()
    }

    fn changed(&self) -> &Notifier<Which> {
        &self.changed
    }
}

/// Per-row memo in front of a slower row list.
pub struct CachedRowList<R> {
    next: Rows<R>,
    memo: RefCell<HashMap<u32, R>>,
    changed: Notifier<Which>,
}

impl<R: Clone + 'static> CachedRowList<R> {
    pub fn new(next: Rows<R>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(next.changed(), weak, |me: &Self, which: &Which| {
                match which {
                    Which::Index(r) => {
                        me.memo.borrow_mut().remove(r);
                    }
                    Which::All => me.memo.borrow_mut().clear(),
                }
                me.changed.notify(which);
            });
            Self {
                next,
                memo: RefCell::new(HashMap::new()),
                changed: Notifier::new(),
            }
        })
    }

    pub fn cached_rows(&self) -> usize {
        self.memo.borrow().len()
    }
}

impl<R: Clone> RowList<R> for CachedRowList<R> {
    fn begin_update(&self, range: &CellRange) {
        self.next.begin_update(range);
    }

    fn end_update(&self) {
        self.next.end_update();
    }

    fn row(&self, index: u32) -> Option<R> {
        if let Some(r) = self.memo.borrow().get(&index) {
            return Some(r.clone());
        }
        let r = self.next.row(index)?;
        self.memo.borrow_mut().insert(index, r.clone());
        Some(r)
    }

    fn count(&self) -> Option<u32> {
        self.next.count()
    }

    fn changed(&self) -> &Notifier<Which> {
        &self.changed
    }
}

fn row_target(which: Which) -> CellTarget {
    CellTarget {
        column: Which::All,
        row: which,
    }
}

/// Cell values from rows that are themselves lists; the column indexes the row.
pub struct IndexedRowValues<T> {
    rows: Rows<Vec<T>>,
    changed: Notifier<CellTarget>,
}

impl<T: Clone + 'static> IndexedRowValues<T> {
    pub fn new(rows: Rows<Vec<T>>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(rows.changed(), weak, |me: &Self, which: &Which| {
                me.changed.notify(&row_target(*which));
            });
            Self {
                rows,
                changed: Notifier::new(),
            }
        })
    }
}

impl<T: Clone> ValueProvider<T> for IndexedRowValues<T> {
    fn begin_update(&self, range: &CellRange) {
        self.rows.begin_update(range);
    }

    fn end_update(&self) {
        self.rows.end_update();
    }

    fn value(&self, at: CellTarget) -> Option<T> {
        let row = self.rows.row(at.row.index()?)?;
        row.get(at.column.index()? as usize).cloned()
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}

/// Accessor for one column of a record row.
pub type Field<R, T> = Box<dyn Fn(&R) -> Option<T>>;

/// Cell values from record-like rows; each column maps to a field accessor.
///
/// Columns without an accessor have no value.
pub struct FieldRowValues<R, T> {
    rows: Rows<R>,
    fields: HashMap<u32, Field<R, T>>,
    changed: Notifier<CellTarget>,
}

impl<R: 'static, T: 'static> FieldRowValues<R, T> {
    pub fn new(rows: Rows<R>, fields: Vec<(u32, Field<R, T>)>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            subscribe_weak(rows.changed(), weak, |me: &Self, which: &Which| {
                me.changed.notify(&row_target(*which));
            });
            Self {
                rows,
                fields: fields.into_iter().collect(),
                changed: Notifier::new(),
            }
        })
    }
}

impl<R, T> ValueProvider<T> for FieldRowValues<R, T> {
    fn begin_update(&self, range: &CellRange) {
        self.rows.begin_update(range);
    }

    fn end_update(&self) {
        self.rows.end_update();
    }

    fn value(&self, at: CellTarget) -> Option<T> {
        let field = self.fields.get(&at.column.index()?)?;
        let row = self.rows.row(at.row.index()?)?;
        field(&row)
    }

    fn changed(&self) -> &Notifier<CellTarget> {
        &self.changed
    }
}
