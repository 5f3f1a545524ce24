//! Sparse per-cell cache with row, column and global invalidation.
//!
//! Entries are keyed column first, then row. An optional disposer is called
//! with every value that leaves the cache (replacement, invalidation or drop),
//! which is how cached images get their raster memory released.

use std::collections::HashMap;
use std::fmt;

use crate::types::{CellTarget, Which};

type Disposer<T> = Box<dyn Fn(T)>;

/// Sparse `(column, row) -> T` cache.
pub struct Cache<T> {
    columns: HashMap<u32, HashMap<u32, T>>,
    disposer: Option<Disposer<T>>,
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("entries", &self.len())
            .field("disposer", &self.disposer.is_some())
            .finish()
    }
}

impl<T> Cache<T> {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            disposer: None,
        }
    }

    /// Cache that hands every evicted value to `disposer`.
    pub fn with_disposer(disposer: impl Fn(T) + 'static) -> Self {
        Self {
            columns: HashMap::new(),
            disposer: Some(Box::new(disposer)),
        }
    }

    pub fn get(&self, col: u32, row: u32) -> Option<&T> {
        self.columns.get(&col)?.get(&row)
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        self.get(col, row).is_some()
    }

    /// Store a value, disposing of any previous one for the same cell.
    pub fn insert(&mut self, col: u32, row: u32, value: T) {
        let old = self.columns.entry(col).or_default().insert(row, value);
        if let Some(old) = old {
            self.dispose(old);
        }
    }

    /// Cached value, creating it with `make` on a miss.
    ///
    /// A miss for which `make` yields `None` stores nothing.
    pub fn get_or_insert_with(
        &mut self,
        col: u32,
        row: u32,
        make: impl FnOnce() -> Option<T>,
    ) -> Option<&T> {
        if !self.contains(col, row) {
            let value = make()?;
            self.columns.entry(col).or_default().insert(row, value);
        }
        self.get(col, row)
    }

    pub fn invalidate_cell(&mut self, col: u32, row: u32) {
        let removed = self.columns.get_mut(&col).and_then(|rows| rows.remove(&row));
        if self.columns.get(&col).is_some_and(HashMap::is_empty) {
            self.columns.remove(&col);
        }
        if let Some(v) = removed {
            self.dispose(v);
        }
    }

    pub fn invalidate_column(&mut self, col: u32) {
        if let Some(rows) = self.columns.remove(&col) {
            for v in rows.into_values() {
                self.dispose(v);
            }
        }
    }

    pub fn invalidate_row(&mut self, row: u32) {
        let mut removed = Vec::new();
        for rows in self.columns.values_mut() {
            if let Some(v) = rows.remove(&row) {
                removed.push(v);
            }
        }
        self.columns.retain(|_, rows| !rows.is_empty());
        for v in removed {
            self.dispose(v);
        }
    }

    pub fn invalidate_all(&mut self) {
        let columns = std::mem::take(&mut self.columns);
        for v in columns.into_values().flat_map(HashMap::into_values) {
            self.dispose(v);
        }
    }

    /// Invalidate at the granularity of `target`.
    pub fn apply(&mut self, target: CellTarget) {
        match (target.column, target.row) {
            (Which::All, Which::All) => self.invalidate_all(),
            (Which::All, Which::Index(r)) => self.invalidate_row(r),
            (Which::Index(c), Which::All) => self.invalidate_column(c),
            (Which::Index(c), Which::Index(r)) => self.invalidate_cell(c, r),
        }
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.columns.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn dispose(&self, value: T) {
        if let Some(d) = &self.disposer {
            d(value);
        }
    }
}

impl<T> Drop for Cache<T> {
    fn drop(&mut self) {
        self.invalidate_all();
    }
}
