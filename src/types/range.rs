//! Inclusive rectangular spans of cell indices.

use serde::{Deserialize, Serialize};

use super::CellCoords;

/// Inclusive `(column, row)` index rectangle.
///
/// A range whose last index is below its first on either axis is empty.
/// Bounds are signed so that padded or subtracted ranges can go degenerate
/// without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub col_first: i64,
    pub col_last: i64,
    pub row_first: i64,
    pub row_last: i64,
}

impl CellRange {
    pub const fn new(col_first: i64, col_last: i64, row_first: i64, row_last: i64) -> Self {
        Self {
            col_first,
            col_last,
            row_first,
            row_last,
        }
    }

    /// Range built from resolved visible index bounds.
    pub fn from_bounds(cols: (u32, u32), rows: (u32, u32)) -> Self {
        Self::new(
            i64::from(cols.0),
            i64::from(cols.1),
            i64::from(rows.0),
            i64::from(rows.1),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.col_last < self.col_first || self.row_last < self.row_first
    }

    pub fn col_count(&self) -> u64 {
        u64::try_from(self.col_last - self.col_first + 1).unwrap_or(0)
    }

    pub fn row_count(&self) -> u64 {
        u64::try_from(self.row_last - self.row_first + 1).unwrap_or(0)
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.col_count() * self.row_count()
        }
    }

    pub fn contains(&self, cell: CellCoords) -> bool {
        let c = i64::from(cell.column);
        let r = i64::from(cell.row);
        c >= self.col_first && c <= self.col_last && r >= self.row_first && r <= self.row_last
    }

    /// True if `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &CellRange) -> bool {
        other.col_first >= self.col_first
            && other.col_last <= self.col_last
            && other.row_first >= self.row_first
            && other.row_last <= self.row_last
    }

    /// Component-wise overlap; `None` if either axis span is negative.
    pub fn intersect(&self, other: &CellRange) -> Option<CellRange> {
        let i = CellRange::new(
            self.col_first.max(other.col_first),
            self.col_last.min(other.col_last),
            self.row_first.max(other.row_first),
            self.row_last.min(other.row_last),
        );
        if i.col_last - i.col_first >= 0 && i.row_last - i.row_first >= 0 {
            Some(i)
        } else {
            None
        }
    }

    /// Band-wise difference `self - other`.
    ///
    /// Emits at most four pieces: the full-width row bands above and below the
    /// overlap, then the column bands left and right of the overlap restricted
    /// to the overlap's rows. Only exact when the excluded region spans whole
    /// row or column bands of `self`.
    pub fn subtract(&self, other: &CellRange) -> Vec<CellRange> {
        let Some(i) = self.intersect(other) else {
            return vec![*self];
        };
        let mut pieces = Vec::with_capacity(4);
        if i.row_first > self.row_first {
            pieces.push(CellRange::new(
                self.col_first,
                self.col_last,
                self.row_first,
                i.row_first - 1,
            ));
        }
        if i.row_last < self.row_last {
            pieces.push(CellRange::new(
                self.col_first,
                self.col_last,
                i.row_last + 1,
                self.row_last,
            ));
        }
        if i.col_first > self.col_first {
            pieces.push(CellRange::new(
                self.col_first,
                i.col_first - 1,
                i.row_first,
                i.row_last,
            ));
        }
        if i.col_last < self.col_last {
            pieces.push(CellRange::new(
                i.col_last + 1,
                self.col_last,
                i.row_first,
                i.row_last,
            ));
        }
        pieces
    }

    /// Grow by `cols` / `rows` on each side, never below index 0 and never past
    /// `col_limit` / `row_limit` (the last valid index) when given.
    #[must_use]
    pub fn padded(
        &self,
        cols: u32,
        rows: u32,
        col_limit: Option<u32>,
        row_limit: Option<u32>,
    ) -> CellRange {
        let mut col_last = self.col_last + i64::from(cols);
        if let Some(limit) = col_limit {
            col_last = col_last.min(i64::from(limit));
        }
        let mut row_last = self.row_last + i64::from(rows);
        if let Some(limit) = row_limit {
            row_last = row_last.min(i64::from(limit));
        }
        CellRange::new(
            (self.col_first - i64::from(cols)).max(0),
            col_last,
            (self.row_first - i64::from(rows)).max(0),
            row_last,
        )
    }

    /// Every cell in row-major order. Negative indices are skipped.
    pub fn cells(&self) -> impl Iterator<Item = CellCoords> + '_ {
        let cols = self.col_first.max(0)..=self.col_last;
        let rows = self.row_first.max(0)..=self.row_last;
        rows.flat_map(move |r| {
            cols.clone().filter_map(move |c| {
                let column = u32::try_from(c).ok()?;
                let row = u32::try_from(r).ok()?;
                Some(CellCoords::new(column, row))
            })
        })
    }
}
