//! Per-cell pixel boxes from two axis edge lookups.

use crate::error::Result;
use crate::types::{CellRange, Rect};

use super::dimension::Dimension;
use super::viewport::EdgeLookup;

/// Maps `(column, row)` to the cell's rectangle in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGetter {
    cols: EdgeLookup,
    rows: EdgeLookup,
}

impl BoxGetter {
    pub fn new(cols: EdgeLookup, rows: EdgeLookup) -> Self {
        Self { cols, rows }
    }

    pub fn columns(&self) -> &EdgeLookup {
        &self.cols
    }

    pub fn rows(&self) -> &EdgeLookup {
        &self.rows
    }

    /// Box of one cell, `None` if either index has no recorded edge.
    pub fn cell_box(&self, col: u32, row: u32) -> Option<Rect> {
        let c = self.cols.edge(col)?;
        let r = self.rows.edge(row)?;
        Some(Rect::new(c.start, r.start, c.length, r.length))
    }

    /// Bounding box of a non-empty range.
    pub fn range_box(&self, range: &CellRange) -> Option<Rect> {
        if range.is_empty() {
            return None;
        }
        let col_first = u32::try_from(range.col_first).ok()?;
        let col_last = u32::try_from(range.col_last).ok()?;
        let row_first = u32::try_from(range.row_first).ok()?;
        let row_last = u32::try_from(range.row_last).ok()?;
        let top_left = self.cell_box(col_first, row_first)?;
        let bottom_right = self.cell_box(col_last, row_last)?;
        Some(Rect::new(
            top_left.x,
            top_left.y,
            bottom_right.right() - top_left.x,
            bottom_right.bottom() - top_left.y,
        ))
    }

    /// Getter whose lookups also cover every cell of `range`.
    pub fn extended(
        &self,
        col_dim: &dyn Dimension,
        row_dim: &dyn Dimension,
        range: &CellRange,
    ) -> Result<BoxGetter> {
        let clamp = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        Ok(Self {
            cols: self
                .cols
                .extended(col_dim, clamp(range.col_first), clamp(range.col_last))?,
            rows: self
                .rows
                .extended(row_dim, clamp(range.row_first), clamp(range.row_last))?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::layout::{calc_visible, SizeTable};

    #[test]
    fn fixed_boxes_multiply() {
        let g = BoxGetter::new(
            EdgeLookup::Fixed { size: 50.0 },
            EdgeLookup::Fixed { size: 20.0 },
        );
        assert_eq!(g.cell_box(2, 3), Some(Rect::new(100.0, 60.0, 50.0, 20.0)));
        assert_eq!(
            g.range_box(&CellRange::new(1, 2, 0, 1)),
            Some(Rect::new(50.0, 0.0, 100.0, 40.0))
        );
    }

    #[test]
    fn variable_boxes_outside_scan_are_missing() {
        let cols = SizeTable::new(vec![10.0, 20.0, 30.0], false).unwrap();
        let v = calc_visible(12.0, 5.0, &cols).unwrap().unwrap();
        let g = BoxGetter::new(v.edges, EdgeLookup::Fixed { size: 10.0 });
        assert_eq!(g.cell_box(1, 0), Some(Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert_eq!(g.cell_box(2, 0), None);

        let rows = SizeTable::new(vec![10.0; 4], false).unwrap();
        let ext = g
            .extended(&cols, &rows, &CellRange::new(0, 2, 0, 3))
            .unwrap();
        assert_eq!(ext.cell_box(2, 0), Some(Rect::new(30.0, 0.0, 30.0, 10.0)));
        assert_eq!(ext.cell_box(0, 0).unwrap().x, 0.0);
    }
}
