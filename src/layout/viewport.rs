//! Visible index resolution and hit testing along one axis.
//!
//! Wraparound is handled by callers: the resolver only ever sees a pixel
//! range inside one period, and [`which_window`] maps arbitrary coordinates
//! onto periods.

use crate::error::{GridError, Result};

use super::dimension::{validate_size, wraps, Dimension};

/// Default bound on how many indices a forward scan of an unbounded,
/// variable-size axis may visit.
pub const DEFAULT_SCAN_LIMIT: u32 = 1_000_000;

/// Start offset and length of one index along an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: f64,
    pub length: f64,
}

impl Edge {
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// Index to edge mapping produced by [`calc_visible`].
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeLookup {
    /// Every index is `size` wide; edges are computed by multiplication.
    Fixed { size: f64 },
    /// Edges recorded during a forward scan, for indices `first..first + len`.
    Variable {
        first: u32,
        starts: Vec<f64>,
        lengths: Vec<f64>,
    },
}

impl EdgeLookup {
    /// Edge of `index`, or `None` if a variable lookup never recorded it.
    pub fn edge(&self, index: u32) -> Option<Edge> {
        match self {
            Self::Fixed { size } => Some(Edge {
                start: f64::from(index) * size,
                length: *size,
            }),
            Self::Variable {
                first,
                starts,
                lengths,
            } => {
                let offset = index.checked_sub(*first)? as usize;
                Some(Edge {
                    start: *starts.get(offset)?,
                    length: *lengths.get(offset)?,
                })
            }
        }
    }

    /// Lookup covering `first..=last`, walking sizes outward from the indices
    /// already recorded.
    pub fn extended(&self, dim: &dyn Dimension, first: u32, last: u32) -> Result<EdgeLookup> {
        let Self::Variable {
            first: anchor,
            starts,
            ..
        } = self
        else {
            return Ok(self.clone());
        };
        let mut idx = *anchor;
        let mut start = starts.first().copied().unwrap_or(0.0);
        while idx > first {
            idx -= 1;
            start -= validate_size(Some(idx), dim.size_of(idx))?;
        }
        while idx < first {
            start += validate_size(Some(idx), dim.size_of(idx))?;
            idx += 1;
        }
        let capacity = last.saturating_sub(first) as usize + 1;
        let mut new_starts = Vec::with_capacity(capacity);
        let mut new_lengths = Vec::with_capacity(capacity);
        if first <= last {
            for i in first..=last {
                let len = validate_size(Some(i), dim.size_of(i))?;
                new_starts.push(start);
                new_lengths.push(len);
                start += len;
            }
        }
        Ok(Self::Variable {
            first,
            starts: new_starts,
            lengths: new_lengths,
        })
    }
}

/// Result of resolving a pixel range against an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Visible {
    /// First visible index.
    pub first: u32,
    /// Last visible index (inclusive).
    pub last: u32,
    /// Edges of at least `first..=last`.
    pub edges: EdgeLookup,
}

/// Convert a non-negative floored coordinate to an index, saturating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_index(v: f64) -> u32 {
    if v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v as u32
    }
}

/// Visible indices for the pixel range `[begin, begin + length)`.
///
/// Returns `Ok(None)` when `length <= 0`, when the range ends at or before 0,
/// or when no index overlaps the range.
///
/// # Errors
/// Fails on a non-positive axis size, or when an unbounded variable-size axis
/// needs more than [`DEFAULT_SCAN_LIMIT`] indices.
pub fn calc_visible(begin: f64, length: f64, dim: &dyn Dimension) -> Result<Option<Visible>> {
    calc_visible_bounded(begin, length, dim, DEFAULT_SCAN_LIMIT)
}

/// [`calc_visible`] with an explicit scan bound.
pub fn calc_visible_bounded(
    begin: f64,
    length: f64,
    dim: &dyn Dimension,
    max_scan: u32,
) -> Result<Option<Visible>> {
    if length <= 0.0 || begin + length <= 0.0 {
        return Ok(None);
    }
    if dim.variable_sizes() {
        scan_visible(begin, length, dim, max_scan)
    } else {
        fixed_visible(begin, length, dim)
    }
}

fn fixed_visible(begin: f64, length: f64, dim: &dyn Dimension) -> Result<Option<Visible>> {
    let size = validate_size(None, dim.size_of(0))?;
    let last_f = ((begin + length) / size).floor();
    if last_f < 0.0 {
        return Ok(None);
    }
    let first = to_index((begin / size).floor());
    let mut last = to_index(last_f);
    if let Some(count) = dim.count() {
        let Some(max) = count.checked_sub(1) else {
            return Ok(None);
        };
        last = last.min(max);
    }
    if first > last {
        return Ok(None);
    }
    Ok(Some(Visible {
        first,
        last,
        edges: EdgeLookup::Fixed { size },
    }))
}

/// Single forward pass from index 0.
fn scan_visible(
    begin: f64,
    length: f64,
    dim: &dyn Dimension,
    max_scan: u32,
) -> Result<Option<Visible>> {
    let count = dim.count();
    let end = begin + length;
    let exhausted = |i: u32| count.is_some_and(|c| i >= c);

    let mut cur = 0.0;
    let mut i: u32 = 0;
    let first_len = loop {
        if exhausted(i) {
            return Ok(None);
        }
        if count.is_none() && i >= max_scan {
            return Err(GridError::ScanLimit { limit: max_scan });
        }
        let len = validate_size(Some(i), dim.size_of(i))?;
        if cur >= begin || cur + len > begin {
            break len;
        }
        cur += len;
        i += 1;
    };

    let first = i;
    let mut starts = vec![cur];
    let mut lengths = vec![first_len];
    let mut last = first;
    let mut prev_len = first_len;

    while cur + prev_len < end {
        let next = last + 1;
        if next == u32::MAX || exhausted(next) {
            break;
        }
        if count.is_none() && next - first >= max_scan {
            return Err(GridError::ScanLimit { limit: max_scan });
        }
        cur += prev_len;
        let len = validate_size(Some(next), dim.size_of(next))?;
        starts.push(cur);
        lengths.push(len);
        last = next;
        prev_len = len;
    }

    Ok(Some(Visible {
        first,
        last,
        edges: EdgeLookup::Variable {
            first,
            starts,
            lengths,
        },
    }))
}

/// Total extent of the axis, `None` when unbounded.
pub fn total_size(dim: &dyn Dimension) -> Result<Option<f64>> {
    let Some(count) = dim.count() else {
        return Ok(None);
    };
    if dim.variable_sizes() {
        let mut total = 0.0;
        for i in 0..count {
            total += validate_size(Some(i), dim.size_of(i))?;
        }
        Ok(Some(total))
    } else {
        Ok(Some(f64::from(count) * validate_size(None, dim.size_of(0))?))
    }
}

/// Signed period index `n` such that `x - n * len` lies in `[0, len)`.
#[allow(clippy::cast_possible_truncation)]
pub fn which_window(x: f64, len: f64) -> i64 {
    let mut n = (x / len).floor();
    let rem = x - n * len;
    if rem >= len {
        n += 1.0;
    } else if rem < 0.0 {
        n -= 1.0;
    }
    n as i64
}

/// Index whose span `[start, start + size)` contains `x`.
///
/// On a wrapping axis `x` is first reduced into the period. Returns
/// `Ok(None)` for coordinates before index 0 or past the last index.
pub fn find_index(x: f64, dim: &dyn Dimension) -> Result<Option<u32>> {
    find_index_bounded(x, dim, DEFAULT_SCAN_LIMIT)
}

/// [`find_index`] with an explicit scan bound.
#[allow(clippy::cast_precision_loss)]
pub fn find_index_bounded(x: f64, dim: &dyn Dimension, max_scan: u32) -> Result<Option<u32>> {
    let mut x = x;
    if wraps(dim) {
        let period = total_size(dim)?.unwrap_or(0.0);
        if period <= 0.0 {
            return Ok(None);
        }
        x -= which_window(x, period) as f64 * period;
    }
    if x < 0.0 {
        return Ok(None);
    }

    let count = dim.count();
    if dim.variable_sizes() {
        let mut total = 0.0;
        let mut i: u32 = 0;
        loop {
            if count.is_some_and(|c| i >= c) {
                return Ok(None);
            }
            if count.is_none() && i >= max_scan {
                return Err(GridError::ScanLimit { limit: max_scan });
            }
            total += validate_size(Some(i), dim.size_of(i))?;
            if x < total {
                return Ok(Some(i));
            }
            i += 1;
        }
    } else {
        let size = validate_size(None, dim.size_of(0))?;
        let n = (x / size).floor();
        if let Some(c) = count {
            if n >= f64::from(c) {
                return Ok(None);
            }
        }
        Ok(Some(to_index(n)))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::{FixedDimension, FnDimension, SizeTable};

    #[test]
    fn zero_length_is_nothing() {
        let d = FixedDimension::new(10, 50.0, false).unwrap();
        assert!(calc_visible(0.0, 0.0, &d).unwrap().is_none());
        assert!(calc_visible(0.0, -5.0, &d).unwrap().is_none());
    }

    #[test]
    fn fixed_full_extent() {
        let d = FixedDimension::new(10, 50.0, false).unwrap();
        let v = calc_visible(0.0, 500.0, &d).unwrap().unwrap();
        assert_eq!((v.first, v.last), (0, 9));
    }

    #[test]
    fn fixed_partial_window() {
        let d = FixedDimension::unbounded(50.0).unwrap();
        let v = calc_visible(75.0, 100.0, &d).unwrap().unwrap();
        assert_eq!((v.first, v.last), (1, 3));
        assert_eq!(
            v.edges.edge(3),
            Some(Edge {
                start: 150.0,
                length: 50.0
            })
        );
    }

    #[test]
    fn fixed_range_past_end_is_nothing() {
        let d = FixedDimension::new(4, 10.0, false).unwrap();
        assert!(calc_visible(100.0, 20.0, &d).unwrap().is_none());
    }

    #[test]
    fn range_before_origin_is_nothing_on_either_axis() {
        let fixed = FixedDimension::new(4, 10.0, false).unwrap();
        let table = SizeTable::new(vec![10.0; 4], false).unwrap();
        for d in [&fixed as &dyn Dimension, &table] {
            assert!(calc_visible(-100.0, 50.0, d).unwrap().is_none());
            assert!(calc_visible(-50.0, 50.0, d).unwrap().is_none());
            let v = calc_visible(-50.0, 55.0, d).unwrap().unwrap();
            assert_eq!((v.first, v.last), (0, 0));
        }
    }

    #[test]
    fn variable_scan_records_edges() {
        let d = SizeTable::new(vec![10.0, 20.0, 30.0, 40.0], false).unwrap();
        let v = calc_visible(15.0, 20.0, &d).unwrap().unwrap();
        assert_eq!((v.first, v.last), (1, 2));
        assert_eq!(v.edges.edge(1).unwrap().start, 10.0);
        assert_eq!(v.edges.edge(2).unwrap().start, 30.0);
        assert!(v.edges.edge(0).is_none());
        assert!(v.edges.edge(3).is_none());
    }

    #[test]
    fn variable_stops_at_count() {
        let d = SizeTable::new(vec![10.0, 10.0], false).unwrap();
        let v = calc_visible(5.0, 1000.0, &d).unwrap().unwrap();
        assert_eq!((v.first, v.last), (0, 1));
        assert!(calc_visible(25.0, 10.0, &d).unwrap().is_none());
    }

    #[test]
    fn unbounded_variable_scan_is_bounded() {
        let d = FnDimension::new(None, false, |_| 1.0).unwrap();
        let err = calc_visible_bounded(1.0e9, 10.0, &d, 1000).unwrap_err();
        assert!(matches!(err, GridError::ScanLimit { limit: 1000 }));
    }

    #[test]
    fn scan_rejects_bad_size() {
        let d = FnDimension::new(Some(5), false, |i| if i == 2 { 0.0 } else { 10.0 }).unwrap();
        assert!(matches!(
            calc_visible(0.0, 100.0, &d),
            Err(GridError::InvalidSize { index: Some(2), .. })
        ));
    }

    #[test]
    fn which_window_handles_negatives() {
        assert_eq!(which_window(0.0, 100.0), 0);
        assert_eq!(which_window(99.9, 100.0), 0);
        assert_eq!(which_window(100.0, 100.0), 1);
        assert_eq!(which_window(-0.5, 100.0), -1);
        assert_eq!(which_window(-100.0, 100.0), -1);
        assert_eq!(which_window(-100.5, 100.0), -2);
    }

    #[test]
    fn find_index_fixed_and_wrapping() {
        let d = FixedDimension::new(10, 50.0, false).unwrap();
        assert_eq!(find_index(0.0, &d).unwrap(), Some(0));
        assert_eq!(find_index(49.9, &d).unwrap(), Some(0));
        assert_eq!(find_index(50.0, &d).unwrap(), Some(1));
        assert_eq!(find_index(500.0, &d).unwrap(), None);
        assert_eq!(find_index(-1.0, &d).unwrap(), None);

        let w = FixedDimension::new(10, 50.0, true).unwrap();
        assert_eq!(find_index(525.0, &w).unwrap(), Some(0));
        assert_eq!(find_index(-10.0, &w).unwrap(), Some(9));
    }

    #[test]
    fn find_index_variable() {
        let d = SizeTable::new(vec![10.0, 20.0, 30.0], true).unwrap();
        assert_eq!(find_index(9.0, &d).unwrap(), Some(0));
        assert_eq!(find_index(10.0, &d).unwrap(), Some(1));
        assert_eq!(find_index(59.0, &d).unwrap(), Some(2));
        assert_eq!(find_index(65.0, &d).unwrap(), Some(0));
    }

    #[test]
    fn extended_walks_both_directions() {
        let d = SizeTable::new(vec![10.0, 20.0, 30.0, 40.0, 50.0], false).unwrap();
        let v = calc_visible(30.0, 10.0, &d).unwrap().unwrap();
        assert_eq!((v.first, v.last), (2, 2));
        let ext = v.edges.extended(&d, 0, 4).unwrap();
        assert_eq!(ext.edge(0).unwrap().start, 0.0);
        assert_eq!(ext.edge(1).unwrap().start, 10.0);
        assert_eq!(ext.edge(4).unwrap().start, 100.0);
        assert_eq!(ext.edge(4).unwrap().length, 50.0);
    }

    #[test]
    fn total_size_fixed_variable_unbounded() {
        let f = FixedDimension::new(10, 50.0, false).unwrap();
        assert_eq!(total_size(&f).unwrap(), Some(500.0));
        let v = SizeTable::new(vec![1.0, 2.0, 3.0], false).unwrap();
        assert_eq!(total_size(&v).unwrap(), Some(6.0));
        let u = FixedDimension::unbounded(5.0).unwrap();
        assert_eq!(total_size(&u).unwrap(), None);
    }
}
