//! Spreadsheet-style cell labels (`A`, `B`, ..., `Z`, `AA`, ... and `B7`).

use crate::types::{CellCoords, CellRange};

/// Column letters for a 0-indexed column: 0 is `A`, 25 is `Z`, 26 is `AA`.
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1-style label for a 0-indexed cell, rows numbered from 1.
pub fn a1_label(col: u32, row: u32) -> String {
    format!("{}{}", column_letters(col), u64::from(row) + 1)
}

/// Parse a label like "B7" (or "$B$7") into 0-indexed coordinates.
pub fn parse_cell_ref(cell_ref: &str) -> Option<CellCoords> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let upper = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
            col = col.checked_mul(26)?.checked_add(upper)?;
            saw_col = true;
        } else if let Some(d) = ch.to_digit(10) {
            row = row.checked_mul(10)?.checked_add(d)?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some(CellCoords::new(col - 1, row - 1))
}

/// Parse "A1:C4" or a single "B2" into an inclusive range.
pub fn parse_cell_range(range: &str) -> Option<CellRange> {
    let (start, end) = match range.split_once(':') {
        Some((s, e)) => (parse_cell_ref(s)?, parse_cell_ref(e)?),
        None => {
            let c = parse_cell_ref(range)?;
            (c, c)
        }
    };
    Some(CellRange::from_bounds(
        (start.column.min(end.column), start.column.max(end.column)),
        (start.row.min(end.row), start.row.max(end.row)),
    ))
}
