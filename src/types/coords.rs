use serde::{Deserialize, Serialize};

/// One index on an axis, or the whole axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Which {
    /// Every index on the axis.
    All,
    /// A single index.
    Index(u32),
}

impl Which {
    pub fn index(self) -> Option<u32> {
        match self {
            Self::All => None,
            Self::Index(n) => Some(n),
        }
    }

    /// True if `n` is covered.
    pub fn covers(self, n: u32) -> bool {
        match self {
            Self::All => true,
            Self::Index(i) => i == n,
        }
    }
}

/// A concrete cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoords {
    pub column: u32,
    pub row: u32,
}

impl CellCoords {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// A cell, a whole row, a whole column or the whole grid.
///
/// Used both as the payload of change notifications and as the key passed to
/// value providers (a per-column memo asks its source for `column: Index(c),
/// row: All`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellTarget {
    pub column: Which,
    pub row: Which,
}

impl CellTarget {
    pub const ALL: Self = Self {
        column: Which::All,
        row: Which::All,
    };

    pub const fn cell(column: u32, row: u32) -> Self {
        Self {
            column: Which::Index(column),
            row: Which::Index(row),
        }
    }

    pub const fn column(column: u32) -> Self {
        Self {
            column: Which::Index(column),
            row: Which::All,
        }
    }

    pub const fn row(row: u32) -> Self {
        Self {
            column: Which::All,
            row: Which::Index(row),
        }
    }

    /// True if the concrete cell falls inside this target.
    pub fn covers(&self, cell: CellCoords) -> bool {
        self.column.covers(cell.column) && self.row.covers(cell.row)
    }
}

impl From<CellCoords> for CellTarget {
    fn from(c: CellCoords) -> Self {
        Self::cell(c.column, c.row)
    }
}
