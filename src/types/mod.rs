//! Data types shared across the grid.

mod coords;
mod geometry;
mod range;
mod selection;

pub use coords::*;
pub use geometry::*;
pub use range::*;
pub use selection::*;
