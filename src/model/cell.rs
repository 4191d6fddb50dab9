//! Grid cell addressing.

use serde::{Deserialize, Serialize};

/// A single `patch_size × patch_size` cell, addressed by column and row.
///
/// Serializes as a `[col, row]` pair. Ordering is column-major, which keeps the
/// coordinate lists in submission payloads stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CellCoord {
    /// Column index, counted from the left edge
    pub col: u32,
    /// Row index, counted from the top edge
    pub row: u32,
}

impl CellCoord {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Top-left pixel of this cell for the given patch size.
    pub fn pixel_origin(&self, patch_size: u32) -> (u32, u32) {
        (self.col * patch_size, self.row * patch_size)
    }
}

impl From<[u32; 2]> for CellCoord {
    fn from([col, row]: [u32; 2]) -> Self {
        Self { col, row }
    }
}

impl From<CellCoord> for [u32; 2] {
    fn from(coord: CellCoord) -> Self {
        [coord.col, coord.row]
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}
