//! Pointer-to-cell mapping.

use crate::error::AnnotationError;
use crate::model::{CellCoord, GridConfig};

/// Maps pointer positions on the drawing surface to grid cells.
///
/// Built once per session from the grid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMapper {
    patch_size: u32,
    grid_width: u32,
    grid_height: u32,
}

impl InputMapper {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            patch_size: config.patch_size(),
            grid_width: config.grid_width(),
            grid_height: config.grid_height(),
        }
    }

    /// Map a pointer position to the cell under it.
    ///
    /// `origin` is the surface's top-left corner in the same coordinate space as
    /// `pointer`. Positions outside the rendered grid are rejected with
    /// [`AnnotationError::OutOfBounds`].
    pub fn map_click_to_cell(
        &self,
        pointer: (f32, f32),
        origin: (f32, f32),
    ) -> Result<CellCoord, AnnotationError> {
        let patch = self.patch_size as f32;
        let col = ((pointer.0 - origin.0) / patch).floor();
        let row = ((pointer.1 - origin.1) / patch).floor();

        // NaN or infinite input never maps to a cell
        if !col.is_finite() || !row.is_finite() {
            return Err(AnnotationError::OutOfBounds { col: -1, row: -1 });
        }

        let (col, row) = (col as i64, row as i64);
        if col < 0 || row < 0 || col >= i64::from(self.grid_width) || row >= i64::from(self.grid_height) {
            return Err(AnnotationError::OutOfBounds { col, row });
        }

        Ok(CellCoord::new(col as u32, row as u32))
    }
}
