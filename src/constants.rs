//! Global constants for the patch annotation engine

/// Smallest patch edge (in pixels) accepted from a process descriptor.
pub const MIN_PATCH_SIZE: u32 = 32;

/// Smallest resize edge (in pixels) accepted from a process descriptor.
pub const MIN_RESIZE: u32 = 320;

/// Separator between class names in a process descriptor.
pub const CLASS_SEPARATOR: char = ',';

/// Name of the process descriptor file inside a dataset directory.
pub const PROCESS_FILE_NAME: &str = "process.json";

/// Overlay styling
pub mod overlay {
    use image::Rgba;

    /// Unlabeled grid lines: black at half opacity.
    pub const GRID_LINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 128]);

    /// Stroke width of unlabeled grid lines.
    pub const GRID_LINE_WIDTH: u32 = 1;

    /// Stroke width of a labeled cell's border.
    pub const CELL_STROKE_WIDTH: u32 = 3;
}
