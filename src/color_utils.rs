//! Class color assignment.
//!
//! Colors are a pure function of a class's position among the assignable
//! classes, so the renderer never needs shared lookup state.

use image::Rgba;

/// Fixed class palette (RGB). Cycled when classes outnumber entries.
pub const PALETTE: [[u8; 3]; 8] = [
    [230, 57, 70],
    [42, 157, 143],
    [244, 162, 97],
    [69, 123, 157],
    [233, 196, 106],
    [155, 93, 229],
    [0, 187, 249],
    [241, 91, 181],
];

/// Opaque color for the assignable class at `index`.
pub fn color_for(index: usize) -> Rgba<u8> {
    let [r, g, b] = PALETTE[index % PALETTE.len()];
    Rgba([r, g, b, 255])
}
