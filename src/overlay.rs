//! Overlay shapes drawn on top of the base image.
//!
//! Building the overlay is pure: grid geometry plus one image's annotations in,
//! a list of shapes out. Rasterizing it is the renderer's job.

use image::Rgba;

use crate::annotation::ImageAnnotations;
use crate::color_utils::color_for;
use crate::constants::overlay::{CELL_STROKE_WIDTH, GRID_LINE_COLOR, GRID_LINE_WIDTH};
use crate::model::GridConfig;

/// A shape that can be drawn as an overlay, in surface pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayShape {
    /// Full-height line starting at column `x`.
    VerticalLine {
        /// Left edge of the line
        x: u32,
    },
    /// Full-width line starting at row `y`.
    HorizontalLine {
        /// Top edge of the line
        y: u32,
    },
    /// Border of one square cell, stroked inward.
    CellBorder {
        /// Left edge of the cell
        x: u32,
        /// Top edge of the cell
        y: u32,
        /// Edge length of the cell
        size: u32,
    },
}

/// An overlay item with shape and styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayItem {
    /// The shape to draw
    pub shape: OverlayShape,
    /// Stroke color (alpha is blended over what's below)
    pub color: Rgba<u8>,
    /// Stroke width in pixels
    pub stroke_width: u32,
}

/// Shapes to draw, in paint order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub items: Vec<OverlayItem>,
}

impl Overlay {
    pub fn push(&mut self, item: OverlayItem) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Build the grid overlay for one image.
///
/// Grid lines come first so labeled cell borders paint over them.
pub fn build_overlay(config: &GridConfig, annotations: &ImageAnnotations) -> Overlay {
    let mut overlay = Overlay::default();
    let patch = config.patch_size();

    for x in (0..config.resize_width()).step_by(patch as usize) {
        overlay.push(OverlayItem {
            shape: OverlayShape::VerticalLine { x },
            color: GRID_LINE_COLOR,
            stroke_width: GRID_LINE_WIDTH,
        });
    }
    for y in (0..config.resize_height()).step_by(patch as usize) {
        overlay.push(OverlayItem {
            shape: OverlayShape::HorizontalLine { y },
            color: GRID_LINE_COLOR,
            stroke_width: GRID_LINE_WIDTH,
        });
    }

    for (class_index, cells) in annotations.iter() {
        let color = color_for(class_index);
        for coord in cells {
            let (x, y) = coord.pixel_origin(patch);
            overlay.push(OverlayItem {
                shape: OverlayShape::CellBorder { x, y, size: patch },
                color,
                stroke_width: CELL_STROKE_WIDTH,
            });
        }
    }

    overlay
}
