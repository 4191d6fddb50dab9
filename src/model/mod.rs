//! Data models for the patch annotation engine.

mod cell;
mod grid;
mod image;

pub use cell::CellCoord;
pub use grid::{GridConfig, GridLimits, ProcessDescriptor};
pub use image::ImageRecord;
