//! Image records supplied by the dataset provider.

use image::RgbaImage;

/// One already-decoded image of a dataset.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    filename: String,
    pixels: RgbaImage,
}

impl ImageRecord {
    pub fn new(filename: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            filename: filename.into(),
            pixels,
        }
    }

    /// Filename, unique within its dataset.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}
