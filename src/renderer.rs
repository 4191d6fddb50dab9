//! Rasterizes the base image and grid overlay onto an owned surface.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

use crate::annotation::ImageAnnotations;
use crate::model::GridConfig;
use crate::overlay::{build_overlay, Overlay, OverlayShape};

/// RGBA drawing buffer. Owned by exactly one [`Renderer`].
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: RgbaImage,
}

impl Surface {
    /// Create a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Write the surface as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.buffer.width() && y < self.buffer.height() {
            self.buffer.get_pixel_mut(x, y).blend(&color);
        }
    }
}

/// Draws one image with its grid overlay.
///
/// Every call repaints the whole surface from its inputs, so rendering the same
/// inputs twice yields identical pixels.
#[derive(Debug)]
pub struct Renderer {
    surface: Surface,
    frames_rendered: u64,
}

impl Renderer {
    /// Take ownership of `surface` for the renderer's lifetime.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            frames_rendered: 0,
        }
    }

    /// Create a renderer with a surface sized to the grid.
    pub fn for_grid(config: &GridConfig) -> Self {
        Self::new(Surface::new(config.resize_width(), config.resize_height()))
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Number of frames drawn so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Draw `base` scaled to the grid with the overlay for `annotations`.
    pub fn render(
        &mut self,
        base: &RgbaImage,
        config: &GridConfig,
        annotations: &ImageAnnotations,
    ) -> &RgbaImage {
        self.draw_base(base, config.resize_width(), config.resize_height());
        let overlay = build_overlay(config, annotations);
        self.draw_overlay(&overlay);
        self.frames_rendered += 1;
        log::trace!(
            "Rendered frame {} ({} overlay items)",
            self.frames_rendered,
            overlay.items.len()
        );
        &self.surface.buffer
    }

    fn draw_base(&mut self, base: &RgbaImage, width: u32, height: u32) {
        if base.dimensions() == (width, height) {
            self.surface.buffer.clone_from(base);
        } else {
            log::trace!(
                "Scaling base image {:?} to {}x{}",
                base.dimensions(),
                width,
                height
            );
            self.surface.buffer = imageops::resize(base, width, height, FilterType::Triangle);
        }
    }

    fn draw_overlay(&mut self, overlay: &Overlay) {
        let width = self.surface.width();
        let height = self.surface.height();

        for item in &overlay.items {
            match item.shape {
                OverlayShape::VerticalLine { x } => {
                    for dx in 0..item.stroke_width {
                        for y in 0..height {
                            self.surface.blend(x + dx, y, item.color);
                        }
                    }
                }
                OverlayShape::HorizontalLine { y } => {
                    for dy in 0..item.stroke_width {
                        for x in 0..width {
                            self.surface.blend(x, y + dy, item.color);
                        }
                    }
                }
                OverlayShape::CellBorder { x, y, size } => {
                    let stroke = item.stroke_width.min(size / 2);
                    let far = size - 1;
                    for t in 0..stroke {
                        for i in 0..size {
                            self.surface.blend(x + i, y + t, item.color);
                            self.surface.blend(x + i, y + far - t, item.color);
                        }
                        // Vertical edges skip the rows already covered above
                        for i in stroke..size - stroke {
                            self.surface.blend(x + t, y + i, item.color);
                            self.surface.blend(x + far - t, y + i, item.color);
                        }
                    }
                }
            }
        }
    }
}
