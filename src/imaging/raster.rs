//! In-memory decoded image.

use image::{ColorType, ImageFormat, RgbImage};

/// Decoded pixel grid, always normalized to 8-bit RGB.
///
/// The source format and color mode are kept for reporting only; every
/// stage consumes a `RasterImage` by value and returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
    source_format: Option<ImageFormat>,
    source_color: ColorType,
}

impl RasterImage {
    pub fn new(pixels: RgbImage, source_format: Option<ImageFormat>, source_color: ColorType) -> Self {
        Self {
            pixels,
            source_format,
            source_color,
        }
    }

    /// Wrap pixels that did not come from a decoder (tests, in-process callers).
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self::new(pixels, None, ColorType::Rgb8)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    pub fn source_color(&self) -> ColorType {
        self.source_color
    }

    /// Replace the pixel grid, keeping provenance.
    pub fn with_pixels(self, pixels: RgbImage) -> Self {
        Self { pixels, ..self }
    }
}
