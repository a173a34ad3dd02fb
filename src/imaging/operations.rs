//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{FillCrop, plan_fill_crop};
use super::params::{EnhancementLevel, Quality, TargetGeometry, UnsharpMask};
use super::raster::RasterImage;
use image::ColorType;
use serde::Serialize;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Enhancement stage: resolve the level's profile and apply it.
pub fn enhance_image(
    backend: &impl ImageBackend,
    image: RasterImage,
    level: EnhancementLevel,
) -> RasterImage {
    backend.enhance(image, level.profile())
}

/// Plan a crop-to-fill without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_resize(source: (u32, u32), target: TargetGeometry) -> Result<FillCrop> {
    plan_fill_crop(source, target).ok_or_else(|| {
        BackendError::InvalidGeometry(format!(
            "cannot fill {target} from a {}x{} source",
            source.0, source.1
        ))
    })
}

/// Geometry stage: scale and center-crop to exactly `target`.
pub fn smart_resize(
    backend: &impl ImageBackend,
    image: RasterImage,
    target: TargetGeometry,
) -> Result<RasterImage> {
    let plan = plan_resize(image.dimensions(), target)?;
    backend.resize_to_fill(image, &plan)
}

/// Encode stage: sharpen-compensate and encode at `quality`.
///
/// No rate control: the output size follows from the quality knob alone.
pub fn compress_image(
    backend: &impl ImageBackend,
    image: &RasterImage,
    quality: Quality,
) -> Result<Vec<u8>> {
    backend.encode(image, quality, UnsharpMask::web_compensation())
}

/// Summary of a single file, for inspection before processing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageStats {
    pub dimensions: (u32, u32),
    pub mode: String,
    pub format: Option<String>,
    pub file_size_mb: f64,
    pub aspect_ratio: f64,
}

/// Decode a file and report its dimensions, color mode, format and size.
pub fn image_stats(backend: &impl ImageBackend, path: &Path) -> Result<ImageStats> {
    let bytes = std::fs::read(path)?;
    let raster = backend.decode(&bytes)?;
    let (width, height) = raster.dimensions();
    let aspect_ratio = if height == 0 {
        0.0
    } else {
        round2(width as f64 / height as f64)
    };

    Ok(ImageStats {
        dimensions: (width, height),
        mode: color_mode_name(raster.source_color()),
        format: raster
            .source_format()
            .map(|f| format!("{f:?}").to_uppercase()),
        file_size_mb: bytes_to_mb(bytes.len() as u64),
        aspect_ratio,
    })
}

/// Conventional short name of a color mode (`RGB`, `RGBA`, `L`, ...).
pub fn color_mode_name(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "L;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        other => format!("{other:?}"),
    }
}

/// Bytes to megabytes, rounded to two decimals.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / (1024.0 * 1024.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
