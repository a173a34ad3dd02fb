//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Enhance | [`enhance::apply_profile`](super::enhance::apply_profile) |
//! | Crop | `image::imageops::crop_imm` on the source window |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Sharpening | unsharp mask over `image::imageops::blur` |
//! | Encode → JPEG | `jpeg-encoder` (progressive, optimized Huffman tables) |

use super::backend::{BackendError, ImageBackend};
use super::calculations::FillCrop;
use super::enhance::apply_profile;
use super::params::{EnhancementProfile, Quality, UnsharpMask};
use super::raster::RasterImage;
use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::sync::LazyLock;

/// Recognized raster inputs, by extension.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Sharpen by adding back the difference from a Gaussian-blurred copy.
///
/// Channels whose difference is below `threshold` are left alone so flat
/// areas and mild noise are not amplified.
pub(crate) fn unsharp_mask(img: &RgbImage, mask: UnsharpMask) -> RgbImage {
    let blurred = imageops::blur(img, mask.radius);
    let amount = mask.percent as f32 / 100.0;
    let threshold = mask.threshold as i16;

    let mut out = img.clone();
    for (p, b) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let diff = p.0[c] as i16 - b.0[c] as i16;
            if diff.abs() >= threshold {
                let v = p.0[c] as f32 + diff as f32 * amount;
                p.0[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Encode as a progressive, Huffman-optimized baseline-color JPEG.
fn encode_jpeg(img: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let to_u16 = |v: u32, axis: &str| {
        u16::try_from(v).map_err(|_| {
            BackendError::Encode(format!("{axis} {v}px exceeds the JPEG limit of 65535px"))
        })
    };
    let width = to_u16(img.width(), "width")?;
    let height = to_u16(img.height(), "height")?;

    let mut out = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut out, quality.value() as u8);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(img.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader.format();
        let img = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let color = img.color();
        Ok(RasterImage::new(img.into_rgb8(), format, color))
    }

    fn enhance(&self, image: RasterImage, profile: &EnhancementProfile) -> RasterImage {
        let enhanced = apply_profile(image.pixels(), profile);
        image.with_pixels(enhanced)
    }

    fn resize_to_fill(
        &self,
        image: RasterImage,
        plan: &FillCrop,
    ) -> Result<RasterImage, BackendError> {
        if plan.width == 0 || plan.height == 0 {
            return Err(BackendError::InvalidGeometry(format!(
                "zero-area crop {}x{}",
                plan.width, plan.height
            )));
        }

        // Cut the kept region from the source, then resample only that
        let window = plan.source;
        let kept =
            imageops::crop_imm(image.pixels(), window.x, window.y, window.width, window.height)
                .to_image();
        let cropped = if kept.dimensions() == (plan.width, plan.height) {
            kept
        } else {
            imageops::resize(&kept, plan.width, plan.height, FilterType::Lanczos3)
        };
        Ok(image.with_pixels(cropped))
    }

    fn encode(
        &self,
        image: &RasterImage,
        quality: Quality,
        sharpening: UnsharpMask,
    ) -> Result<Vec<u8>, BackendError> {
        let sharpened = unsharp_mask(image.pixels(), sharpening);
        encode_jpeg(&sharpened, quality)
    }
}
