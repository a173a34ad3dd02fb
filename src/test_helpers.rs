//! Shared test utilities for the photoprep test suite.
//!
//! Provides synthetic image builders and small filesystem helpers so tests
//! never depend on checked-in photos.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_test_image(&tmp.path().join("a.jpg"), 400, 300, ImageFormat::Jpeg);
//! write_corrupt_file(&tmp.path().join("b.png"));
//! assert_eq!(file_names(tmp.path()), vec!["a.jpg", "b.png"]);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Pixel builders
// =========================================================================

/// Deterministic high-frequency content; compresses poorly, like real photos.
pub fn noisy_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let h = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
        Rgb([(h % 251) as u8, (h / 7 % 241) as u8, (x * 255 / width.max(1)) as u8])
    })
}

/// Three vertical stripes: red `left` px, green `middle` px, blue `right` px.
pub fn striped_rgb(left: u32, middle: u32, right: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(left + middle + right, height, |x, _| {
        if x < left {
            Rgb([255, 0, 0])
        } else if x < left + middle {
            Rgb([0, 255, 0])
        } else {
            Rgb([0, 0, 255])
        }
    })
}

// =========================================================================
// Encoded fixtures
// =========================================================================

/// Encode pixels in the given container format.
pub fn encode_test_image(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Write a noisy image of the given size to `path`.
pub fn write_test_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    std::fs::write(path, encode_test_image(&noisy_rgb(width, height), format)).unwrap();
}

/// Write bytes that carry an image extension but are not an image.
pub fn write_corrupt_file(path: &Path) {
    std::fs::write(path, b"this is not really an image").unwrap();
}

// =========================================================================
// Filesystem inspection
// =========================================================================

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
