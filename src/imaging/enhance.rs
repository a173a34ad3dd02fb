//! Pixel-level enhancement operators.
//!
//! The four factor-driven adjustments share one model: build a *degenerate*
//! version of the image and interpolate (or extrapolate) between it and the
//! original. A factor of `1.0` returns the original, `0.0` returns the
//! degenerate image, values above `1.0` push away from it.
//!
//! | Adjustment | Degenerate image |
//! |---|---|
//! | Brightness | black |
//! | Contrast | flat gray at the mean luma |
//! | Saturation | per-pixel grayscale |
//! | Sharpness | 3×3 smoothed copy (borders untouched) |

use super::params::EnhancementProfile;
use image::{Rgb, RgbImage};
use imageproc::filter::median_filter;

/// Histogram percentage clipped from each end by [`autocontrast`].
pub const AUTOCONTRAST_CUTOFF: f32 = 1.0;

/// Window size of the denoising median pass.
pub const DENOISE_WINDOW: u32 = 1;

/// Apply a full profile: the four factors, then color balance, then denoise.
///
/// Color balance runs after the manual factors so it corrects whatever
/// clipping or casts they introduced.
pub fn apply_profile(pixels: &RgbImage, profile: &EnhancementProfile) -> RgbImage {
    let img = adjust_brightness(pixels, profile.brightness);
    let img = adjust_contrast(&img, profile.contrast);
    let img = adjust_saturation(&img, profile.saturation);
    let img = adjust_sharpness(&img, profile.sharpness);
    let img = autocontrast(&img, AUTOCONTRAST_CUTOFF);
    denoise(&img)
}

/// Median over a [`DENOISE_WINDOW`]-sized square, per channel.
///
/// A window of 1 keeps every pixel as is.
pub fn denoise(img: &RgbImage) -> RgbImage {
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    let radius = DENOISE_WINDOW / 2;
    median_filter(img, radius, radius)
}

/// ITU-R 601-2 luma in 16.16 fixed point, rounded to an integer level.
#[inline]
fn luma(p: &Rgb<u8>) -> u8 {
    let [r, g, b] = p.0.map(u32::from);
    ((r * 19595 + g * 38470 + b * 7471 + 0x8000) >> 16) as u8
}

#[inline]
fn blend(degenerate: f32, value: u8, factor: f32) -> u8 {
    (degenerate + factor * (value as f32 - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}

fn blend_pixel(degenerate: [f32; 3], p: &Rgb<u8>, factor: f32) -> Rgb<u8> {
    Rgb([
        blend(degenerate[0], p.0[0], factor),
        blend(degenerate[1], p.0[1], factor),
        blend(degenerate[2], p.0[2], factor),
    ])
}

pub fn adjust_brightness(img: &RgbImage, factor: f32) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        blend_pixel([0.0; 3], img.get_pixel(x, y), factor)
    })
}

pub fn adjust_contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let count = img.width() as u64 * img.height() as u64;
    if count == 0 {
        return img.clone();
    }
    let sum: u64 = img.pixels().map(|p| luma(p) as u64).sum();
    let mean = (sum as f64 / count as f64).round() as f32;
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        blend_pixel([mean; 3], img.get_pixel(x, y), factor)
    })
}

pub fn adjust_saturation(img: &RgbImage, factor: f32) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let gray = luma(p) as f32;
        blend_pixel([gray; 3], p, factor)
    })
}

pub fn adjust_sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let p = img.get_pixel(x, y);
        if x == 0 || y == 0 || x + 1 >= w || y + 1 >= h {
            return *p;
        }
        // Smoothing kernel: neighbors weight 1, center weight 5, over 13
        let mut acc = [0u32; 3];
        for dy in 0..3 {
            for dx in 0..3 {
                let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                let n = img.get_pixel(x + dx - 1, y + dy - 1);
                for c in 0..3 {
                    acc[c] += weight * n.0[c] as u32;
                }
            }
        }
        let smoothed = acc.map(|v| (v as f32 / 13.0).round());
        blend_pixel(smoothed, p, factor)
    })
}

/// Per-channel contrast stretch.
///
/// For each channel, `cutoff` percent of the pixels are discarded from the
/// dark end and from the bright end of the histogram; the remaining range
/// is mapped linearly onto `0..=255`. Channels with a single remaining
/// value are left unchanged.
pub fn autocontrast(img: &RgbImage, cutoff: f32) -> RgbImage {
    let mut histograms = [[0u64; 256]; 3];
    for p in img.pixels() {
        for (c, hist) in histograms.iter_mut().enumerate() {
            hist[p.0[c] as usize] += 1;
        }
    }
    let luts = histograms.map(|hist| stretch_lut(hist, cutoff));

    let mut out = img.clone();
    for p in out.pixels_mut() {
        for (c, lut) in luts.iter().enumerate() {
            p.0[c] = lut[p.0[c] as usize];
        }
    }
    out
}

fn stretch_lut(mut hist: [u64; 256], cutoff: f32) -> [u8; 256] {
    let total: u64 = hist.iter().sum();
    let cut = (total as f64 * cutoff as f64 / 100.0) as u64;
    trim_bins(hist.iter_mut(), cut);
    trim_bins(hist.iter_mut().rev(), cut);

    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }
    let lo = hist.iter().position(|&n| n > 0);
    let hi = hist.iter().rposition(|&n| n > 0);
    if let (Some(lo), Some(hi)) = (lo, hi) {
        if hi <= lo {
            return lut;
        }
        let scale = 255.0 / (hi - lo) as f64;
        let offset = -(lo as f64) * scale;
        for (i, v) in lut.iter_mut().enumerate() {
            *v = (i as f64 * scale + offset).floor().clamp(0.0, 255.0) as u8;
        }
    }
    lut
}

fn trim_bins<'a>(bins: impl Iterator<Item = &'a mut u64>, mut cut: u64) {
    for n in bins {
        if cut == 0 {
            break;
        }
        let take = cut.min(*n);
        *n -= take;
        cut -= take;
    }
}
