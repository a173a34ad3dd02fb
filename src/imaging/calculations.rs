//! Pure calculation functions for crop-to-fill geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::TargetGeometry;

/// Which axis loses content when filling the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAxis {
    /// Source is relatively wider: left and right margins are trimmed.
    Horizontal,
    /// Source is relatively taller: top and bottom margins are trimmed.
    Vertical,
    /// Aspect ratios match: pure scale.
    None,
}

/// Region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A ratio-preserving scale followed by a centered crop.
///
/// `scaled_*` and `offset_*` describe the crop on the virtual scaled image;
/// `source` is the same crop mapped back onto the source, so a backend can
/// cut first and resample only what is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillCrop {
    /// Size the source would have after scaling (covers the target on both axes).
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Top-left corner of the crop window inside the scaled image.
    pub offset_x: u32,
    pub offset_y: u32,
    /// Final size, always equal to the target.
    pub width: u32,
    pub height: u32,
    pub axis: CropAxis,
    /// The kept region in source coordinates.
    pub source: SourceWindow,
}

impl FillCrop {
    /// Pixels discarded on the (left, right) or (top, bottom) sides of the
    /// cropped axis. The second margin absorbs the odd pixel.
    pub fn margins(&self) -> (u32, u32) {
        match self.axis {
            CropAxis::Horizontal => (
                self.offset_x,
                self.scaled_width - self.width - self.offset_x,
            ),
            CropAxis::Vertical => (
                self.offset_y,
                self.scaled_height - self.height - self.offset_y,
            ),
            CropAxis::None => (0, 0),
        }
    }
}

/// Plan a crop-to-fill from `source` (width, height) onto `target`.
///
/// If the source is relatively wider than the target, the height is scaled
/// to the target height and the width overflows; otherwise the width is
/// scaled to the target width and the height overflows. The overflowing
/// dimension is truncated to an integer (never below the target) and the
/// crop offset is half the excess, rounded down.
///
/// Returns `None` when any dimension is zero, or when the scaled size of
/// the overflowing axis does not fit in a `u32`.
///
/// # Examples
/// ```
/// # use photoprep::imaging::{plan_fill_crop, CropAxis, TargetGeometry};
/// // 2:1 source onto the default 4:3 canvas → 1620×810, 270px trimmed per side
/// let plan = plan_fill_crop((4000, 2000), TargetGeometry::default()).unwrap();
/// assert_eq!((plan.scaled_width, plan.scaled_height), (1620, 810));
/// assert_eq!(plan.offset_x, 270);
/// assert_eq!(plan.axis, CropAxis::Horizontal);
/// ```
pub fn plan_fill_crop(source: (u32, u32), target: TargetGeometry) -> Option<FillCrop> {
    let (src_w, src_h) = source;
    let TargetGeometry {
        width: tgt_w,
        height: tgt_h,
    } = target;
    if src_w == 0 || src_h == 0 || tgt_w == 0 || tgt_h == 0 {
        return None;
    }

    let src_ratio = src_w as f64 / src_h as f64;
    let tgt_ratio = tgt_w as f64 / tgt_h as f64;
    let wider = src_ratio > tgt_ratio;

    // Output pixels per source pixel; the same on both axes
    let scale = if wider {
        tgt_h as f64 / src_h as f64
    } else {
        tgt_w as f64 / src_w as f64
    };

    let (scaled_w, scaled_h) = if wider {
        // Source is wider: height matches, width exceeds
        (to_dimension(tgt_h as f64 * src_w as f64 / src_h as f64)?.max(tgt_w), tgt_h)
    } else {
        // Source is taller or equal: width matches, height exceeds
        (tgt_w, to_dimension(tgt_w as f64 * src_h as f64 / src_w as f64)?.max(tgt_h))
    };

    let offset_x = (scaled_w - tgt_w) / 2;
    let offset_y = (scaled_h - tgt_h) / 2;
    let axis = if scaled_w > tgt_w {
        CropAxis::Horizontal
    } else if scaled_h > tgt_h {
        CropAxis::Vertical
    } else {
        CropAxis::None
    };

    let (x, width) = match axis {
        CropAxis::Horizontal => source_span(offset_x, tgt_w, scale, src_w),
        _ => (0, src_w),
    };
    let (y, height) = match axis {
        CropAxis::Vertical => source_span(offset_y, tgt_h, scale, src_h),
        _ => (0, src_h),
    };

    Some(FillCrop {
        scaled_width: scaled_w,
        scaled_height: scaled_h,
        offset_x,
        offset_y,
        width: tgt_w,
        height: tgt_h,
        axis,
        source: SourceWindow {
            x,
            y,
            width,
            height,
        },
    })
}

/// Truncate a scaled length to whole pixels, `None` past `u32::MAX`.
fn to_dimension(len: f64) -> Option<u32> {
    if len.is_finite() && len <= u32::MAX as f64 {
        Some(len as u32)
    } else {
        None
    }
}

/// Map `len` scaled pixels starting at `offset` back onto a source axis of
/// `src_len` pixels. The result is at least one pixel and stays in bounds.
fn source_span(offset: u32, len: u32, scale: f64, src_len: u32) -> (u32, u32) {
    let start = ((offset as f64 / scale) as u32).min(src_len - 1);
    let span = (len as f64 / scale).round() as u32;
    (start, span.clamp(1, src_len - start))
}

/// Percentage size reduction from `original` to `final_size` bytes.
///
/// Negative when the output grew. Zero when `original` is zero.
pub fn compression_ratio(original: u64, final_size: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - final_size as f64 / original as f64) * 100.0
}
