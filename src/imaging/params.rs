//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which sequences the stages) and the [`backend`](super::backend) (which
//! does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`UnsharpMask`]: Radius/percent/threshold of the post-resize sharpening pass.
//! - [`TargetGeometry`]: Exact output canvas, default 1080×810.
//! - [`EnhancementLevel`] / [`EnhancementProfile`]: Named presets and their factors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Unsharp-mask parameters.
///
/// - `radius`: Gaussian blur sigma used to build the mask
/// - `percent`: Strength of the boost applied to the difference (100 = 1×)
/// - `threshold`: Minimum per-channel difference before a pixel is sharpened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    pub radius: f32,
    pub percent: u32,
    pub threshold: u8,
}

impl UnsharpMask {
    /// Small-radius, strong boost used to recover detail lost to resampling.
    pub fn web_compensation() -> Self {
        Self {
            radius: 0.5,
            percent: 110,
            threshold: 2,
        }
    }
}

/// Exact output canvas for the geometry stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetGeometry {
    pub width: u32,
    pub height: u32,
}

impl TargetGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for TargetGeometry {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 810,
        }
    }
}

impl fmt::Display for TargetGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Multiplicative adjustment factors. `1.0` leaves an attribute unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancementProfile {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub sharpness: f32,
}

/// Named enhancement preset.
///
/// Parsing is lenient: any name other than `light`, `medium` or `strong`
/// resolves to [`EnhancementLevel::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EnhancementLevel {
    Light,
    #[default]
    Medium,
    Strong,
}

const LIGHT: EnhancementProfile = EnhancementProfile {
    brightness: 1.05,
    contrast: 1.08,
    saturation: 1.05,
    sharpness: 1.1,
};

const MEDIUM: EnhancementProfile = EnhancementProfile {
    brightness: 1.1,
    contrast: 1.15,
    saturation: 1.1,
    sharpness: 1.2,
};

const STRONG: EnhancementProfile = EnhancementProfile {
    brightness: 1.15,
    contrast: 1.25,
    saturation: 1.15,
    sharpness: 1.3,
};

impl EnhancementLevel {
    pub const ALL: [EnhancementLevel; 3] = [Self::Light, Self::Medium, Self::Strong];

    /// Resolve a caller-supplied name, falling back to `Medium`.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "strong" => Self::Strong,
            _ => Self::Medium,
        }
    }

    pub fn profile(self) -> &'static EnhancementProfile {
        match self {
            Self::Light => &LIGHT,
            Self::Medium => &MEDIUM,
            Self::Strong => &STRONG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

impl From<&str> for EnhancementLevel {
    fn from(name: &str) -> Self {
        Self::resolve(name)
    }
}

impl From<String> for EnhancementLevel {
    fn from(name: String) -> Self {
        Self::resolve(&name)
    }
}

impl fmt::Display for EnhancementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
