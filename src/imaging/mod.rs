//! Image processing: pure Rust, no system libraries.
//!
//! | Stage | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader`, normalized to RGB8 |
//! | **Enhance** | factor blends + autocontrast + median ([`enhance`]) |
//! | **Smart resize** | Lanczos3 scale + center crop |
//! | **Compress** | unsharp mask + progressive JPEG (`jpeg-encoder`) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop-to-fill math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Raster**: The in-memory image passed between stages
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod enhance;
pub mod operations;
mod params;
mod raster;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{CropAxis, FillCrop, SourceWindow, compression_ratio, plan_fill_crop};
pub use operations::{
    ImageStats, bytes_to_mb, color_mode_name, compress_image, enhance_image, image_stats,
    plan_resize, smart_resize,
};
pub use params::{EnhancementLevel, EnhancementProfile, Quality, TargetGeometry, UnsharpMask};
pub use raster::RasterImage;
pub use rust_backend::RustBackend;
