//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: decode, enhance, resize_to_fill, and encode. Each one consumes
//! or borrows a [`RasterImage`] and returns a new value; no backend keeps
//! state between calls.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust, no system
//! libraries. Tests use the `MockBackend` in this module's test submodule.

use super::calculations::FillCrop;
use super::params::{EnhancementProfile, Quality, UnsharpMask};
use super::raster::RasterImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the orchestrator
/// stays backend-agnostic. `Sync` is required because batches share one
/// backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Decode encoded bytes into an RGB raster.
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, BackendError>;

    /// Apply an enhancement profile. Has no failure mode.
    fn enhance(&self, image: RasterImage, profile: &EnhancementProfile) -> RasterImage;

    /// Produce exactly `plan.width × plan.height` pixels showing the plan's
    /// centered crop. Backends should cut `plan.source` before resampling;
    /// `plan.scaled_*` can be far larger than anything worth allocating.
    fn resize_to_fill(&self, image: RasterImage, plan: &FillCrop)
    -> Result<RasterImage, BackendError>;

    /// Sharpen and encode to the web-ready lossy format.
    fn encode(
        &self,
        image: &RasterImage,
        quality: Quality,
        sharpening: UnsharpMask,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::RgbImage;
    use std::sync::Mutex;

    /// Mock backend that records operations instead of touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    ///
    /// Inputs starting with [`MockBackend::CORRUPT`] fail to decode; every
    /// other input decodes to a blank raster of `source_dimensions`.
    pub struct MockBackend {
        pub source_dimensions: (u32, u32),
        pub encoded_len: usize,
        pub fail_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Enhance {
            brightness: f32,
            contrast: f32,
        },
        ResizeToFill {
            scaled: (u32, u32),
            offset: (u32, u32),
            output: (u32, u32),
        },
        Encode {
            quality: u32,
            percent: u32,
        },
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                source_dimensions: (400, 300),
                encoded_len: 64,
                fail_encode: false,
                operations: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockBackend {
        pub const CORRUPT: &'static [u8] = b"CORRUPT";

        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                source_dimensions: (width, height),
                ..Self::default()
            }
        }

        pub fn with_encoded_len(encoded_len: usize) -> Self {
            Self {
                encoded_len,
                ..Self::default()
            }
        }

        pub fn failing_encode() -> Self {
            Self {
                fail_encode: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<RasterImage, BackendError> {
            self.record(RecordedOp::Decode(bytes.len()));
            if bytes.starts_with(Self::CORRUPT) {
                return Err(BackendError::Decode("mock corrupt input".to_string()));
            }
            let (w, h) = self.source_dimensions;
            Ok(RasterImage::from_rgb(RgbImage::new(w, h)))
        }

        fn enhance(&self, image: RasterImage, profile: &EnhancementProfile) -> RasterImage {
            self.record(RecordedOp::Enhance {
                brightness: profile.brightness,
                contrast: profile.contrast,
            });
            image
        }

        fn resize_to_fill(
            &self,
            image: RasterImage,
            plan: &FillCrop,
        ) -> Result<RasterImage, BackendError> {
            self.record(RecordedOp::ResizeToFill {
                scaled: (plan.scaled_width, plan.scaled_height),
                offset: (plan.offset_x, plan.offset_y),
                output: (plan.width, plan.height),
            });
            Ok(image.with_pixels(RgbImage::new(plan.width, plan.height)))
        }

        fn encode(
            &self,
            _image: &RasterImage,
            quality: Quality,
            sharpening: UnsharpMask,
        ) -> Result<Vec<u8>, BackendError> {
            self.record(RecordedOp::Encode {
                quality: quality.value(),
                percent: sharpening.percent,
            });
            if self.fail_encode {
                return Err(BackendError::Encode("mock encoder failure".to_string()));
            }
            Ok(vec![0xAB; self.encoded_len])
        }
    }

    #[test]
    fn mock_decodes_to_configured_dimensions() {
        let backend = MockBackend::with_dimensions(800, 600);
        let img = backend.decode(b"anything").unwrap();
        assert_eq!(img.dimensions(), (800, 600));
        assert_eq!(backend.get_operations(), vec![RecordedOp::Decode(8)]);
    }

    #[test]
    fn mock_rejects_corrupt_input() {
        let backend = MockBackend::new();
        let result = backend.decode(b"CORRUPT bytes");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn mock_encode_honours_failure_flag() {
        let backend = MockBackend::failing_encode();
        let img = RasterImage::from_rgb(RgbImage::new(2, 2));
        let result = backend.encode(&img, Quality::new(80), UnsharpMask::web_compensation());
        assert!(matches!(result, Err(BackendError::Encode(_))));
        assert!(matches!(
            backend.get_operations()[0],
            RecordedOp::Encode {
                quality: 80,
                percent: 110
            }
        ));
    }
}
