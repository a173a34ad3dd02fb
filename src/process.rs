//! Single-image pipeline: enhance → smart resize → compress.
//!
//! The orchestrator decodes one input, runs the three stages strictly in
//! order, writes the final bytes, and returns a [`ProcessingMetadata`]
//! record comparing input and output.
//!
//! ## Intermediates
//!
//! Every intermediate is an in-memory [`RasterImage`](crate::imaging::RasterImage)
//! moved from one stage into the next. Nothing but the final output is ever
//! written, so there is nothing to clean up on either the success or the
//! failure path.
//!
//! ## Errors as data
//!
//! [`Pipeline::process`] never returns `Err` and never panics on bad input:
//! any [`PipelineError`] is folded into [`ProcessingMetadata::Error`] carrying
//! the input identifier and a message. Callers match on the record.
//!
//! ## Output naming
//!
//! ```text
//! listing/
//! ├── kitchen.png
//! └── kitchen_processed.jpg   # default output, always .jpg
//! ```

use crate::imaging::{
    BackendError, EnhancementLevel, ImageBackend, Quality, RustBackend, TargetGeometry,
    compress_image, compression_ratio, enhance_image, smart_resize,
};
use crate::naming::default_output_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode {name}: {source}")]
    Decode { name: String, source: BackendError },
    #[error("resize failed: {0}")]
    Resize(#[source] BackendError),
    #[error("encode failed: {0}")]
    Encode(#[source] BackendError),
    #[error("cannot write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of one pipeline run, serialized flat with a `status` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProcessingMetadata {
    Success(ProcessingSuccess),
    Error(ProcessingFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSuccess {
    /// The input as given to the pipeline (a path, or an upload's name).
    pub input_path: String,
    /// Input size in bytes.
    pub original_file_size: u64,
    /// Output size in bytes.
    pub final_file_size: u64,
    /// `(1 - final / original) * 100`; negative when the output grew.
    pub compression_ratio: f64,
    pub original_dimensions: (u32, u32),
    pub final_dimensions: (u32, u32),
    pub enhancement_level: EnhancementLevel,
    pub quality_setting: u32,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingFailure {
    pub error: String,
    pub input_path: String,
}

impl ProcessingMetadata {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The input this record describes, on either outcome.
    pub fn input_path(&self) -> &str {
        match self {
            Self::Success(s) => &s.input_path,
            Self::Error(e) => &e.input_path,
        }
    }

    /// Compression ratio, only defined for successful runs.
    pub fn compression_ratio(&self) -> Option<f64> {
        match self {
            Self::Success(s) => Some(s.compression_ratio),
            Self::Error(_) => None,
        }
    }

    fn failed(input: &str, err: &PipelineError) -> Self {
        Self::Error(ProcessingFailure {
            error: err.to_string(),
            input_path: input.to_string(),
        })
    }
}

/// Progress event emitted while a batch runs.
///
/// Sent over an optional channel so the CLI can print progress while
/// workers are still busy. Library callers can ignore them entirely.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted {
        total: usize,
        enhancement: EnhancementLevel,
    },
    /// One item finished. `position` is 1-based in enumeration order;
    /// events may arrive out of order when items run in parallel.
    ItemFinished {
        position: usize,
        total: usize,
        input: String,
        metadata: ProcessingMetadata,
    },
}

/// Configured pipeline: target canvas, encode quality, and a backend.
pub struct Pipeline<B: ImageBackend = RustBackend> {
    backend: B,
    target: TargetGeometry,
    quality: Quality,
}

impl Pipeline<RustBackend> {
    pub fn new(target: TargetGeometry, quality: Quality) -> Self {
        Self::with_backend(RustBackend::new(), target, quality)
    }
}

impl Default for Pipeline<RustBackend> {
    fn default() -> Self {
        Self::new(TargetGeometry::default(), Quality::default())
    }
}

impl<B: ImageBackend> Pipeline<B> {
    /// Build a pipeline on a specific backend (allows testing with mock).
    pub fn with_backend(backend: B, target: TargetGeometry, quality: Quality) -> Self {
        Self {
            backend,
            target,
            quality,
        }
    }

    pub fn target(&self) -> TargetGeometry {
        self.target
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Process a file. `output` defaults to `<stem>_processed.jpg` beside the input.
    pub fn process(
        &self,
        input: &Path,
        output: Option<&Path>,
        level: EnhancementLevel,
    ) -> ProcessingMetadata {
        let name = input.display().to_string();
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));

        let bytes = match std::fs::read(input) {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = PipelineError::Read {
                    path: input.to_path_buf(),
                    source,
                };
                return ProcessingMetadata::failed(&name, &err);
            }
        };
        self.process_bytes(&name, &bytes, &output, level)
    }

    /// Process an in-memory upload. `name` identifies the input in the record.
    pub fn process_bytes(
        &self,
        name: &str,
        bytes: &[u8],
        output: &Path,
        level: EnhancementLevel,
    ) -> ProcessingMetadata {
        match self.run(name, bytes, output, level) {
            Ok(success) => ProcessingMetadata::Success(success),
            Err(err) => ProcessingMetadata::failed(name, &err),
        }
    }

    fn run(
        &self,
        name: &str,
        bytes: &[u8],
        output: &Path,
        level: EnhancementLevel,
    ) -> Result<ProcessingSuccess, PipelineError> {
        debug!(input = name, bytes = bytes.len(), "decoding");
        let raster = self
            .backend
            .decode(bytes)
            .map_err(|source| PipelineError::Decode {
                name: name.to_string(),
                source,
            })?;
        let original_dimensions = raster.dimensions();

        debug!(input = name, %level, "enhancing");
        let enhanced = enhance_image(&self.backend, raster, level);

        debug!(input = name, target = %self.target, "resizing");
        let resized =
            smart_resize(&self.backend, enhanced, self.target).map_err(PipelineError::Resize)?;
        let final_dimensions = resized.dimensions();

        debug!(input = name, quality = self.quality.value(), "encoding");
        let encoded =
            compress_image(&self.backend, &resized, self.quality).map_err(PipelineError::Encode)?;

        std::fs::write(output, &encoded).map_err(|source| PipelineError::Persist {
            path: output.to_path_buf(),
            source,
        })?;

        let original_file_size = bytes.len() as u64;
        let final_file_size = encoded.len() as u64;
        Ok(ProcessingSuccess {
            input_path: name.to_string(),
            original_file_size,
            final_file_size,
            compression_ratio: compression_ratio(original_file_size, final_file_size),
            original_dimensions,
            final_dimensions,
            enhancement_level: level,
            quality_setting: self.quality.value(),
            output_path: output.to_path_buf(),
        })
    }
}
