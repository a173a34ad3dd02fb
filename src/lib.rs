//! # photoprep
//!
//! Deterministic photo preprocessing: every input comes out enhanced,
//! cropped to fill an exact canvas, and compressed as a progressive JPEG,
//! together with a record describing what changed.
//!
//! # Architecture: Three Stages, One Orchestrator
//!
//! ```text
//! bytes ─ decode ─▶ RasterImage
//!                     │ 1. Enhance   brightness → contrast → saturation → sharpness
//!                     │              → autocontrast (1% cutoff) → median denoise
//!                     │ 2. Resize    ratio-preserving scale + center crop to W×H
//!                     │ 3. Compress  unsharp mask → progressive JPEG at quality Q
//!                     ▼
//!                   <stem>_processed.jpg + ProcessingMetadata
//! ```
//!
//! The [`process::Pipeline`] runs the stages for one input and folds every
//! failure into a [`process::ProcessingMetadata::Error`] record. The
//! [`batch`] coordinator runs a pipeline over a directory in parallel and
//! aggregates the records into a [`batch::BatchSummary`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure-Rust pixel work: enhancement operators, crop-to-fill math, JPEG encoding |
//! | [`process`] | Single-image orchestrator and its metadata record |
//! | [`batch`] | Directory enumeration, failure isolation, summary |
//! | [`naming`] | Recognized input extensions and `_processed.jpg` output names |
//! | [`config`] | `photoprep.toml` loading, validation and CLI overrides |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## In-Memory Intermediates
//!
//! Stages hand each other owned [`imaging::RasterImage`] values. The only
//! file a run ever writes is its final output, so there is no temporary file
//! to clean up when a stage fails, and parallel workers cannot trip over
//! each other's intermediates.
//!
//! ## Errors as Records
//!
//! Per-image failures are data, not `Err`: callers always get one record per
//! input and match on success or error. Only failures that make a whole
//! batch impossible (an unreadable input directory, an uncreatable output
//! directory) are returned as [`batch::BatchError`].
//!
//! ## Lenient Presets
//!
//! Enhancement levels are a fixed table. An unrecognized level name resolves
//! to `medium` rather than failing, both in config files and on the command
//! line.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and resampling use the `image` crate (Lanczos3); progressive JPEG
//! output comes from `jpeg-encoder`. No system libraries are required.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
