//! Batch coordinator: run the pipeline over every image in a directory.
//!
//! Inputs are the files directly inside the input directory whose extension
//! names a recognized raster format (JPEG, PNG, BMP, TIFF, WebP, matched
//! case-insensitively). Each one is written to
//! `<output_dir>/<stem>_processed.jpg`.
//!
//! ## Failure isolation
//!
//! A file that fails to read, decode, encode or write produces an error
//! record and the batch moves on. Only problems with the directories
//! themselves surface as [`BatchError`].
//!
//! ## Parallelism
//!
//! Items run on the rayon pool. Each item's intermediates live in memory
//! inside its own pipeline call, so workers share nothing but the output
//! directory. Results are collected in enumeration order and the summary
//! is computed once, after every item has finished.
//!
//! ## Name collisions
//!
//! Output names ignore the input extension, so `den.png` and `den.jpg` would
//! both map to `den_processed.jpg`. The first in file-name order is
//! processed; the others are recorded as failures instead of silently
//! overwriting each other.

use crate::imaging::{EnhancementLevel, ImageBackend, bytes_to_mb, compression_ratio};
use crate::naming::{is_supported_input, processed_file_name};
use crate::process::{Pipeline, ProcessEvent, ProcessingFailure, ProcessingMetadata};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("cannot read input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Totals over one batch, derived from the per-item records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_images: usize,
    pub successful: usize,
    pub failed: usize,
    /// Summed input bytes of successful items only.
    pub total_original_size: u64,
    /// Summed output bytes of successful items only.
    pub total_final_size: u64,
    pub total_original_size_mb: f64,
    pub total_final_size_mb: f64,
    /// Computed once over the summed sizes; zero when nothing succeeded.
    pub overall_compression_ratio: f64,
    pub enhancement_level: EnhancementLevel,
}

impl BatchSummary {
    pub fn from_results(results: &[ProcessingMetadata], level: EnhancementLevel) -> Self {
        let mut successful = 0;
        let mut total_original_size = 0u64;
        let mut total_final_size = 0u64;
        for meta in results {
            if let ProcessingMetadata::Success(s) = meta {
                successful += 1;
                total_original_size += s.original_file_size;
                total_final_size += s.final_file_size;
            }
        }

        Self {
            total_images: results.len(),
            successful,
            failed: results.len() - successful,
            total_original_size,
            total_final_size,
            total_original_size_mb: bytes_to_mb(total_original_size),
            total_final_size_mb: bytes_to_mb(total_final_size),
            overall_compression_ratio: compression_ratio(total_original_size, total_final_size),
            enhancement_level: level,
        }
    }
}

/// Summary plus one record per input, in enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<ProcessingMetadata>,
}

/// A planned item: where it reads from and where it would write.
#[derive(Debug, Clone, PartialEq)]
struct BatchItem {
    input: PathBuf,
    output: PathBuf,
    /// Earlier input that already claimed `output`.
    collides_with: Option<PathBuf>,
}

/// List the recognized image files directly inside `dir`, sorted by name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let entries = fs::read_dir(dir).map_err(|source| BatchError::InputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut inputs: Vec<PathBuf> = entries
        .filter_map(|entry| skip_unreadable(dir, entry))
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_supported_input(p))
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// Keep a readable entry; log and drop one the OS could not stat.
fn skip_unreadable<T>(dir: &Path, entry: std::io::Result<T>) -> Option<T> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
            None
        }
    }
}

fn plan_items(inputs: Vec<PathBuf>, output_dir: &Path) -> Vec<BatchItem> {
    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    inputs
        .into_iter()
        .map(|input| {
            let name = processed_file_name(&input);
            let collides_with = claimed.get(&name).cloned();
            if collides_with.is_none() {
                claimed.insert(name.clone(), input.clone());
            }
            BatchItem {
                output: output_dir.join(name),
                input,
                collides_with,
            }
        })
        .collect()
}

fn run_item<B: ImageBackend>(
    pipeline: &Pipeline<B>,
    item: &BatchItem,
    level: EnhancementLevel,
) -> ProcessingMetadata {
    match &item.collides_with {
        Some(first) => ProcessingMetadata::Error(ProcessingFailure {
            error: format!(
                "output {} is already produced from {}",
                item.output.display(),
                first.display()
            ),
            input_path: item.input.display().to_string(),
        }),
        None => pipeline.process(&item.input, Some(&item.output), level),
    }
}

/// Process every recognized image in `input_dir` into `output_dir`.
///
/// Never stops on a per-item failure; the report always holds one record
/// per discovered input.
pub fn process_batch<B: ImageBackend>(
    pipeline: &Pipeline<B>,
    input_dir: &Path,
    output_dir: &Path,
    level: EnhancementLevel,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, BatchError> {
    let inputs = discover_inputs(input_dir)?;
    fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let items = plan_items(inputs, output_dir);
    let total = items.len();
    if let Some(tx) = &progress {
        tx.send(ProcessEvent::BatchStarted {
            total,
            enhancement: level,
        })
        .ok();
    }

    let results: Vec<ProcessingMetadata> = items
        .par_iter()
        .enumerate()
        .map(|(i, item)| {
            let metadata = run_item(pipeline, item, level);
            if let ProcessingMetadata::Error(e) = &metadata {
                warn!(input = %e.input_path, error = %e.error, "item failed");
            }
            if let Some(tx) = &progress {
                tx.send(ProcessEvent::ItemFinished {
                    position: i + 1,
                    total,
                    input: item.input.display().to_string(),
                    metadata: metadata.clone(),
                })
                .ok();
            }
            metadata
        })
        .collect();

    let summary = BatchSummary::from_results(&results, level);
    info!(
        total = summary.total_images,
        successful = summary.successful,
        failed = summary.failed,
        "batch finished"
    );
    Ok(BatchReport { summary, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{Quality, TargetGeometry};
    use crate::process::ProcessingSuccess;
    use crate::test_helpers::{file_names, write_corrupt_file, write_test_image};
    use image::ImageFormat;
    use tempfile::TempDir;

    fn mock_pipeline() -> Pipeline<MockBackend> {
        Pipeline::with_backend(
            MockBackend::with_encoded_len(100),
            TargetGeometry::default(),
            Quality::default(),
        )
    }

    fn success(original: u64, final_size: u64) -> ProcessingMetadata {
        ProcessingMetadata::Success(ProcessingSuccess {
            input_path: "in/kitchen.jpg".to_string(),
            original_file_size: original,
            final_file_size: final_size,
            compression_ratio: compression_ratio(original, final_size),
            original_dimensions: (4000, 3000),
            final_dimensions: (1080, 810),
            enhancement_level: EnhancementLevel::Medium,
            quality_setting: 85,
            output_path: PathBuf::from("out.jpg"),
        })
    }

    fn failure(input: &str) -> ProcessingMetadata {
        ProcessingMetadata::Error(ProcessingFailure {
            error: "cannot decode".to_string(),
            input_path: input.to_string(),
        })
    }

    // =========================================================================
    // Summary arithmetic
    // =========================================================================

    #[test]
    fn summary_sums_successes_only() {
        let results = vec![success(1000, 250), failure("bad.jpg"), success(3000, 750)];
        let summary = BatchSummary::from_results(&results, EnhancementLevel::Strong);

        assert_eq!(summary.total_images, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_original_size, 4000);
        assert_eq!(summary.total_final_size, 1000);
        assert!((summary.overall_compression_ratio - 75.0).abs() < 1e-9);
        assert_eq!(summary.enhancement_level, EnhancementLevel::Strong);
    }

    #[test]
    fn overall_ratio_is_computed_over_totals() {
        // Per-item ratios 90% and -100% would average to -5%
        let results = vec![success(1000, 100), success(100, 200)];
        let summary = BatchSummary::from_results(&results, EnhancementLevel::Medium);
        let expected = (1.0 - 300.0 / 1100.0) * 100.0;
        assert!((summary.overall_compression_ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn all_failed_batch_reports_zero_ratio() {
        let results = vec![failure("a.jpg"), failure("b.png")];
        let summary = BatchSummary::from_results(&results, EnhancementLevel::Medium);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total_original_size, 0);
        assert_eq!(summary.overall_compression_ratio, 0.0);
    }

    #[test]
    fn empty_batch_summary() {
        let summary = BatchSummary::from_results(&[], EnhancementLevel::Light);
        assert_eq!(summary.total_images, 0);
        assert_eq!(summary.successful + summary.failed, 0);
        assert_eq!(summary.overall_compression_ratio, 0.0);
    }

    #[test]
    fn summary_reports_megabytes() {
        let results = vec![success(3 * 1024 * 1024, 1024 * 1024 / 2)];
        let summary = BatchSummary::from_results(&results, EnhancementLevel::Medium);
        assert_eq!(summary.total_original_size_mb, 3.0);
        assert_eq!(summary.total_final_size_mb, 0.5);
    }

    // =========================================================================
    // Discovery and planning
    // =========================================================================

    #[test]
    fn discovers_only_recognized_files_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in ["c.PNG", "a.jpg", "notes.txt", "b.webp", "d.tiff"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }
        fs::create_dir(tmp.path().join("nested.jpg")).unwrap();

        let inputs = discover_inputs(tmp.path()).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.webp", "c.PNG", "d.tiff"]);
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let dir = Path::new("/photos");
        assert_eq!(skip_unreadable(dir, Ok(7)), Some(7));
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert_eq!(skip_unreadable::<u32>(dir, Err(denied)), None);
    }

    #[test]
    fn missing_input_dir_is_an_error() {
        let result = discover_inputs(Path::new("/nonexistent/photos"));
        assert!(matches!(result, Err(BatchError::InputDir { .. })));
    }

    #[test]
    fn plan_flags_colliding_output_names() {
        let out = Path::new("/out");
        let items = plan_items(
            vec![
                PathBuf::from("/in/den.jpg"),
                PathBuf::from("/in/den.png"),
                PathBuf::from("/in/hall.jpg"),
            ],
            out,
        );
        assert_eq!(items[0].output, out.join("den_processed.jpg"));
        assert_eq!(items[0].collides_with, None);
        assert_eq!(items[1].output, out.join("den_processed.jpg"));
        assert_eq!(items[1].collides_with, Some(PathBuf::from("/in/den.jpg")));
        assert_eq!(items[2].collides_with, None);
    }

    // =========================================================================
    // Batch runs
    // =========================================================================

    #[test]
    fn one_corrupt_file_does_not_stop_the_batch() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for name in ["a.jpg", "b.jpg", "d.jpg"] {
            fs::write(input.path().join(name), b"pixels").unwrap();
        }
        fs::write(input.path().join("c.jpg"), MockBackend::CORRUPT).unwrap();

        let report = process_batch(
            &mock_pipeline(),
            input.path(),
            output.path(),
            EnhancementLevel::Medium,
            None,
        )
        .unwrap();

        assert_eq!(report.summary.total_images, 4);
        assert_eq!(report.summary.successful, 3);
        assert_eq!(report.summary.failed, 1);
        match &report.results[2] {
            ProcessingMetadata::Error(e) => assert!(e.input_path.ends_with("c.jpg")),
            other => panic!("expected failure for c.jpg, got {other:?}"),
        }
        // Every record, success or not, names its own input
        for (meta, name) in report.results.iter().zip(["a.jpg", "b.jpg", "c.jpg", "d.jpg"]) {
            assert!(meta.input_path().ends_with(name), "{meta:?}");
        }
        assert_eq!(
            file_names(output.path()),
            vec!["a_processed.jpg", "b_processed.jpg", "d_processed.jpg"]
        );
    }

    #[test]
    fn collision_is_recorded_as_failure() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("den.jpg"), b"first").unwrap();
        fs::write(input.path().join("den.png"), b"second").unwrap();

        let report = process_batch(
            &mock_pipeline(),
            input.path(),
            output.path(),
            EnhancementLevel::Medium,
            None,
        )
        .unwrap();

        assert_eq!(report.summary.successful, 1);
        assert_eq!(report.summary.failed, 1);
        match &report.results[1] {
            ProcessingMetadata::Error(e) => {
                assert!(e.input_path.ends_with("den.png"));
                assert!(e.error.contains("already produced"), "{}", e.error);
            }
            other => panic!("expected collision failure, got {other:?}"),
        }
    }

    #[test]
    fn creates_missing_output_dir() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a.bmp"), b"pixels").unwrap();
        let nested = output.path().join("web").join("listing");

        let report = process_batch(
            &mock_pipeline(),
            input.path(),
            &nested,
            EnhancementLevel::Light,
            None,
        )
        .unwrap();
        assert_eq!(report.summary.successful, 1);
        assert!(nested.join("a_processed.jpg").exists());
    }

    #[test]
    fn emits_progress_events() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a.jpg"), b"pixels").unwrap();
        fs::write(input.path().join("b.jpg"), MockBackend::CORRUPT).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        process_batch(
            &mock_pipeline(),
            input.path(),
            output.path(),
            EnhancementLevel::Strong,
            Some(tx),
        )
        .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            ProcessEvent::BatchStarted {
                total: 2,
                enhancement: EnhancementLevel::Strong
            }
        ));
        let mut positions: Vec<usize> = events[1..]
            .iter()
            .map(|e| match e {
                ProcessEvent::ItemFinished { position, .. } => *position,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        positions.sort();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn empty_directory_gives_empty_report() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("readme.md"), b"# hi").unwrap();

        let report = process_batch(
            &mock_pipeline(),
            input.path(),
            output.path(),
            EnhancementLevel::Medium,
            None,
        )
        .unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.summary.overall_compression_ratio, 0.0);
    }

    #[test]
    fn real_backend_batch_end_to_end() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_test_image(&input.path().join("wide.png"), 300, 120, ImageFormat::Png);
        write_test_image(&input.path().join("tall.jpg"), 90, 200, ImageFormat::Jpeg);
        write_corrupt_file(&input.path().join("broken.webp"));

        let pipeline = Pipeline::new(TargetGeometry::new(120, 90), Quality::new(80));
        let report = process_batch(
            &pipeline,
            input.path(),
            output.path(),
            EnhancementLevel::Medium,
            None,
        )
        .unwrap();

        assert_eq!(report.summary.successful, 2);
        assert_eq!(report.summary.failed, 1);
        for meta in &report.results {
            if let ProcessingMetadata::Success(s) = meta {
                assert_eq!(s.final_dimensions, (120, 90));
                assert_eq!(s.quality_setting, 80);
            }
        }
        assert_eq!(
            file_names(output.path()),
            vec!["tall_processed.jpg", "wide_processed.jpg"]
        );
    }

    #[test]
    fn report_serializes_as_summary_and_results() {
        let results = vec![success(1000, 500), failure("x.jpg")];
        let report = BatchReport {
            summary: BatchSummary::from_results(&results, EnhancementLevel::Medium),
            results,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total_images"], 2);
        assert_eq!(json["summary"]["enhancement_level"], "medium");
        assert_eq!(json["results"][0]["status"], "success");
        assert_eq!(json["results"][0]["input_path"], "in/kitchen.jpg");
        assert_eq!(json["results"][1]["status"], "error");
        assert_eq!(json["results"][1]["input_path"], "x.jpg");
    }
}
