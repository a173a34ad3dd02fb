//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every item leads with its positional index and file name; sizes,
//! dimensions and errors follow as indented context lines. Failed items
//! are never dropped from the listing.
//!
//! # Output Format
//!
//! ## Single image
//!
//! ```text
//! kitchen.png → kitchen_processed.jpg
//!     Dimensions: 4000x2000 → 1080x810
//!     Size: 2.41 MB → 0.18 MB (92.5% smaller)
//!     Enhancement: medium, quality 85
//! ```
//!
//! ## Batch
//!
//! ```text
//! Processing 2 images (enhancement: medium)
//! 001 den.jpg → den_processed.jpg
//!     Dimensions: 3000x4000 → 1080x810
//!     Size: 1.20 MB → 0.21 MB (82.5% smaller)
//!     Enhancement: medium, quality 85
//! 002 notes.png
//!     Error: cannot decode notes.png: ...
//!
//! Processed 1 of 2 images (1 failed)
//!     Size: 1.20 MB → 0.21 MB (82.5% smaller)
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::BatchSummary;
use crate::imaging::{ImageStats, bytes_to_mb};
use crate::process::{ProcessEvent, ProcessingMetadata};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Last path component, or the whole string if there is none.
fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Signed ratio as a human phrase with one decimal.
///
/// ```text
/// 75.0   → 75.0% smaller
/// -12.26 → 12.3% larger
/// ```
fn format_ratio(ratio: f64) -> String {
    if ratio < 0.0 {
        format!("{:.1}% larger", -ratio)
    } else {
        format!("{:.1}% smaller", ratio)
    }
}

fn format_dimensions((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

fn size_line(depth: usize, original: u64, final_size: u64, ratio: f64) -> String {
    format!(
        "{}Size: {:.2} MB → {:.2} MB ({})",
        indent(depth),
        bytes_to_mb(original),
        bytes_to_mb(final_size),
        format_ratio(ratio)
    )
}

// ============================================================================
// Per-item records
// ============================================================================

/// Header plus context lines for one record.
///
/// `index` is shown for batch items and omitted for single runs.
pub fn format_metadata(index: Option<usize>, input: &str, meta: &ProcessingMetadata) -> Vec<String> {
    let prefix = index.map(|i| format!("{} ", format_index(i))).unwrap_or_default();
    let input_name = file_name(input);

    match meta {
        ProcessingMetadata::Success(s) => vec![
            format!(
                "{prefix}{input_name} → {}",
                file_name(&s.output_path.to_string_lossy())
            ),
            format!(
                "{}Dimensions: {} → {}",
                indent(1),
                format_dimensions(s.original_dimensions),
                format_dimensions(s.final_dimensions)
            ),
            size_line(1, s.original_file_size, s.final_file_size, s.compression_ratio),
            format!(
                "{}Enhancement: {}, quality {}",
                indent(1),
                s.enhancement_level,
                s.quality_setting
            ),
        ],
        ProcessingMetadata::Error(e) => vec![
            format!("{prefix}{input_name}"),
            format!("{}Error: {}", indent(1), e.error),
        ],
    }
}

/// Print a single-image record to stdout.
pub fn print_metadata(input: &str, meta: &ProcessingMetadata) {
    for line in format_metadata(None, input, meta) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch progress and summary
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total, enhancement } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Processing {total} {noun} (enhancement: {enhancement})")]
        }
        ProcessEvent::ItemFinished {
            position,
            input,
            metadata,
            ..
        } => format_metadata(Some(*position), input, metadata),
    }
}

/// Format the totals of a finished batch.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let mut header = format!(
        "Processed {} of {} images",
        summary.successful, summary.total_images
    );
    if summary.failed > 0 {
        header.push_str(&format!(" ({} failed)", summary.failed));
    }
    lines.push(header);

    if summary.successful > 0 {
        lines.push(size_line(
            1,
            summary.total_original_size,
            summary.total_final_size,
            summary.overall_compression_ratio,
        ));
    }
    lines
}

/// Print batch totals to stdout, preceded by a blank separator line.
pub fn print_batch_summary(summary: &BatchSummary) {
    println!();
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Format `stats` command output.
///
/// ```text
/// photo.png
///     Dimensions: 300x200 (ratio 1.5)
///     Mode: RGB
///     Format: PNG
///     Size: 0.17 MB
/// ```
pub fn format_image_stats(path: &Path, stats: &ImageStats) -> Vec<String> {
    vec![
        path.display().to_string(),
        format!(
            "{}Dimensions: {} (ratio {})",
            indent(1),
            format_dimensions(stats.dimensions),
            stats.aspect_ratio
        ),
        format!("{}Mode: {}", indent(1), stats.mode),
        format!(
            "{}Format: {}",
            indent(1),
            stats.format.as_deref().unwrap_or("unknown")
        ),
        format!("{}Size: {:.2} MB", indent(1), stats.file_size_mb),
    ]
}

/// Print `stats` output to stdout.
pub fn print_image_stats(path: &Path, stats: &ImageStats) {
    for line in format_image_stats(path, stats) {
        println!("{}", line);
    }
}
