//! Centralized filename rules for inputs and outputs.
//!
//! Inputs are recognized by extension alone (case-insensitive) against the
//! decoders compiled into [`RustBackend`](crate::imaging::RustBackend).
//! Outputs are always named after the input stem with a `_processed` suffix
//! and the web-ready `.jpg` extension, whatever the input format was:
//!
//! - `kitchen.png` → `kitchen_processed.jpg`
//! - `IMG_0042.JPEG` → `IMG_0042_processed.jpg`
//! - `front.view.webp` → `front.view_processed.jpg`

use crate::imaging::rust_backend::supported_input_extensions;
use std::path::{Path, PathBuf};

/// Suffix appended to the input stem.
pub const PROCESSED_SUFFIX: &str = "_processed";

/// Extension of every encoded output.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Whether `path` carries one of the recognized raster extensions.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Output file name derived from an input path or name.
pub fn processed_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}{PROCESSED_SUFFIX}.{OUTPUT_EXTENSION}")
}

/// Default output location: next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(processed_file_name(input))
}
