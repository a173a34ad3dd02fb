//! Pipeline configuration.
//!
//! The library never reads files on its own: [`Pipeline::new`](crate::process::Pipeline::new)
//! takes plain parameters. This module is the CLI's layer on top: stock
//! defaults, an optional `photoprep.toml` merged over them, then command-line
//! flags overriding individual values.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! quality = 85              # JPEG quality (60-100)
//! enhancement = "medium"    # light | medium | strong
//!
//! [target]
//! width = 1080              # Exact output canvas
//! height = 810
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early. Unknown enhancement
//! names are not: they resolve to `medium`, same as on the command line.

use crate::imaging::{EnhancementLevel, Quality, TargetGeometry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "photoprep.toml";

/// Accepted quality range.
pub const QUALITY_RANGE: std::ops::RangeInclusive<u32> = 60..=100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a pipeline run can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Encoder quality, passed straight to the JPEG encoder.
    pub quality: u32,
    /// Enhancement preset applied before resizing.
    pub enhancement: EnhancementLevel,
    /// Exact output canvas.
    pub target: TargetGeometry,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
            enhancement: EnhancementLevel::default(),
            target: TargetGeometry::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

/// Per-invocation overrides, usually straight from CLI flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub quality: Option<u32>,
    pub enhancement: Option<EnhancementLevel>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !QUALITY_RANGE.contains(&self.quality) {
            return Err(ConfigError::Validation(format!(
                "quality must be {}-{}, got {}",
                QUALITY_RANGE.start(),
                QUALITY_RANGE.end(),
                self.quality
            )));
        }
        if self.target.width == 0 || self.target.height == 0 {
            return Err(ConfigError::Validation(
                "target width and height must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Apply overrides, then re-validate.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ConfigError> {
        if let Some(q) = overrides.quality {
            self.quality = q;
        }
        if let Some(level) = overrides.enhancement {
            self.enhancement = level;
        }
        if let Some(w) = overrides.width {
            self.target.width = w;
        }
        if let Some(h) = overrides.height {
            self.target.height = h;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn quality_setting(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse TOML text over the stock defaults and validate the result.
pub fn parse_config(content: &str) -> Result<PipelineConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a specific file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] in `dir` if it
/// exists, else the stock defaults.
pub fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<PipelineConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if candidate.exists() {
        load_config(&candidate)
    } else {
        Ok(PipelineConfig::default())
    }
}

/// Returns a fully-commented stock `photoprep.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photoprep configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# JPEG quality passed straight to the encoder (60 = smallest, 100 = best).
quality = 85

# Enhancement preset: "light", "medium" or "strong".
# Any other name is treated as "medium".
enhancement = "medium"

# ---------------------------------------------------------------------------
# Output canvas
# ---------------------------------------------------------------------------
# Every output is exactly this size. Sources are scaled to cover it and the
# overflowing axis is center-cropped; nothing is letterboxed.
[target]
width = 1080
height = 810

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel workers for batch runs.
# Omit to use all CPU cores. Values above the core count are clamped.
# max_processes = 4
"##
}
