use clap::{Parser, Subcommand};
use photoprep::imaging::{EnhancementLevel, RustBackend, image_stats};
use photoprep::process::Pipeline;
use photoprep::{batch, config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that run the pipeline.
#[derive(clap::Args, Clone)]
struct TuningArgs {
    /// Enhancement preset: light, medium or strong (anything else means medium)
    #[arg(long, short)]
    enhancement: Option<String>,

    /// JPEG quality, 60-100
    #[arg(long, short)]
    quality: Option<u32>,

    /// Output width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl TuningArgs {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            quality: self.quality,
            enhancement: self.enhancement.as_deref().map(EnhancementLevel::resolve),
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Parser)]
#[command(name = "photoprep")]
#[command(about = "Enhance, crop-to-fill and compress photos for the web")]
#[command(long_about = "\
Enhance, crop-to-fill and compress photos for the web

Every output is a progressive JPEG of exactly the target size (default
1080x810). Sources are enhanced, scaled to cover the canvas, and the
overflowing axis is center-cropped; nothing is letterboxed.

  photos/
  ├── kitchen.png
  └── den.jpg
        ↓  photoprep batch photos/ web/
  web/
  ├── kitchen_processed.jpg
  └── den_processed.jpg

Settings come from photoprep.toml in the working directory (or --config),
then from command-line flags. Run 'photoprep gen-config' for a documented
config file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./photoprep.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single image
    Process {
        /// Source image
        input: PathBuf,

        /// Output file (default: <stem>_processed.jpg next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Process every recognized image in a directory
    Batch {
        /// Directory of source images
        input_dir: PathBuf,

        /// Directory for processed images (created if missing)
        output_dir: PathBuf,

        /// Write a JSON report with the summary and per-image results
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Show dimensions, color mode, format and size of an image
    Stats {
        /// Image to inspect
        file: PathBuf,
    },
    /// Print a stock photoprep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Process {
            input,
            output: output_path,
            tuning,
        } => {
            let cfg = load_config(cli.config.as_deref(), &tuning)?;
            let pipeline = Pipeline::new(cfg.target, cfg.quality_setting());
            let meta = pipeline.process(&input, output_path.as_deref(), cfg.enhancement);
            output::print_metadata(&input.display().to_string(), &meta);
            if !meta.is_success() {
                std::process::exit(1);
            }
        }
        Command::Batch {
            input_dir,
            output_dir,
            report,
            tuning,
        } => {
            let cfg = load_config(cli.config.as_deref(), &tuning)?;
            init_thread_pool(&cfg.processing);
            let pipeline = Pipeline::new(cfg.target, cfg.quality_setting());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result =
                batch::process_batch(&pipeline, &input_dir, &output_dir, cfg.enhancement, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let result = result?;

            output::print_batch_summary(&result.summary);
            if let Some(report_path) = report {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&report_path, json)?;
                println!("Report: {}", report_path.display());
            }
        }
        Command::Stats { file } => {
            let stats = image_stats(&RustBackend::new(), &file)?;
            output::print_image_stats(&file, &stats);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the config file, then apply command-line overrides.
fn load_config(
    explicit: Option<&std::path::Path>,
    tuning: &TuningArgs,
) -> Result<config::PipelineConfig, config::ConfigError> {
    let cwd = std::env::current_dir()?;
    config::resolve_config(explicit, &cwd)?.with_overrides(&tuning.overrides())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
