//! edgewise: command-line front end for Gaussian smoothing and edge detection.
//!
//! Reads an image file, runs the pipeline, and writes the result as PNG.
//!
//! - `edge` runs smoothing, Sobel gradients, non-maximum suppression and a
//!   hard threshold, printing per-stage diagnostics.
//! - `blur` runs only the Gaussian smoothing passes.
//!
//! # Usage
//!
//! ```text
//! edgewise edge [OPTIONS] <INPUT>
//! edgewise blur [OPTIONS] <INPUT>
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use edgewise_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use edgewise_pipeline::{BlurConfig, EdgeConfig, RgbaImage};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Output path used when `-o` is not given.
const DEFAULT_OUTPUT: &str = "out.png";

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

/// Gaussian smoothing and Sobel edge detection for raster images.
#[derive(Parser)]
#[command(name = "edgewise", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect edges and write a binary white-on-black PNG.
    Edge(EdgeArgs),
    /// Smooth the image and write it as PNG.
    Blur(BlurArgs),
}

#[derive(Args)]
struct EdgeArgs {
    /// Path to the input image (PNG, JPEG, BMP, PNM).
    input: PathBuf,

    /// Path of the output PNG.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Suppressed gradient magnitudes strictly above this become edges.
    #[arg(short, long, default_value_t = EdgeConfig::DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    threshold: i32,

    /// Gaussian smoothing passes before edge detection.
    #[arg(short = 'b', long, default_value_t = EdgeConfig::DEFAULT_BLUR_PASSES)]
    blur_passes: u32,

    /// Full edge config as a JSON string.
    ///
    /// When provided, `--threshold` and `--blur-passes` are ignored.
    /// The JSON must be a valid `EdgeConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Number of runs for averaging stage timings.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BlurArgs {
    /// Path to the input image (PNG, JPEG, BMP, PNM).
    input: PathBuf,

    /// Path of the output PNG.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Number of Gaussian smoothing passes.
    #[arg(short = 'b', long, default_value_t = BlurConfig::DEFAULT_PASSES)]
    passes: u32,

    /// Full blur config as a JSON string. Overrides `--passes`.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build an [`EdgeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn edge_config(args: &EdgeArgs) -> Result<EdgeConfig, String> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(EdgeConfig {
        threshold: args.threshold,
        blur_passes: args.blur_passes,
    })
}

/// Build a [`BlurConfig`] from CLI arguments.
fn blur_config(args: &BlurArgs) -> Result<BlurConfig, String> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(BlurConfig {
        passes: args.passes,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Edge(ref args) => run_edge(args),
        Command::Blur(ref args) => run_blur(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run_edge(args: &EdgeArgs) -> Result<(), String> {
    let config = edge_config(args)?;
    let image_bytes = read_input(&args.input)?;
    info!(
        input = %args.input.display(),
        bytes = image_bytes.len(),
        threshold = config.threshold,
        blur_passes = config.blur_passes,
        runs = args.runs,
        "edge detection"
    );

    let mut all_diagnostics = Vec::with_capacity(args.runs);

    for run in 0..args.runs {
        if args.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, args.runs);
        }

        let (staged, diagnostics) = edgewise_pipeline::diagnostics::process_staged_with_diagnostics(
            &image_bytes,
            &config,
            &StdClock,
        )
        .map_err(|e| format!("Pipeline error: {e}"))?;

        if args.json {
            let json = serde_json::to_string_pretty(&diagnostics)
                .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
            println!("{json}");
        } else {
            println!("{}", diagnostics.report());
        }

        // Write the edge image on the first run only.
        if run == 0 {
            write_png(&args.output, &staged.edges)?;
        }

        all_diagnostics.push(diagnostics);
    }

    if args.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    Ok(())
}

fn run_blur(args: &BlurArgs) -> Result<(), String> {
    let config = blur_config(args)?;
    let image_bytes = read_input(&args.input)?;
    info!(
        input = %args.input.display(),
        bytes = image_bytes.len(),
        passes = config.passes,
        "gaussian smoothing"
    );

    let smoothed = edgewise_pipeline::process_blur(&image_bytes, &config)
        .map_err(|e| format!("Pipeline error: {e}"))?;
    write_png(&args.output, &smoothed)
}

fn read_input(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn write_png(path: &Path, image: &RgbaImage) -> Result<(), String> {
    let png = edgewise_pipeline::codec::encode_png(image).map_err(|e| e.to_string())?;
    std::fs::write(path, &png).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    info!(
        output = %path.display(),
        bytes = png.len(),
        width = image.width(),
        height = image.height(),
        "wrote PNG"
    );
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated timings across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    debug!(runs = all_diagnostics.len(), "summarizing runs");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let Some(first) = all_diagnostics.first() else {
        println!("Warning: no diagnostics to summarize");
        return;
    };

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    for (index, (name, _)) in first.stages().iter().enumerate() {
        let total: f64 = all_diagnostics
            .iter()
            .map(|d| d.stages()[index].1.duration.as_secs_f64() * 1000.0)
            .sum();
        let stage_mean = total / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
