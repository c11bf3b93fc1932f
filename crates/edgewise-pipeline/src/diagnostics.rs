//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! threshold tuning and parameter experimentation.
//! [`process_staged_with_diagnostics`] runs the full pipeline and
//! collects them alongside the staged results.
//!
//! Duration measurements use [`std::time::Duration`]. Timestamps come
//! from a caller-supplied [`Clock`], so the pipeline crate never reads
//! the system time itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::field::ScalarField;
use crate::gradient::GradientField;
use crate::pipeline::Pipeline;
use crate::types::{Dimensions, EdgeConfig, PipelineError, RgbaImage, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source used to measure stage durations.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: image decoding.
    pub decode: StageDiagnostics,
    /// Stage 2: Gaussian smoothing.
    pub smooth: StageDiagnostics,
    /// Stage 3: Sobel gradients.
    pub gradient: StageDiagnostics,
    /// Stage 4: non-maximum suppression.
    pub suppression: StageDiagnostics,
    /// Stage 5: thresholding.
    pub threshold: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: usize,
    },
    /// Gaussian smoothing metrics.
    Smooth {
        /// Requested pass count (0 means one identity pass).
        passes: u32,
    },
    /// Gradient computation metrics.
    Gradient {
        /// Largest rounded magnitude in the field.
        max_magnitude: i32,
        /// Pixels whose angle was exactly 0 and fell into no bin.
        unbinned_count: usize,
    },
    /// Non-maximum suppression metrics.
    Suppression {
        /// Pixels with a non-zero magnitude after suppression.
        surviving_count: usize,
        /// Total pixel count.
        total_pixel_count: usize,
    },
    /// Threshold metrics.
    Threshold {
        /// Threshold applied (strictly greater is an edge).
        threshold: i32,
        /// Number of white pixels in the output.
        edge_pixel_count: usize,
        /// Total pixel count for computing edge density.
        total_pixel_count: usize,
    },
}

impl StageMetrics {
    /// Metrics for a decoded image of `dimensions` read from `input_bytes` bytes.
    #[must_use]
    pub const fn decode(input_bytes: usize, dimensions: Dimensions) -> Self {
        Self::Decode {
            input_bytes,
            width: dimensions.width,
            height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
        }
    }

    /// Metrics for a smoothing run of `passes`.
    #[must_use]
    pub const fn smooth(passes: u32) -> Self {
        Self::Smooth { passes }
    }

    /// Metrics for a computed gradient field.
    #[must_use]
    pub fn gradient(gradients: &GradientField) -> Self {
        Self::Gradient {
            max_magnitude: gradients.max_magnitude(),
            unbinned_count: gradients.unbinned_count(),
        }
    }

    /// Metrics for a suppressed magnitude field.
    #[must_use]
    pub fn suppression(suppressed: &ScalarField<i32>) -> Self {
        Self::Suppression {
            surviving_count: suppressed.as_slice().iter().filter(|&&m| m != 0).count(),
            total_pixel_count: suppressed.len(),
        }
    }

    /// Metrics for a binary edge image thresholded at `threshold`.
    #[must_use]
    pub fn threshold(threshold: i32, edges: &RgbaImage) -> Self {
        Self::Threshold {
            threshold,
            edge_pixel_count: crate::edge::count_edge_pixels(edges),
            total_pixel_count: Dimensions::of(edges).pixel_count(),
        }
    }
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: usize,
    /// Number of white pixels in the edge image.
    pub edge_pixel_count: usize,
}

impl PipelineDiagnostics {
    /// Per-stage diagnostics in pipeline order, with display names.
    #[must_use]
    pub fn stages(&self) -> [(&'static str, &StageDiagnostics); 5] {
        [
            ("Decode", &self.decode),
            ("Smooth", &self.smooth),
            ("Gradient", &self.gradient),
            ("Suppression", &self.suppression),
            ("Threshold", &self.threshold),
        ]
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        for (name, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Edge pixels: {} of {}",
            self.summary.edge_pixel_count, self.summary.pixel_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Percentage of `count` in `total`, 0 for an empty image.
#[allow(clippy::cast_precision_loss)]
fn percent(count: usize, total: usize) -> f64 {
    if total > 0 {
        count as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => {
            format!("{input_bytes} bytes -> {width}x{height}")
        }
        StageMetrics::Smooth { passes } => format!("passes={passes}"),
        StageMetrics::Gradient {
            max_magnitude,
            unbinned_count,
        } => {
            format!("max={max_magnitude} unbinned={unbinned_count}")
        }
        StageMetrics::Suppression {
            surviving_count,
            total_pixel_count,
        } => {
            let density = percent(*surviving_count, *total_pixel_count);
            format!("surviving={surviving_count} ({density:.1}%)")
        }
        StageMetrics::Threshold {
            threshold,
            edge_pixel_count,
            total_pixel_count,
        } => {
            let density = percent(*edge_pixel_count, *total_pixel_count);
            format!("t={threshold} edges={edge_pixel_count} ({density:.1}%)")
        }
    }
}

/// Run the full edge pipeline, timing each stage with `clock`.
///
/// Produces the same [`StagedResult`] as [`crate::process_staged`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &EdgeConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let total_start = clock.now();

    let start = clock.now();
    let decoded = Pipeline::new(image_bytes.to_vec(), *config).decode()?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::decode(image_bytes.len(), decoded.dimensions()),
    };

    let start = clock.now();
    let smoothed = decoded.smooth();
    let smooth = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::smooth(config.blur_passes),
    };

    let start = clock.now();
    let gradients = smoothed.compute_gradients();
    let gradient = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::gradient(gradients.gradients()),
    };

    let start = clock.now();
    let suppressed = gradients.suppress();
    let suppression = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::suppression(suppressed.suppressed()),
    };

    let start = clock.now();
    let thresholded = suppressed.threshold();
    let edge_pixel_count = crate::edge::count_edge_pixels(thresholded.edges());
    let threshold = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::threshold(config.threshold, thresholded.edges()),
    };

    let dimensions = thresholded.dimensions();
    let staged = thresholded.into_result();
    let total_duration = clock.elapsed(&total_start);

    info!(
        width = dimensions.width,
        height = dimensions.height,
        edge_pixels = edge_pixel_count,
        total_ms = duration_ms(total_duration),
        "edge pipeline finished"
    );

    let diagnostics = PipelineDiagnostics {
        decode,
        smooth,
        gradient,
        suppression,
        threshold,
        total_duration,
        summary: PipelineSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
            edge_pixel_count,
        },
    };
    Ok((staged, diagnostics))
}
