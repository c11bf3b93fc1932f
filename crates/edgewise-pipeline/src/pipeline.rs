//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use edgewise_pipeline::{EdgeConfig, Pipeline, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let pipeline = Pipeline::new(png, EdgeConfig::default())
//!     .decode()?
//!     .smooth()
//!     .compute_gradients()
//!     .suppress()
//!     .threshold();
//!
//! let staged = pipeline.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for the fallible decode), carrying all previously computed
//! intermediates. The caller can inspect the current stage's output via
//! accessor methods at any point.
//!
//! # Memory
//!
//! Every stage retains everything computed before it. For a 1000×1000
//! source this is two RGBA rasters (8 MB) plus three `i32`-sized fields
//! (about 12 MB) pinned until [`Thresholded::into_result`] consumes the
//! final stage. [`StagedResult`] needs every intermediate for inspection.
//!
//! Callers that only need the edge image should prefer [`crate::process`]
//! or [`crate::edge::edge`], which drop each intermediate as soon as the
//! next stage has consumed it.

use crate::diagnostics::StageMetrics;
use crate::field::ScalarField;
use crate::gradient::GradientField;
use crate::types::{Dimensions, EdgeConfig, PipelineError, RgbaImage, StagedResult};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source image bytes and config are stored but not yet touched.
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing: call .decode() to continue"]
pub struct Pending {
    config: EdgeConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image and advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if the source bytes are
    /// empty. Returns [`PipelineError::ImageDecode`] if the image
    /// format is unrecognized or the data is corrupt.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        let source_len = self.source.len();
        let original = crate::codec::decode_rgba(&self.source)?;
        Ok(Decoded {
            config: self.config,
            dimensions: Dimensions::of(&original),
            original,
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image to RGBA.
///
/// Call [`smooth`](Self::smooth) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing: call .smooth() to continue"]
pub struct Decoded {
    config: EdgeConfig,
    original: RgbaImage,
    dimensions: Dimensions,
    source_len: usize,
}

impl Decoded {
    /// The original decoded RGBA image.
    #[must_use]
    pub const fn original(&self) -> &RgbaImage {
        &self.original
    }

    /// Image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Run `config.blur_passes` Gaussian passes and advance.
    pub fn smooth(self) -> Smoothed {
        let smoothed = crate::blur::gaussian(&self.original, self.config.blur_passes);
        Smoothed {
            config: self.config,
            original: self.original,
            smoothed,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 2: Smoothed ─────────────────────────

/// Pipeline state after Gaussian smoothing.
///
/// Call [`compute_gradients`](Self::compute_gradients) to advance.
#[must_use = "pipeline stages are consumed by advancing: call .compute_gradients() to continue"]
pub struct Smoothed {
    config: EdgeConfig,
    original: RgbaImage,
    smoothed: RgbaImage,
    dimensions: Dimensions,
}

impl Smoothed {
    /// The smoothed RGBA image.
    #[must_use]
    pub const fn smoothed(&self) -> &RgbaImage {
        &self.smoothed
    }

    /// Compute Sobel gradients of the smoothed image and advance.
    pub fn compute_gradients(self) -> GradientsComputed {
        let gradients = crate::gradient::compute_gradients(&self.smoothed);
        GradientsComputed {
            config: self.config,
            original: self.original,
            smoothed: self.smoothed,
            gradients,
            dimensions: self.dimensions,
        }
    }
}

// ──────────────────── Stage 3: GradientsComputed ─────────────────────

/// Pipeline state after gradient computation.
///
/// Call [`suppress`](Self::suppress) to advance.
#[must_use = "pipeline stages are consumed by advancing: call .suppress() to continue"]
pub struct GradientsComputed {
    config: EdgeConfig,
    original: RgbaImage,
    smoothed: RgbaImage,
    gradients: GradientField,
    dimensions: Dimensions,
}

impl GradientsComputed {
    /// Per-pixel gradient magnitude and quantized direction.
    #[must_use]
    pub const fn gradients(&self) -> &GradientField {
        &self.gradients
    }

    /// Apply non-maximum suppression and advance.
    pub fn suppress(self) -> Suppressed {
        let suppressed = crate::nms::suppress(&self.gradients);
        Suppressed {
            config: self.config,
            original: self.original,
            smoothed: self.smoothed,
            gradients: self.gradients,
            suppressed,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 4: Suppressed ───────────────────────

/// Pipeline state after non-maximum suppression.
///
/// Call [`threshold`](Self::threshold) to advance.
#[must_use = "pipeline stages are consumed by advancing: call .threshold() to continue"]
pub struct Suppressed {
    config: EdgeConfig,
    original: RgbaImage,
    smoothed: RgbaImage,
    gradients: GradientField,
    suppressed: ScalarField<i32>,
    dimensions: Dimensions,
}

impl Suppressed {
    /// Magnitudes surviving suppression (0 elsewhere).
    #[must_use]
    pub const fn suppressed(&self) -> &ScalarField<i32> {
        &self.suppressed
    }

    /// Threshold the suppressed magnitudes at `config.threshold` and advance.
    pub fn threshold(self) -> Thresholded {
        let edges = crate::edge::threshold_edges(&self.suppressed, self.config.threshold);
        Thresholded {
            config: self.config,
            original: self.original,
            smoothed: self.smoothed,
            gradients: self.gradients,
            suppressed: self.suppressed,
            edges,
            dimensions: self.dimensions,
        }
    }
}

// ──────────────────────── Stage 5: Thresholded ───────────────────────

/// Pipeline state after thresholding, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedResult`] containing all intermediates.
///
/// See the [module-level memory notes](self#memory) for the cost of
/// retaining all prior intermediates.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Thresholded {
    config: EdgeConfig,
    original: RgbaImage,
    smoothed: RgbaImage,
    gradients: GradientField,
    suppressed: ScalarField<i32>,
    edges: RgbaImage,
    dimensions: Dimensions,
}

impl Thresholded {
    /// The binary edge image.
    #[must_use]
    pub const fn edges(&self) -> &RgbaImage {
        &self.edges
    }

    /// Image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            original: self.original,
            smoothed: self.smoothed,
            gradients: self.gradients,
            suppressed: self.suppressed,
            edges: self.edges,
            dimensions: self.dimensions,
        }
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 6;

/// The output produced by a single pipeline stage.
///
/// Each variant borrows the data that the corresponding stage computed.
#[must_use]
pub enum StageOutput<'a> {
    /// Source image bytes (not yet decoded).
    Source {
        /// The raw image bytes.
        bytes: &'a [u8],
    },
    /// Decoded RGBA image.
    Decoded {
        /// The original image.
        original: &'a RgbaImage,
    },
    /// Gaussian smoothing result.
    Smoothed {
        /// The smoothed RGBA image.
        smoothed: &'a RgbaImage,
    },
    /// Gradient computation result.
    GradientsComputed {
        /// Magnitude and direction fields.
        gradients: &'a GradientField,
    },
    /// Non-maximum suppression result.
    Suppressed {
        /// Surviving magnitudes.
        suppressed: &'a ScalarField<i32>,
    },
    /// Thresholding result.
    Thresholded {
        /// The binary edge image.
        edges: &'a RgbaImage,
        /// Image dimensions.
        dimensions: Dimensions,
    },
}

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// Each stage struct implements it, and [`Stage`] delegates to whichever
/// variant it holds.
///
/// # Loop pattern
///
/// ```rust
/// # use edgewise_pipeline::{EdgeConfig, Pipeline, PipelineError};
/// # use edgewise_pipeline::pipeline::{Advance, Stage};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage: Stage = Pipeline::new(png, EdgeConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage: Sized {
    /// Human-readable name of this stage (e.g. `"source"`, `"smooth"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `5` for
    /// Thresholded).
    const INDEX: usize;

    /// The output this stage produced.
    fn output(&self) -> StageOutput<'_>;

    /// Stage-specific metrics for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage which has not
    /// yet performed any processing.
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] or
    /// [`PipelineError::ImageDecode`] when decoding fails.
    fn next(self) -> Result<Option<Stage>, PipelineError>;

    /// Run all remaining stages to completion and return the final
    /// [`StagedResult`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding has not happened yet and fails.
    fn complete(self) -> Result<StagedResult, PipelineError>;
}

impl PipelineStage for Pending {
    const NAME: &str = "source";
    const INDEX: usize = 0;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Source {
            bytes: &self.source,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Decoded(self.decode()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.decode()?.complete()
    }
}

impl PipelineStage for Decoded {
    const NAME: &str = "decode";
    const INDEX: usize = 1;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Decoded {
            original: &self.original,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::decode(self.source_len, self.dimensions))
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Smoothed(self.smooth())))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.smooth().complete()
    }
}

impl PipelineStage for Smoothed {
    const NAME: &str = "smooth";
    const INDEX: usize = 2;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Smoothed {
            smoothed: &self.smoothed,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::smooth(self.config.blur_passes))
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::GradientsComputed(self.compute_gradients())))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.compute_gradients().complete()
    }
}

impl PipelineStage for GradientsComputed {
    const NAME: &str = "gradient";
    const INDEX: usize = 3;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::GradientsComputed {
            gradients: &self.gradients,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::gradient(&self.gradients))
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Suppressed(self.suppress())))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.suppress().complete()
    }
}

impl PipelineStage for Suppressed {
    const NAME: &str = "suppress";
    const INDEX: usize = 4;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Suppressed {
            suppressed: &self.suppressed,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::suppression(&self.suppressed))
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Thresholded(self.threshold())))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.threshold().complete()
    }
}

impl PipelineStage for Thresholded {
    const NAME: &str = "threshold";
    const INDEX: usize = 5;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Thresholded {
            edges: &self.edges,
            dimensions: self.dimensions,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::threshold(self.config.threshold, &self.edges))
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(None)
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        Ok(self.into_result())
    }
}

/// Type-erased pipeline stage.
///
/// Wraps any of the concrete stage structs so callers can drive the
/// pipeline in a loop without naming each type.
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`Smoothed`].
    Smoothed(Smoothed),
    /// See [`GradientsComputed`].
    GradientsComputed(GradientsComputed),
    /// See [`Suppressed`].
    Suppressed(Suppressed),
    /// See [`Thresholded`].
    Thresholded(Thresholded),
}

/// Compile-time guard: if a [`Stage`] variant is added, this match becomes
/// non-exhaustive and the build fails until [`STAGE_COUNT`] is revisited.
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage) {
    match s {
        Stage::Pending(_)
        | Stage::Decoded(_)
        | Stage::Smoothed(_)
        | Stage::GradientsComputed(_)
        | Stage::Suppressed(_)
        | Stage::Thresholded(_) => {}
    }
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance {
    /// The pipeline advanced to this next stage.
    Next(Stage),
    /// The pipeline was already at the final stage.
    Complete(Stage),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::Decoded(s) => s.$method($($arg),*),
            Self::Smoothed(s) => s.$method($($arg),*),
            Self::GradientsComputed(s) => s.$method($($arg),*),
            Self::Suppressed(s) => s.$method($($arg),*),
            Self::Thresholded(s) => s.$method($($arg),*),
        }
    };
}

impl Stage {
    /// Human-readable name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// The output this stage produced.
    pub fn output(&self) -> StageOutput<'_> {
        delegate!(self, output)
    }

    /// Stage-specific metrics for diagnostics. `None` for `Pending`.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Thresholded(_))
    }

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(next_stage))` on success, `Ok(None)` if
    /// already complete (the final value is consumed).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding fails.
    pub fn next(self) -> Result<Option<Self>, PipelineError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding fails.
    pub fn advance(self) -> Result<Advance, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Non-complete stages always return Ok(Some(_)) from next().
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-complete stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding fails.
    pub fn complete(self) -> Result<StagedResult, PipelineError> {
        delegate!(self, complete)
    }
}

// Associated constants are not reachable as `self.NAME`, so the
// delegate macro calls these instead.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<T: PipelineStage> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

impl From<Pending> for Stage {
    fn from(s: Pending) -> Self {
        Self::Pending(s)
    }
}

impl From<Decoded> for Stage {
    fn from(s: Decoded) -> Self {
        Self::Decoded(s)
    }
}

impl From<Smoothed> for Stage {
    fn from(s: Smoothed) -> Self {
        Self::Smoothed(s)
    }
}

impl From<GradientsComputed> for Stage {
    fn from(s: GradientsComputed) -> Self {
        Self::GradientsComputed(s)
    }
}

impl From<Suppressed> for Stage {
    fn from(s: Suppressed) -> Self {
        Self::Suppressed(s)
    }
}

impl From<Thresholded> for Stage {
    fn from(s: Thresholded) -> Self {
        Self::Thresholded(s)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental edge detection pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing. Each stage method consumes the
/// current state and returns the next, making it a compile-time error to
/// skip stages or call them out of order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// No processing is performed. Call [`.decode()`](Pending::decode)
    /// (or convert to a [`Stage`] and loop) to begin processing.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: EdgeConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Encode a 6x4 black/white vertical step as PNG.
    fn step_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(6, 4, |x, _y| {
            if x < 3 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        crate::codec::encode_png(&img).unwrap()
    }

    fn unblurred() -> EdgeConfig {
        EdgeConfig {
            threshold: 100,
            blur_passes: 0,
        }
    }

    // ─────────── Typed API tests ─────────────────────────────────

    #[test]
    fn pending_exposes_source_bytes() {
        let png = step_png();
        let expected_len = png.len();
        let pending = Pipeline::new(png, unblurred());
        assert_eq!(pending.source().len(), expected_len);
    }

    #[test]
    fn decode_empty_input_returns_error() {
        let result = Pipeline::new(vec![], EdgeConfig::default()).decode();
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn decode_corrupt_input_returns_error() {
        let result = Pipeline::new(vec![0xFF, 0x00], EdgeConfig::default()).decode();
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn decoded_exposes_original() {
        let decoded = Pipeline::new(step_png(), unblurred()).decode().unwrap();
        assert_eq!(decoded.original().dimensions(), (6, 4));
        assert_eq!(decoded.dimensions(), Dimensions::new(6, 4));
    }

    #[test]
    fn smoothed_with_zero_passes_matches_opaque_original() {
        let smoothed = Pipeline::new(step_png(), unblurred())
            .decode()
            .unwrap()
            .smooth();
        assert_eq!(*smoothed.smoothed().get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*smoothed.smoothed().get_pixel(5, 3), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn gradients_exposes_field() {
        let gradients = Pipeline::new(step_png(), unblurred())
            .decode()
            .unwrap()
            .smooth()
            .compute_gradients();
        assert_eq!(gradients.gradients().dimensions(), Dimensions::new(6, 4));
        assert_eq!(gradients.gradients().max_magnitude(), 1082);
    }

    #[test]
    fn suppressed_exposes_field() {
        let suppressed = Pipeline::new(step_png(), unblurred())
            .decode()
            .unwrap()
            .smooth()
            .compute_gradients()
            .suppress();
        assert_eq!(suppressed.suppressed().get(5, 1), Some(1020));
        assert_eq!(suppressed.suppressed().get(2, 1), Some(0));
    }

    #[test]
    fn typed_chain_matches_edge() {
        let png = step_png();
        let original = crate::codec::decode_rgba(&png).unwrap();
        let staged = Pipeline::new(png, unblurred())
            .decode()
            .unwrap()
            .smooth()
            .compute_gradients()
            .suppress()
            .threshold()
            .into_result();
        assert_eq!(staged.edges, crate::edge::edge(&original, 100, 0));
        assert_eq!(staged.original, original);
        assert_eq!(staged.dimensions, Dimensions::new(6, 4));
    }

    // ─────────── Dynamic API tests ───────────────────────────────

    #[test]
    fn stage_loop_visits_every_stage_in_order() {
        let mut stage: Stage = Pipeline::new(step_png(), unblurred()).into();
        let mut names = vec![stage.name()];
        loop {
            assert_eq!(stage.index(), names.len() - 1);
            match stage.advance().unwrap() {
                Advance::Next(next) => {
                    stage = next;
                    names.push(stage.name());
                }
                Advance::Complete(done) => {
                    stage = done;
                    break;
                }
            }
        }
        assert_eq!(
            names,
            vec!["source", "decode", "smooth", "gradient", "suppress", "threshold"]
        );
        assert_eq!(names.len(), STAGE_COUNT);
        assert!(stage.is_complete());
        assert_eq!(stage.complete().unwrap().dimensions, Dimensions::new(6, 4));
    }

    #[test]
    fn final_stage_next_is_none() {
        let done: Stage = Pipeline::new(step_png(), unblurred())
            .decode()
            .unwrap()
            .smooth()
            .compute_gradients()
            .suppress()
            .threshold()
            .into();
        assert!(done.next().unwrap().is_none());
    }

    #[test]
    fn pending_has_no_metrics() {
        let stage: Stage = Pipeline::new(step_png(), unblurred()).into();
        assert!(stage.metrics().is_none());
        assert!(matches!(stage.output(), StageOutput::Source { .. }));
    }

    #[test]
    fn stage_metrics_report_counts() {
        let thresholded = Pipeline::new(step_png(), unblurred())
            .decode()
            .unwrap()
            .smooth()
            .compute_gradients()
            .suppress()
            .threshold();
        // Rows 0 and 3 keep three pixels each, rows 1 and 2 keep one.
        assert!(matches!(
            thresholded.metrics(),
            Some(StageMetrics::Threshold {
                threshold: 100,
                edge_pixel_count: 8,
                total_pixel_count: 24,
            })
        ));
    }

    #[test]
    fn complete_from_pending_matches_typed_chain() {
        let png = step_png();
        let typed = Pipeline::new(png.clone(), unblurred())
            .decode()
            .unwrap()
            .smooth()
            .compute_gradients()
            .suppress()
            .threshold()
            .into_result();
        let dynamic = Stage::from(Pipeline::new(png, unblurred()))
            .complete()
            .unwrap();
        assert_eq!(typed.edges, dynamic.edges);
        assert_eq!(typed.suppressed, dynamic.suppressed);
    }

    #[test]
    fn complete_from_pending_propagates_decode_error() {
        let result = Stage::from(Pipeline::new(vec![], unblurred())).complete();
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }
}
