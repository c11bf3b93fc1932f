//! edgewise-pipeline: Pure pixel-level edge detection (sans-IO).
//!
//! Turns a raster image into a binary edge map through:
//! Gaussian smoothing -> Sobel gradients -> direction quantization ->
//! non-maximum suppression -> single hard threshold.
//!
//! The core stages ([`blur`], [`gradient`], [`nms`], [`edge`]) are
//! infallible, deterministic functions over immutable images. This crate
//! has **no I/O dependencies**: it operates on in-memory byte slices and
//! images. File access and argument parsing live in `edgewise-cli`.

pub mod blur;
pub mod bounds;
pub mod codec;
pub mod diagnostics;
pub mod edge;
pub mod field;
pub mod gradient;
pub mod kernel;
pub mod luminance;
pub mod nms;
pub mod pipeline;
pub mod types;

pub use field::{Offset, RowWrap, ScalarField};
pub use gradient::{Direction, GradientField};
pub use pipeline::Pipeline;
pub use types::{BlurConfig, Dimensions, EdgeConfig, PipelineError, RgbaImage, StagedResult};

/// Run edge detection on encoded image bytes.
///
/// # Pipeline steps
///
/// 1. Decode image to RGBA
/// 2. Gaussian smoothing (`config.blur_passes`)
/// 3. Sobel gradients and direction quantization
/// 4. Non-maximum suppression
/// 5. Threshold at `config.threshold`
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(image_bytes: &[u8], config: &EdgeConfig) -> Result<RgbaImage, PipelineError> {
    let image = codec::decode_rgba(image_bytes)?;
    Ok(edge::edge_with_config(&image, config))
}

/// Run Gaussian smoothing alone on encoded image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process_blur(image_bytes: &[u8], config: &BlurConfig) -> Result<RgbaImage, PipelineError> {
    let image = codec::decode_rgba(image_bytes)?;
    Ok(blur::gaussian(&image, config.passes))
}

/// Run edge detection, preserving every intermediate stage output.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process_staged(
    image_bytes: &[u8],
    config: &EdgeConfig,
) -> Result<StagedResult, PipelineError> {
    Ok(Pipeline::new(image_bytes.to_vec(), *config)
        .decode()?
        .smooth()
        .compute_gradients()
        .suppress()
        .threshold()
        .into_result())
}
