//! Shared types for the edgewise image processing pipeline.

use image::GenericImageView;
use serde::{Deserialize, Serialize};

use crate::field::ScalarField;
use crate::gradient::GradientField;

/// Re-export `RgbaImage` so downstream crates can reference raster
/// stage outputs without depending on `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
///
/// Captured once per stage and passed down explicitly, so no stage
/// re-derives the bounds of its input inside the per-pixel loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimension pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of any readable image.
    #[must_use]
    pub fn of<I: GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Total number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if `(x, y)` addresses a pixel inside the image.
    #[must_use]
    pub const fn contains(self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

/// Configuration for the edge detection pipeline.
///
/// Both parameters are plain values: every threshold and pass count is
/// valid input to the core, so there is no construction-time validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Suppressed gradient magnitudes strictly above this value become
    /// edge (white) pixels.
    pub threshold: i32,

    /// Number of Gaussian smoothing passes applied before gradient
    /// computation. Zero still performs a single identity pass.
    pub blur_passes: u32,
}

impl EdgeConfig {
    /// Default edge strength threshold.
    pub const DEFAULT_THRESHOLD: i32 = 100;

    /// Default number of smoothing passes before edge detection.
    pub const DEFAULT_BLUR_PASSES: u32 = 10;
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            blur_passes: Self::DEFAULT_BLUR_PASSES,
        }
    }
}

/// Configuration for a standalone smoothing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Number of Gaussian smoothing passes.
    pub passes: u32,
}

impl BlurConfig {
    /// Default number of smoothing passes.
    pub const DEFAULT_PASSES: u32 = EdgeConfig::DEFAULT_BLUR_PASSES;
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            passes: Self::DEFAULT_PASSES,
        }
    }
}

/// Result of running the edge pipeline with all intermediate stage
/// outputs preserved.
///
/// Uses custom `Serialize`/`Deserialize` implementations because
/// `RgbaImage` does not implement serde traits. Raster images are
/// serialized as `(width, height, raw_pixels)` tuples.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Stage 0: original decoded RGBA image.
    pub original: RgbaImage,
    /// Stage 1: Gaussian-smoothed image.
    pub smoothed: RgbaImage,
    /// Stage 2: per-pixel gradient magnitude and quantized direction.
    pub gradients: GradientField,
    /// Stage 3: magnitudes surviving non-maximum suppression.
    pub suppressed: ScalarField<i32>,
    /// Stage 4: binary edge image.
    pub edges: RgbaImage,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Serde-compatible proxy for `StagedResult`.
#[derive(Serialize, Deserialize)]
struct StagedResultProxy {
    original: (u32, u32, Vec<u8>),
    smoothed: (u32, u32, Vec<u8>),
    gradients: GradientField,
    suppressed: ScalarField<i32>,
    edges: (u32, u32, Vec<u8>),
    dimensions: Dimensions,
}

fn raster_parts(image: &RgbaImage) -> (u32, u32, Vec<u8>) {
    (image.width(), image.height(), image.as_raw().clone())
}

fn raster_from_parts<E: serde::de::Error>(
    (width, height, raw): (u32, u32, Vec<u8>),
    name: &str,
) -> Result<RgbaImage, E> {
    RgbaImage::from_raw(width, height, raw)
        .ok_or_else(|| E::custom(format!("invalid {name} image dimensions")))
}

impl Serialize for StagedResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = StagedResultProxy {
            original: raster_parts(&self.original),
            smoothed: raster_parts(&self.smoothed),
            gradients: self.gradients.clone(),
            suppressed: self.suppressed.clone(),
            edges: raster_parts(&self.edges),
            dimensions: self.dimensions,
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StagedResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = StagedResultProxy::deserialize(deserializer)?;
        Ok(Self {
            original: raster_from_parts(proxy.original, "original")?,
            smoothed: raster_from_parts(proxy.smoothed, "smoothed")?,
            gradients: proxy.gradients,
            suppressed: proxy.suppressed,
            edges: raster_from_parts(proxy.edges, "edges")?,
            dimensions: proxy.dimensions,
        })
    }
}

/// Errors raised around the pure core: decoding input and encoding output.
///
/// The smoothing and edge stages themselves cannot fail; every error here
/// aborts the pipeline before (decode) or after (encode) they run.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to encode the output image.
    #[error("failed to encode image: {0}")]
    ImageEncode(String),
}

/// Serde-compatible proxy for `PipelineError`.
///
/// `image::ImageError` does not implement serde, so the `ImageDecode`
/// variant stores its `Display` string and is rebuilt as a decoding
/// error with an unknown format hint.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    ImageEncode(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::ImageEncode(s) => PipelineErrorProxy::ImageEncode(s.clone()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::ImageDecode(image::ImageError::Decoding(
                    image::error::DecodingError::new(image::error::ImageFormatHint::Unknown, msg),
                ))
            }
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::ImageEncode(s) => Self::ImageEncode(s),
        })
    }
}
