//! Edge detection: smoothing, Sobel gradients, non-maximum suppression and
//! a single strict threshold.
//!
//! Produces a binary RGBA image of the input's dimensions where white
//! pixels are edges and opaque black pixels are background. There is no
//! hysteresis: a pixel is white exactly when its suppressed magnitude is
//! strictly greater than the threshold.

use image::{GenericImageView, Rgba, RgbaImage};
use tracing::debug;

use crate::blur::gaussian;
use crate::field::ScalarField;
use crate::gradient::compute_gradients;
use crate::nms::suppress;
use crate::types::EdgeConfig;

/// Color of edge pixels.
pub const EDGE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Color of non-edge pixels.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Detect edges in `image`.
///
/// Runs [`gaussian`] with `blur_passes`, then [`compute_gradients`],
/// [`suppress`] and [`threshold_edges`]. Negative thresholds are allowed
/// and mark every surviving pixel (and every suppressed pixel, whose
/// magnitude is 0) as an edge.
#[must_use = "returns the binary edge image"]
pub fn edge<I>(image: &I, threshold: i32, blur_passes: u32) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let smoothed = gaussian(image, blur_passes);
    let gradients = compute_gradients(&smoothed);
    let suppressed = suppress(&gradients);
    threshold_edges(&suppressed, threshold)
}

/// [`edge`] with parameters taken from an [`EdgeConfig`].
#[must_use = "returns the binary edge image"]
pub fn edge_with_config<I>(image: &I, config: &EdgeConfig) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    edge(image, config.threshold, config.blur_passes)
}

/// Map suppressed magnitudes to [`EDGE`] where strictly above `threshold`
/// and [`BACKGROUND`] elsewhere.
#[must_use = "returns the binary edge image"]
pub fn threshold_edges(suppressed: &ScalarField<i32>, threshold: i32) -> RgbaImage {
    let dimensions = suppressed.dimensions();
    let values = suppressed.as_slice();
    let mut edges = RgbaImage::new(dimensions.width, dimensions.height);
    for (pixel, &magnitude) in edges.pixels_mut().zip(values) {
        *pixel = if magnitude > threshold { EDGE } else { BACKGROUND };
    }
    debug!(
        threshold,
        edge_pixels = count_edge_pixels(&edges),
        "thresholded edges"
    );
    edges
}

/// Number of [`EDGE`] pixels in a binary edge image.
#[must_use]
pub fn count_edge_pixels(edges: &RgbaImage) -> usize {
    edges.pixels().filter(|&&p| p == EDGE).count()
}
