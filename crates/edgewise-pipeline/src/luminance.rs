//! Perceptual luminance of RGB pixels.
//!
//! Uses the Rec. 709 weights `0.2126*R + 0.7152*G + 0.0722*B`, evaluated
//! in `f32` and truncated toward zero. The gradient kernels convolve this
//! value, so the exact float type and the truncation are part of the
//! observable edge output.

use image::{GenericImageView, Rgba};

use crate::bounds::sample;
use crate::types::Dimensions;

/// Red, green and blue luminance weights.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Luminance of a single pixel, in `0..=255`. Alpha is ignored.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    // `mul_add` rounds differently from the separate multiply and add.
    clippy::suboptimal_flops
)]
pub fn pixel_luminance(pixel: Rgba<u8>) -> i32 {
    let Rgba([r, g, b, _]) = pixel;
    let [wr, wg, wb] = LUMA_WEIGHTS;
    let value = wr * f32::from(r) + wg * f32::from(g) + wb * f32::from(b);
    value as i32
}

/// Luminance of the pixel at `(x, y)`; coordinates outside the image read as 0.
#[must_use]
pub fn luminance<I>(image: &I, dimensions: Dimensions, x: u32, y: u32) -> i32
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    pixel_luminance(sample(image, dimensions, x, y))
}
