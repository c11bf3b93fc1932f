//! Fixed 3x3 integer kernels and their application over a clamped window.
//!
//! Weights are consumed in order, one per *visited* sample. When the
//! window is truncated at the top or left border, the kernel is not
//! re-centered: the first visited sample always takes `kernel[0]`, the
//! second `kernel[1]`, and so on.

use image::{GenericImageView, Rgba};

use crate::bounds::clamp_window;
use crate::luminance::luminance;
use crate::types::Dimensions;

/// A row-major 3x3 kernel.
pub type Kernel3 = [i32; 9];

/// Horizontal Sobel kernel (Gx).
pub const SOBEL_HORIZONTAL: Kernel3 = [-1, 0, 1, -2, 0, 2, -1, 0, 1];

/// Vertical Sobel kernel (Gy).
pub const SOBEL_VERTICAL: Kernel3 = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

/// Binomial approximation of a Gaussian, normalized by [`GAUSSIAN_DIVISOR`].
pub const GAUSSIAN_3X3: Kernel3 = [1, 2, 1, 2, 4, 2, 1, 2, 1];

/// Sum of the [`GAUSSIAN_3X3`] weights.
pub const GAUSSIAN_DIVISOR: i32 = 16;

/// Weighted luminance sum of the radius-1 window around `(x, y)`.
#[must_use]
pub fn apply_kernel<I>(kernel: &Kernel3, image: &I, dimensions: Dimensions, x: u32, y: u32) -> i32
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    clamp_window(dimensions, x, y, 1)
        .samples()
        .zip(kernel)
        .map(|((sx, sy), weight)| weight * luminance(image, dimensions, sx, sy))
        .sum()
}
