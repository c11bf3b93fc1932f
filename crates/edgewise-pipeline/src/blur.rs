//! Gaussian smoothing for noise reduction before edge detection.
//!
//! Each pass replaces every pixel's RGB with the [`GAUSSIAN_3X3`]-weighted
//! sum of its clamped window divided by 16 (integer, truncating). Alpha is
//! always written as 255. Passes are chained: the output of one pass is
//! the input of the next, and every pass allocates a fresh image.
//!
//! Border pixels see fewer than nine samples (top/left) or samples
//! beyond the image that read as black (bottom/right), so repeated
//! passes darken the image from its edges inward.

use image::{GenericImageView, Rgba, RgbaImage};
use tracing::debug;

use crate::bounds::{clamp_window, sample};
use crate::kernel::{GAUSSIAN_3X3, GAUSSIAN_DIVISOR};
use crate::types::Dimensions;

/// Smooth `image` with `passes` Gaussian passes.
///
/// `passes == 0` is not a no-op: it runs exactly one identity pass that
/// copies RGB and forces alpha to 255.
#[must_use = "returns the smoothed image"]
pub fn gaussian<I>(image: &I, passes: u32) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let dimensions = Dimensions::of(image);
    debug!(
        width = dimensions.width,
        height = dimensions.height,
        passes,
        "gaussian smoothing"
    );

    if passes == 0 {
        return opaque_copy(image, dimensions);
    }

    let mut smoothed = smooth_pass(image, dimensions);
    for _ in 1..passes {
        smoothed = smooth_pass(&smoothed, dimensions);
    }
    smoothed
}

/// Identity pass: RGB unchanged, alpha forced to 255.
fn opaque_copy<I>(image: &I, dimensions: Dimensions) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    RgbaImage::from_fn(dimensions.width, dimensions.height, |x, y| {
        let Rgba([r, g, b, _]) = image.get_pixel(x, y);
        Rgba([r, g, b, u8::MAX])
    })
}

fn smooth_pass<I>(image: &I, dimensions: Dimensions) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    RgbaImage::from_fn(dimensions.width, dimensions.height, |x, y| {
        let [r, g, b] = weighted_average(image, dimensions, x, y);
        Rgba([r, g, b, u8::MAX])
    })
}

fn weighted_average<I>(image: &I, dimensions: Dimensions, x: u32, y: u32) -> [u8; 3]
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let mut sums = [0_i32; 3];
    for ((sx, sy), weight) in clamp_window(dimensions, x, y, 1)
        .samples()
        .zip(&GAUSSIAN_3X3)
    {
        let Rgba(channels) = sample(image, dimensions, sx, sy);
        for (sum, &channel) in sums.iter_mut().zip(&channels[..3]) {
            *sum += weight * i32::from(channel);
        }
    }
    // At most 16 * 255 before the division, so every average fits a u8.
    sums.map(|sum| u8::try_from(sum / GAUSSIAN_DIVISOR).unwrap_or(u8::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image with a sharp black-to-white boundary at x=5.
    fn sharp_edge_image() -> RgbaImage {
        RgbaImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn zero_passes_is_identity_with_opaque_alpha() {
        let img = RgbaImage::from_fn(4, 3, |x, y| {
            let v = u8::try_from(x * 40 + y * 7).unwrap_or(u8::MAX);
            Rgba([v, v / 2, 255 - v, v / 3])
        });
        let copied = gaussian(&img, 0);
        for (x, y, pixel) in img.enumerate_pixels() {
            let Rgba([r, g, b, _]) = *pixel;
            assert_eq!(*copied.get_pixel(x, y), Rgba([r, g, b, 255]));
        }
    }

    #[test]
    fn output_dimensions_preserved() {
        let img = RgbaImage::new(17, 31);
        for passes in [0, 1, 3] {
            let smoothed = gaussian(&img, passes);
            assert_eq!(smoothed.dimensions(), (17, 31));
        }
    }

    #[test]
    fn single_pixel_keeps_only_its_own_weight() {
        // Window is (0,0)..=(1,1); the pixel takes weight 1, the three
        // samples beyond the image are black.
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
        let smoothed = gaussian(&img, 1);
        assert_eq!(*smoothed.get_pixel(0, 0), Rgba([12, 6, 3, 255]));
    }

    #[test]
    fn repeated_passes_feed_forward() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
        let twice = gaussian(&img, 2);
        let once_more = gaussian(&gaussian(&img, 1), 1);
        assert_eq!(twice, once_more);
        assert_eq!(*twice.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn uniform_interior_is_unchanged() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([100, 150, 200, 255]));
        let smoothed = gaussian(&img, 1);
        assert_eq!(*smoothed.get_pixel(1, 1), Rgba([100, 150, 200, 255]));
        assert_eq!(*smoothed.get_pixel(2, 2), Rgba([100, 150, 200, 255]));
    }

    #[test]
    fn borders_average_fewer_samples() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([100, 150, 200, 255]));
        let smoothed = gaussian(&img, 1);
        // Top-left: four samples take kernel[0..4] = 1, 2, 1, 2.
        assert_eq!(*smoothed.get_pixel(0, 0), Rgba([37, 56, 75, 255]));
        // Top edge: six samples take 1, 2, 1, 2, 4, 2.
        assert_eq!(*smoothed.get_pixel(1, 0), Rgba([75, 112, 150, 255]));
        // Bottom-right: full window, but the last column and row are black.
        assert_eq!(*smoothed.get_pixel(3, 3), Rgba([56, 84, 112, 255]));
    }

    #[test]
    fn blur_smooths_sharp_edge() {
        let smoothed = gaussian(&sharp_edge_image(), 1);
        let left_of_edge = smoothed.get_pixel(4, 5).0[0];
        let right_of_edge = smoothed.get_pixel(5, 5).0[0];
        assert!(left_of_edge > 0, "expected left of edge above 0, got {left_of_edge}");
        assert!(
            right_of_edge < 255,
            "expected right of edge below 255, got {right_of_edge}",
        );
    }

    #[test]
    fn alpha_is_forced_opaque() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 0]));
        assert!(gaussian(&img, 2).pixels().all(|p| p.0[3] == 255));
    }
}
