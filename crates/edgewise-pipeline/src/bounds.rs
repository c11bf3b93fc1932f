//! Clamped sampling windows around a pixel.
//!
//! Every 3x3 operator (smoothing and both Sobel kernels) visits the window
//! returned by [`clamp_window`]. The lower edges clamp to 0, the upper
//! edges clamp to `width` / `height` rather than `width - 1` /
//! `height - 1`, and the window is walked inclusively. A window touching
//! the right or bottom border therefore visits one column or row beyond
//! the image, which [`sample`] reads as transparent black. Kernel output
//! at the borders depends on this, so it is part of the observable result.

use image::{GenericImageView, Rgba};

use crate::types::Dimensions;

/// Color read for any coordinate outside the image.
pub const OUTSIDE: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An inclusive rectangle of sample coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Leftmost sampled column.
    pub min_x: u32,
    /// Topmost sampled row.
    pub min_y: u32,
    /// Rightmost sampled column (inclusive, may equal the image width).
    pub max_x: u32,
    /// Bottom sampled row (inclusive, may equal the image height).
    pub max_y: u32,
}

impl Window {
    /// Sample coordinates in row-major order.
    pub fn samples(self) -> impl Iterator<Item = (u32, u32)> {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }

    /// Number of coordinates [`samples`](Self::samples) yields.
    #[must_use]
    pub const fn sample_count(self) -> usize {
        (self.max_x - self.min_x + 1) as usize * (self.max_y - self.min_y + 1) as usize
    }
}

/// Window of `radius` around `(x, y)`, clamped independently per edge.
#[must_use]
pub const fn clamp_window(dimensions: Dimensions, x: u32, y: u32, radius: u32) -> Window {
    let max_x = x.saturating_add(radius);
    let max_y = y.saturating_add(radius);
    Window {
        min_x: x.saturating_sub(radius),
        min_y: y.saturating_sub(radius),
        max_x: if max_x > dimensions.width {
            dimensions.width
        } else {
            max_x
        },
        max_y: if max_y > dimensions.height {
            dimensions.height
        } else {
            max_y
        },
    }
}

/// Pixel at `(x, y)`, or [`OUTSIDE`] when the coordinate is not in the image.
///
/// `dimensions` must be the dimensions of `image`.
pub fn sample<I>(image: &I, dimensions: Dimensions, x: u32, y: u32) -> Rgba<u8>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    if dimensions.contains(x, y) {
        image.get_pixel(x, y)
    } else {
        OUTSIDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    const DIMS: Dimensions = Dimensions::new(5, 4);

    #[test]
    fn interior_window_is_full() {
        let w = clamp_window(DIMS, 2, 2, 1);
        assert_eq!(
            w,
            Window {
                min_x: 1,
                min_y: 1,
                max_x: 3,
                max_y: 3
            }
        );
        assert_eq!(w.sample_count(), 9);
    }

    #[test]
    fn top_left_window_is_truncated() {
        let w = clamp_window(DIMS, 0, 0, 1);
        assert_eq!((w.min_x, w.min_y, w.max_x, w.max_y), (0, 0, 1, 1));
        assert_eq!(w.sample_count(), 4);
    }

    #[test]
    fn bottom_right_window_reaches_past_the_image() {
        let w = clamp_window(DIMS, 4, 3, 1);
        // Clamped to the width/height, not width-1/height-1.
        assert_eq!((w.min_x, w.min_y, w.max_x, w.max_y), (3, 2, 5, 4));
        assert_eq!(w.sample_count(), 9);
    }

    #[test]
    fn one_short_of_the_border_is_not_clamped() {
        let w = clamp_window(DIMS, 3, 2, 1);
        assert_eq!((w.max_x, w.max_y), (4, 3));
    }

    #[test]
    fn radius_zero_is_the_pixel_itself() {
        let w = clamp_window(DIMS, 2, 1, 0);
        assert_eq!(w.samples().collect::<Vec<_>>(), vec![(2, 1)]);
    }

    #[test]
    fn samples_are_row_major() {
        let w = clamp_window(DIMS, 0, 0, 1);
        assert_eq!(
            w.samples().collect::<Vec<_>>(),
            vec![(0, 0), (1, 0), (0, 1), (1, 1)]
        );
    }

    #[test]
    fn single_pixel_image_window() {
        let w = clamp_window(Dimensions::new(1, 1), 0, 0, 1);
        assert_eq!((w.min_x, w.min_y, w.max_x, w.max_y), (0, 0, 1, 1));
    }

    #[test]
    fn sample_outside_is_transparent_black() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 255]));
        let dims = Dimensions::of(&img);
        assert_eq!(sample(&img, dims, 1, 1), Rgba([9, 8, 7, 255]));
        assert_eq!(sample(&img, dims, 2, 1), OUTSIDE);
        assert_eq!(sample(&img, dims, 0, 2), OUTSIDE);
    }
}
