//! Sobel gradient field: magnitude and quantized direction per pixel.
//!
//! For each pixel, `gx` and `gy` come from [`apply_kernel`] with the
//! horizontal and vertical Sobel kernels. The magnitude is the Euclidean
//! norm rounded to the nearest integer. The direction is
//! `|atan2(gy, gx)|` in degrees, folded to `[0, 180]`, and binned into one
//! of four compass axes:
//!
//! | angle (degrees)              | [`Direction`]                      |
//! |------------------------------|------------------------------------|
//! | (0, 22.5] or (157.5, 180]    | [`Direction::EastWest`]            |
//! | (22.5, 67.5]                 | [`Direction::NorthEastSouthWest`]  |
//! | (67.5, 112.5]                | [`Direction::NorthSouth`]          |
//! | (112.5, 157.5]               | [`Direction::NorthWestSouthEast`]  |
//! | exactly 0                    | [`Direction::Unbinned`]            |
//!
//! Every interval excludes its lower bound, so an angle of exactly zero
//! (including the zero gradient of a flat region) falls into no bin.

use image::{GenericImageView, Rgba};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::ScalarField;
use crate::kernel::{SOBEL_HORIZONTAL, SOBEL_VERTICAL, apply_kernel};
use crate::types::Dimensions;

/// Gradient direction quantized to a compass axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// 0°: compare with the west and east neighbors.
    EastWest,
    /// 45°: compare with the north-east and south-west neighbors.
    NorthEastSouthWest,
    /// 90°: compare with the north and south neighbors.
    NorthSouth,
    /// 135°: compare with the north-west and south-east neighbors.
    NorthWestSouthEast,
    /// An angle of exactly 0°, which no bin accepts. Never survives
    /// non-maximum suppression.
    #[default]
    Unbinned,
}

impl Direction {
    /// Bin a folded angle in degrees.
    #[must_use]
    pub fn from_degrees(angle: f64) -> Self {
        if (angle > 0.0 && angle <= 22.5) || (angle > 157.5 && angle <= 180.0) {
            Self::EastWest
        } else if angle > 22.5 && angle <= 67.5 {
            Self::NorthEastSouthWest
        } else if angle > 67.5 && angle <= 112.5 {
            Self::NorthSouth
        } else if angle > 112.5 && angle <= 157.5 {
            Self::NorthWestSouthEast
        } else {
            Self::Unbinned
        }
    }

    /// Direction of the gradient `(gx, gy)`.
    #[must_use]
    pub fn from_gradient(gx: i32, gy: i32) -> Self {
        let angle = f64::from(gy).atan2(f64::from(gx)).to_degrees().abs();
        Self::from_degrees(angle)
    }

    /// Integer degree code: 0, 45, 90 or 135. [`Direction::Unbinned`]
    /// reports 0, matching the angle it was binned from.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::EastWest | Self::Unbinned => 0,
            Self::NorthEastSouthWest => 45,
            Self::NorthSouth => 90,
            Self::NorthWestSouthEast => 135,
        }
    }
}

/// Euclidean gradient magnitude, rounded to the nearest integer.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn magnitude(gx: i32, gy: i32) -> i32 {
    f64::from(gx).hypot(f64::from(gy)).round() as i32
}

/// Parallel per-pixel magnitude and direction fields.
///
/// Both fields always share the same dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GradientFieldParts")]
pub struct GradientField {
    magnitudes: ScalarField<i32>,
    directions: ScalarField<Direction>,
}

#[derive(Deserialize)]
struct GradientFieldParts {
    magnitudes: ScalarField<i32>,
    directions: ScalarField<Direction>,
}

impl TryFrom<GradientFieldParts> for GradientField {
    type Error = String;

    fn try_from(parts: GradientFieldParts) -> Result<Self, Self::Error> {
        let (m, d) = (parts.magnitudes.dimensions(), parts.directions.dimensions());
        Self::new(parts.magnitudes, parts.directions).ok_or_else(|| {
            format!(
                "magnitude field is {}x{} but direction field is {}x{}",
                m.width, m.height, d.width, d.height
            )
        })
    }
}

impl GradientField {
    /// Pair a magnitude field with a direction field.
    ///
    /// Returns `None` if their dimensions differ.
    #[must_use]
    pub fn new(magnitudes: ScalarField<i32>, directions: ScalarField<Direction>) -> Option<Self> {
        (magnitudes.dimensions() == directions.dimensions()).then_some(Self {
            magnitudes,
            directions,
        })
    }

    /// Per-pixel rounded gradient magnitudes.
    #[must_use]
    pub const fn magnitudes(&self) -> &ScalarField<i32> {
        &self.magnitudes
    }

    /// Per-pixel quantized directions.
    #[must_use]
    pub const fn directions(&self) -> &ScalarField<Direction> {
        &self.directions
    }

    /// Field dimensions in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.magnitudes.dimensions()
    }

    /// Largest magnitude in the field, or 0 when empty.
    #[must_use]
    pub fn max_magnitude(&self) -> i32 {
        self.magnitudes.as_slice().iter().copied().max().unwrap_or(0)
    }

    /// Number of pixels whose direction is [`Direction::Unbinned`].
    #[must_use]
    pub fn unbinned_count(&self) -> usize {
        self.directions
            .as_slice()
            .iter()
            .filter(|&&d| d == Direction::Unbinned)
            .count()
    }
}

/// Compute the Sobel gradient field of `image`, one entry per pixel in
/// row-major order.
#[must_use = "returns the gradient field"]
pub fn compute_gradients<I>(image: &I) -> GradientField
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let dimensions = Dimensions::of(image);
    let mut magnitudes = Vec::with_capacity(dimensions.pixel_count());
    let mut directions = Vec::with_capacity(dimensions.pixel_count());

    for y in 0..dimensions.height {
        for x in 0..dimensions.width {
            let gx = apply_kernel(&SOBEL_HORIZONTAL, image, dimensions, x, y);
            let gy = apply_kernel(&SOBEL_VERTICAL, image, dimensions, x, y);
            magnitudes.push(magnitude(gx, gy));
            directions.push(Direction::from_gradient(gx, gy));
        }
    }

    let field = GradientField {
        magnitudes: ScalarField::from_parts(dimensions, magnitudes),
        directions: ScalarField::from_parts(dimensions, directions),
    };
    debug!(
        width = dimensions.width,
        height = dimensions.height,
        max_magnitude = field.max_magnitude(),
        unbinned = field.unbinned_count(),
        "computed gradient field"
    );
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn bins_include_upper_bounds() {
        assert_eq!(Direction::from_degrees(22.5), Direction::EastWest);
        assert_eq!(Direction::from_degrees(67.5), Direction::NorthEastSouthWest);
        assert_eq!(Direction::from_degrees(112.5), Direction::NorthSouth);
        assert_eq!(Direction::from_degrees(157.5), Direction::NorthWestSouthEast);
        assert_eq!(Direction::from_degrees(180.0), Direction::EastWest);
    }

    #[test]
    fn bins_exclude_lower_bounds() {
        assert_eq!(Direction::from_degrees(22.6), Direction::NorthEastSouthWest);
        assert_eq!(Direction::from_degrees(67.6), Direction::NorthSouth);
        assert_eq!(Direction::from_degrees(112.6), Direction::NorthWestSouthEast);
        assert_eq!(Direction::from_degrees(157.6), Direction::EastWest);
    }

    #[test]
    fn exactly_zero_is_unbinned() {
        assert_eq!(Direction::from_degrees(0.0), Direction::Unbinned);
        assert_eq!(Direction::from_degrees(1e-9), Direction::EastWest);
        assert_eq!(Direction::from_gradient(0, 0), Direction::Unbinned);
        // Pure positive x gradient: atan2(0, gx) is exactly 0.
        assert_eq!(Direction::from_gradient(510, 0), Direction::Unbinned);
    }

    #[test]
    fn negative_x_gradient_folds_to_east_west() {
        // atan2(0, -gx) is 180 degrees.
        assert_eq!(Direction::from_gradient(-510, 0), Direction::EastWest);
    }

    #[test]
    fn angles_fold_by_absolute_value() {
        assert_eq!(Direction::from_gradient(1, 1), Direction::NorthEastSouthWest);
        assert_eq!(Direction::from_gradient(1, -1), Direction::NorthEastSouthWest);
        assert_eq!(Direction::from_gradient(-1, 1), Direction::NorthWestSouthEast);
        assert_eq!(Direction::from_gradient(0, -3), Direction::NorthSouth);
    }

    #[test]
    fn degree_codes() {
        assert_eq!(Direction::EastWest.degrees(), 0);
        assert_eq!(Direction::NorthEastSouthWest.degrees(), 45);
        assert_eq!(Direction::NorthSouth.degrees(), 90);
        assert_eq!(Direction::NorthWestSouthEast.degrees(), 135);
        assert_eq!(Direction::Unbinned.degrees(), 0);
    }

    #[test]
    fn magnitude_is_rounded_euclidean_norm() {
        assert_eq!(magnitude(3, 4), 5);
        assert_eq!(magnitude(-255, -255), 361);
        assert_eq!(magnitude(765, 765), 1082);
        assert_eq!(magnitude(0, 0), 0);
    }

    #[test]
    fn fields_are_parallel_and_image_sized() {
        let img = RgbaImage::new(7, 3);
        let field = compute_gradients(&img);
        assert_eq!(field.dimensions(), Dimensions::new(7, 3));
        assert_eq!(field.magnitudes().len(), 21);
        assert_eq!(field.directions().len(), 21);
    }

    #[test]
    fn flat_black_field_is_zero_and_unbinned() {
        let img = RgbaImage::from_pixel(5, 4, BLACK);
        let field = compute_gradients(&img);
        assert!(field.magnitudes().as_slice().iter().all(|&m| m == 0));
        assert_eq!(field.unbinned_count(), 20);
    }

    #[test]
    fn flat_color_interior_is_zero_and_unbinned() {
        let img = RgbaImage::from_pixel(6, 6, Rgba([100, 150, 200, 255]));
        let field = compute_gradients(&img);
        // Only windows that stay clear of the black column and row past
        // the far edges see a flat neighborhood.
        for y in 0..5 {
            for x in 0..5 {
                if x == 0 || y == 0 {
                    continue;
                }
                assert_eq!(field.magnitudes().get(x, y), Some(0), "at ({x}, {y})");
                assert_eq!(field.directions().get(x, y), Some(Direction::Unbinned));
            }
        }
    }

    #[test]
    fn far_borders_of_a_flat_color_field_see_a_step() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([100, 150, 200, 255]));
        let field = compute_gradients(&img);
        // Luminance 142; the right border's window has a black column.
        assert_eq!(field.magnitudes().get(3, 1), Some(568));
        assert_eq!(field.directions().get(3, 1), Some(Direction::EastWest));
        assert_eq!(field.magnitudes().get(1, 3), Some(568));
        assert_eq!(field.directions().get(1, 3), Some(Direction::NorthSouth));
    }

    #[test]
    fn white_center_pixel_gradients() {
        let img = RgbaImage::from_fn(3, 3, |x, y| if (x, y) == (1, 1) { WHITE } else { BLACK });
        let field = compute_gradients(&img);
        assert_eq!(
            field.magnitudes().as_slice(),
            &[510, 0, 510, 510, 0, 510, 510, 510, 361]
        );
        assert_eq!(
            field.directions().as_slice(),
            &[
                Direction::EastWest,
                Direction::Unbinned,
                Direction::EastWest,
                Direction::EastWest,
                Direction::Unbinned,
                Direction::EastWest,
                Direction::NorthSouth,
                Direction::NorthSouth,
                Direction::NorthWestSouthEast,
            ]
        );
    }

    #[test]
    fn mismatched_fields_are_rejected() {
        let m = ScalarField::new(Dimensions::new(2, 2), 0);
        let d = ScalarField::new(Dimensions::new(4, 1), Direction::Unbinned);
        assert!(GradientField::new(m, d).is_none());
    }
}
