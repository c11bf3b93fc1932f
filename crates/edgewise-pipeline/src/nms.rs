//! Non-maximum suppression along the quantized gradient direction.
//!
//! A pixel keeps its magnitude only if it is strictly greater than both
//! neighbors on its direction axis; otherwise it becomes 0. A neighbor
//! that does not exist counts as magnitude 0. [`Direction::Unbinned`]
//! pixels are always suppressed.
//!
//! Neighbor existence is decided per axis by [`ScalarField::neighbor`]:
//!
//! | axis  | neighbors                  | row wrap                  |
//! |-------|----------------------------|---------------------------|
//! | 0°    | west, east                 | [`RowWrap::Guarded`]      |
//! | 45°   | north-east, south-west     | [`RowWrap::Unguarded`]    |
//! | 90°   | north, south               | vertical, bounds only     |
//! | 135°  | north-west, south-east     | [`RowWrap::Guarded`]      |
//!
//! The 45° axis checks array bounds only, so at the first and last
//! columns its neighbors can wrap into the opposite border of an
//! adjacent row. Output images depend on this.

use tracing::debug;

use crate::field::{Offset, RowWrap, ScalarField};
use crate::gradient::{Direction, GradientField};

/// The two neighbor offsets compared along `direction`, and whether a
/// horizontal step is kept within its row. `None` for unbinned pixels.
const fn comparison_axis(direction: Direction) -> Option<(Offset, Offset, RowWrap)> {
    match direction {
        Direction::EastWest => Some((Offset::WEST, Offset::EAST, RowWrap::Guarded)),
        Direction::NorthEastSouthWest => {
            Some((Offset::NORTH_EAST, Offset::SOUTH_WEST, RowWrap::Unguarded))
        }
        Direction::NorthSouth => Some((Offset::NORTH, Offset::SOUTH, RowWrap::Unguarded)),
        Direction::NorthWestSouthEast => {
            Some((Offset::NORTH_WEST, Offset::SOUTH_EAST, RowWrap::Guarded))
        }
        Direction::Unbinned => None,
    }
}

/// Thin the gradient field to local maxima along each pixel's direction.
///
/// The result has the same dimensions as `gradients`. Every non-zero
/// output equals the input magnitude at that pixel.
#[must_use = "returns the suppressed magnitudes"]
pub fn suppress(gradients: &GradientField) -> ScalarField<i32> {
    let magnitudes = gradients.magnitudes();
    let directions = gradients.directions().as_slice();

    let values: Vec<i32> = magnitudes
        .as_slice()
        .iter()
        .zip(directions)
        .enumerate()
        .map(|(index, (&magnitude, &direction))| {
            let Some((before, after, wrap)) = comparison_axis(direction) else {
                return 0;
            };
            let a = magnitudes.neighbor(index, before, wrap).unwrap_or(0);
            let b = magnitudes.neighbor(index, after, wrap).unwrap_or(0);
            if magnitude > a && magnitude > b {
                magnitude
            } else {
                0
            }
        })
        .collect();

    let suppressed = ScalarField::from_parts(gradients.dimensions(), values);
    debug!(
        surviving = suppressed.as_slice().iter().filter(|&&m| m != 0).count(),
        "non-maximum suppression"
    );
    suppressed
}
