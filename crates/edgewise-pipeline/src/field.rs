//! Flattened per-pixel scalar fields.
//!
//! A [`ScalarField`] stores one value per pixel in row-major order
//! (`index = y * width + x`). Gradient magnitudes, direction codes and
//! suppressed magnitudes all live in fields of this shape.
//!
//! Every neighbor lookup goes through [`ScalarField::neighbor`]. It is the
//! only place that turns a relative offset into a flat index, so the
//! bounds check and the row-wrap check cannot drift apart between callers.

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Whether a horizontal step may cross into an adjacent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowWrap {
    /// A westward step from the first column, or an eastward step from
    /// the last column, has no neighbor.
    Guarded,
    /// Only the array bounds are checked. An eastward step from the last
    /// column lands on the first pixel of the next row.
    Unguarded,
}

/// Relative position of a neighboring pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// Column delta, -1, 0 or 1.
    pub dx: i8,
    /// Row delta, -1, 0 or 1.
    pub dy: i8,
}

impl Offset {
    pub const NORTH: Self = Self { dx: 0, dy: -1 };
    pub const SOUTH: Self = Self { dx: 0, dy: 1 };
    pub const EAST: Self = Self { dx: 1, dy: 0 };
    pub const WEST: Self = Self { dx: -1, dy: 0 };
    pub const NORTH_EAST: Self = Self { dx: 1, dy: -1 };
    pub const NORTH_WEST: Self = Self { dx: -1, dy: -1 };
    pub const SOUTH_EAST: Self = Self { dx: 1, dy: 1 };
    pub const SOUTH_WEST: Self = Self { dx: -1, dy: 1 };
}

/// A row-major buffer holding one value per pixel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarField<T> {
    dimensions: Dimensions,
    values: Vec<T>,
}

impl<T: Copy> ScalarField<T> {
    /// Create a field with every pixel set to `fill`.
    #[must_use]
    pub fn new(dimensions: Dimensions, fill: T) -> Self {
        Self {
            dimensions,
            values: vec![fill; dimensions.pixel_count()],
        }
    }

    /// Build a field by evaluating `f(x, y)` for every pixel in scan order.
    #[must_use]
    pub fn from_fn(dimensions: Dimensions, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut values = Vec::with_capacity(dimensions.pixel_count());
        for y in 0..dimensions.height {
            for x in 0..dimensions.width {
                values.push(f(x, y));
            }
        }
        Self { dimensions, values }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// Returns `None` when `values.len()` is not `width * height`.
    #[must_use]
    pub fn from_raw(dimensions: Dimensions, values: Vec<T>) -> Option<Self> {
        (values.len() == dimensions.pixel_count()).then_some(Self { dimensions, values })
    }

    /// Value at `(x, y)`, or `None` outside the field.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<T> {
        if !self.dimensions.contains(x, y) {
            return None;
        }
        self.values.get(self.index_of(x, y)).copied()
    }

    /// Value of the neighbor `offset` away from the pixel at flat `index`.
    ///
    /// Returns `None` when the neighbor falls outside the buffer, or when
    /// `wrap` is [`RowWrap::Guarded`] and the horizontal component would
    /// leave the row of `index`.
    #[must_use]
    pub fn neighbor(&self, index: usize, offset: Offset, wrap: RowWrap) -> Option<T> {
        if index >= self.values.len() {
            return None;
        }
        let width = self.dimensions.width as usize;

        if wrap == RowWrap::Guarded {
            if offset.dx < 0 && index % width == 0 {
                return None;
            }
            if offset.dx > 0 && (index + 1) % width == 0 {
                return None;
            }
        }

        let row_step = isize::try_from(width).ok()?;
        let delta = isize::from(offset.dy) * row_step + isize::from(offset.dx);
        let target = index.checked_add_signed(delta)?;
        self.values.get(target).copied()
    }
}

impl<T> ScalarField<T> {
    /// Internal constructor for buffers whose length is correct by
    /// construction (one push per pixel in scan order).
    pub(crate) fn from_parts(dimensions: Dimensions, values: Vec<T>) -> Self {
        debug_assert_eq!(values.len(), dimensions.pixel_count());
        Self { dimensions, values }
    }

    /// Field dimensions in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Number of values (`width * height`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the field holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat index of `(x, y)`.
    #[must_use]
    pub const fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.dimensions.width as usize + x as usize
    }

    /// Pixel coordinates of a flat index.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn coordinates(&self, index: usize) -> (u32, u32) {
        let width = self.dimensions.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }

    /// Row-major view of all values.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Consume the field and return the row-major buffer.
    #[must_use]
    pub fn into_raw(self) -> Vec<T> {
        self.values
    }
}

#[derive(Deserialize)]
struct ScalarFieldParts<T> {
    dimensions: Dimensions,
    values: Vec<T>,
}

impl<'de, T: Deserialize<'de> + Copy> Deserialize<'de> for ScalarField<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = ScalarFieldParts::<T>::deserialize(deserializer)?;
        let (width, height, len) = (
            parts.dimensions.width,
            parts.dimensions.height,
            parts.values.len(),
        );
        Self::from_raw(parts.dimensions, parts.values).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "scalar field holds {len} values but is {width}x{height}"
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 3x2 field holding its own flat index: `[0 1 2 / 3 4 5]`.
    fn indexed() -> ScalarField<i32> {
        ScalarField::from_raw(Dimensions::new(3, 2), (0..6).collect()).unwrap()
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        assert!(ScalarField::from_raw(Dimensions::new(3, 2), vec![0; 5]).is_none());
        assert!(ScalarField::from_raw(Dimensions::new(3, 2), vec![0; 7]).is_none());
    }

    #[test]
    fn from_fn_is_row_major() {
        let field = ScalarField::from_fn(Dimensions::new(3, 2), |x, y| y * 10 + x);
        assert_eq!(field.as_slice(), &[0_u32, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn index_and_coordinates_agree() {
        let field = indexed();
        for i in 0..field.len() {
            let (x, y) = field.coordinates(i);
            assert_eq!(field.index_of(x, y), i);
        }
        assert_eq!(field.coordinates(4), (1, 1));
    }

    #[test]
    fn get_outside_is_none() {
        let field = indexed();
        assert_eq!(field.get(2, 1), Some(5));
        assert_eq!(field.get(3, 0), None);
        assert_eq!(field.get(0, 2), None);
    }

    #[test]
    fn vertical_neighbors_check_bounds_only() {
        let field = indexed();
        assert_eq!(field.neighbor(1, Offset::NORTH, RowWrap::Unguarded), None);
        assert_eq!(field.neighbor(1, Offset::SOUTH, RowWrap::Unguarded), Some(4));
        assert_eq!(field.neighbor(4, Offset::SOUTH, RowWrap::Unguarded), None);
    }

    #[test]
    fn guarded_west_stops_at_first_column() {
        let field = indexed();
        assert_eq!(field.neighbor(3, Offset::WEST, RowWrap::Guarded), None);
        assert_eq!(field.neighbor(4, Offset::WEST, RowWrap::Guarded), Some(3));
    }

    #[test]
    fn guarded_east_stops_at_last_column() {
        let field = indexed();
        assert_eq!(field.neighbor(2, Offset::EAST, RowWrap::Guarded), None);
        assert_eq!(field.neighbor(1, Offset::EAST, RowWrap::Guarded), Some(2));
    }

    #[test]
    fn unguarded_east_wraps_into_next_row() {
        let field = indexed();
        assert_eq!(field.neighbor(2, Offset::EAST, RowWrap::Unguarded), Some(3));
    }

    #[test]
    fn unguarded_diagonal_wraps() {
        let field = indexed();
        // (2, 1) north-east is index 5 - 3 + 1 = 3, i.e. (0, 1).
        assert_eq!(field.neighbor(5, Offset::NORTH_EAST, RowWrap::Unguarded), Some(3));
        // (0, 0) south-west is index 0 + 3 - 1 = 2, i.e. (2, 0).
        assert_eq!(field.neighbor(0, Offset::SOUTH_WEST, RowWrap::Unguarded), Some(2));
        assert_eq!(field.neighbor(0, Offset::SOUTH_WEST, RowWrap::Guarded), None);
    }

    #[test]
    fn neighbor_before_start_is_none() {
        let field = indexed();
        assert_eq!(field.neighbor(0, Offset::NORTH_WEST, RowWrap::Unguarded), None);
    }

    #[test]
    fn neighbor_of_out_of_range_index_is_none() {
        let field = indexed();
        assert_eq!(field.neighbor(6, Offset::WEST, RowWrap::Unguarded), None);
        let empty: ScalarField<i32> = ScalarField::new(Dimensions::new(0, 0), 0);
        assert_eq!(empty.neighbor(0, Offset::EAST, RowWrap::Guarded), None);
    }

    #[test]
    fn deserialize_validates_length() {
        let ok = r#"{"dimensions": {"width": 2, "height": 1}, "values": [1, 2]}"#;
        let field: ScalarField<i32> = serde_json::from_str(ok).unwrap();
        assert_eq!(field.as_slice(), &[1, 2]);

        let bad = r#"{"dimensions": {"width": 2, "height": 2}, "values": [1, 2]}"#;
        assert!(serde_json::from_str::<ScalarField<i32>>(bad).is_err());
    }
}
