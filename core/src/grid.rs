//! Spatial grid shared by every map layer.
//!
//! Cells are stored row-major with the width as the inner stride, so the
//! linear index of `(x, y)` is `y * width + x`. No other layout is observable
//! outside this module.

use serde::{Deserialize, Serialize};

use crate::GridError;

/// Location of a single grid cell expressed as `x` (column) and `y` (row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Chebyshev (chessboard) distance between two cells.
    ///
    /// Two cells are "within `d`" of each other for footprint checks when the
    /// square of side `2d + 1` centred on one contains the other.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Extent of a map expressed as a pair of corners.
///
/// The minimum corner is inclusive and the maximum corner exclusive, so the
/// width and height are the component-wise differences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    min_corner: CellCoord,
    max_corner: CellCoord,
}

impl Dimension {
    /// Creates a dimension from explicit corners.
    pub fn new(min_corner: CellCoord, max_corner: CellCoord) -> Result<Self, GridError> {
        if max_corner.x() < min_corner.x() || max_corner.y() < min_corner.y() {
            return Err(GridError::InvertedCorners {
                min: min_corner,
                max: max_corner,
            });
        }

        Ok(Self {
            min_corner,
            max_corner,
        })
    }

    /// Creates a dimension anchored at the origin with the provided size.
    #[must_use]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self {
            min_corner: CellCoord::new(0, 0),
            max_corner: CellCoord::new(width, height),
        }
    }

    /// Inclusive minimum corner.
    #[must_use]
    pub const fn min_corner(&self) -> CellCoord {
        self.min_corner
    }

    /// Exclusive maximum corner.
    #[must_use]
    pub const fn max_corner(&self) -> CellCoord {
        self.max_corner
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.max_corner.x() - self.min_corner.x()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.max_corner.y() - self.min_corner.y()
    }

    /// Total number of cells covered by the dimension.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width()) * u64::from(self.height());
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the signed coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    /// Converts a signed coordinate into a linear cell index.
    ///
    /// Coordinates are signed so that offsets leaving the grid are reported
    /// rather than wrapped.
    pub fn to_index(&self, x: i64, y: i64) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }

        let width = i64::from(self.width());
        usize::try_from(y * width + x).map_err(|_| GridError::OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        })
    }

    /// Converts a cell coordinate into a linear cell index.
    pub fn index_of(&self, cell: CellCoord) -> Result<usize, GridError> {
        self.to_index(i64::from(cell.x()), i64::from(cell.y()))
    }

    /// Converts a linear cell index back into its coordinate.
    pub fn to_coord(&self, index: usize) -> Result<CellCoord, GridError> {
        let len = self.cell_count();
        if index >= len {
            return Err(GridError::IndexOutOfRange { index, len });
        }

        let width = usize::try_from(self.width()).unwrap_or(usize::MAX);
        let x = u32::try_from(index % width).unwrap_or(u32::MAX);
        let y = u32::try_from(index / width).unwrap_or(u32::MAX);
        Ok(CellCoord::new(x, y))
    }

    /// Checks that a linear index addresses a cell of this grid.
    pub fn check_index(&self, index: usize) -> Result<(), GridError> {
        let len = self.cell_count();
        if index < len {
            Ok(())
        } else {
            Err(GridError::IndexOutOfRange { index, len })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_coord_round_trip_for_every_cell() {
        let dimension = Dimension::from_size(7, 5);
        for y in 0..5_i64 {
            for x in 0..7_i64 {
                let index = dimension.to_index(x, y).expect("cell is on the grid");
                let coord = dimension.to_coord(index).expect("index is in range");
                assert_eq!(
                    (i64::from(coord.x()), i64::from(coord.y())),
                    (x, y),
                    "round trip diverged for ({x}, {y})",
                );
            }
        }
    }

    #[test]
    fn width_is_the_inner_stride() {
        let dimension = Dimension::from_size(4, 9);
        assert_eq!(dimension.to_index(3, 0), Ok(3));
        assert_eq!(dimension.to_index(0, 1), Ok(4));
        assert_eq!(dimension.to_index(2, 8), Ok(34));
    }

    #[test]
    fn coordinates_outside_the_grid_are_rejected() {
        let dimension = Dimension::from_size(4, 3);
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (10, 10)] {
            assert!(
                matches!(dimension.to_index(x, y), Err(GridError::OutOfBounds { .. })),
                "({x}, {y}) should be out of bounds",
            );
        }
    }

    #[test]
    fn index_past_the_end_is_rejected() {
        let dimension = Dimension::from_size(3, 3);
        assert_eq!(
            dimension.to_coord(9),
            Err(GridError::IndexOutOfRange { index: 9, len: 9 })
        );
    }

    #[test]
    fn dimension_derives_size_from_corners() {
        let dimension = Dimension::new(CellCoord::new(2, 3), CellCoord::new(12, 8))
            .expect("corners are ordered");
        assert_eq!(dimension.width(), 10);
        assert_eq!(dimension.height(), 5);
        assert_eq!(dimension.cell_count(), 50);
    }

    #[test]
    fn inverted_corners_are_rejected() {
        let result = Dimension::new(CellCoord::new(5, 5), CellCoord::new(4, 6));
        assert!(matches!(result, Err(GridError::InvertedCorners { .. })));
    }

    #[test]
    fn chebyshev_distance_uses_the_larger_axis() {
        let a = CellCoord::new(2, 2);
        assert_eq!(a.chebyshev_distance(CellCoord::new(4, 3)), 2);
        assert_eq!(a.chebyshev_distance(CellCoord::new(2, 2)), 0);
        assert_eq!(CellCoord::new(0, 7).chebyshev_distance(a), 5);
    }
}
