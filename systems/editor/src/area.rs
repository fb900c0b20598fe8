//! Disc-shaped cell selection for area brushes.

use mapwright_core::{CellCoord, Dimension};

/// Cell indices covered by a brush of the configured radius.
///
/// A radius of `R` reaches `R - 1` cells from the centre; an offset `(i, j)`
/// is covered when `i² + j² <= (R - 1)²`. Only offsets that land on the grid
/// are visited, so the work is bounded by the map size for any radius.
pub(crate) fn cells_in_radius(dimension: &Dimension, center: CellCoord, radius: u32) -> Vec<usize> {
    let reach = i64::from(radius.saturating_sub(1));
    let reach_squared = i128::from(reach) * i128::from(reach);
    let (x, y) = (i64::from(center.x()), i64::from(center.y()));
    let last_x = i64::from(dimension.width()) - 1;
    let last_y = i64::from(dimension.height()) - 1;

    let mut cells = Vec::new();
    for i in (-reach).max(-x)..=reach.min(last_x - x) {
        for j in (-reach).max(-y)..=reach.min(last_y - y) {
            let distance_squared = i128::from(i) * i128::from(i) + i128::from(j) * i128::from(j);
            if distance_squared > reach_squared {
                continue;
            }
            if let Ok(index) = dimension.to_index(x + i, y + j) {
                cells.push(index);
            }
        }
    }
    cells
}
