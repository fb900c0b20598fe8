//! Static terrain layers shared by every match-state snapshot.

use std::collections::BTreeMap;

use mapwright_core::{CellCoord, Dimension, GridError, Symmetry};
use serde::{Deserialize, Serialize};

const BLANK_MAP_NAME: &str = "Custom Map";

/// Map description as decoded from a match file header.
///
/// Every per-cell layer is laid out row-major over the header's corners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapHeader {
    /// Display name of the map.
    pub name: String,
    /// Seed the engine used to generate the match.
    pub random_seed: u32,
    /// Symmetry tag (0 rotational, 1 horizontal, 2 vertical).
    pub symmetry: u8,
    /// Inclusive minimum corner.
    pub min_corner: CellCoord,
    /// Exclusive maximum corner.
    pub max_corner: CellCoord,
    /// Wall layer.
    pub walls: Vec<bool>,
    /// Cloud layer.
    pub clouds: Vec<bool>,
    /// Current headings (0 = none).
    pub currents: Vec<u8>,
    /// Resource types (0 = none).
    pub resources: Vec<u8>,
    /// Island ids (0 = no island).
    pub islands: Vec<u32>,
    /// Paint present when the match starts (0 = none).
    #[serde(default)]
    pub initial_paint: Vec<u8>,
    /// Ruin locations.
    #[serde(default)]
    pub ruins: Vec<CellCoord>,
}

/// Reasons a map header is rejected as an invalid map.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The symmetry tag or corners are malformed.
    #[error("invalid map geometry: {0}")]
    Geometry(#[from] GridError),
    /// A per-cell layer does not cover the grid exactly.
    #[error("layer `{layer}` has {actual} cells, expected {expected}")]
    LayerLength {
        /// Name of the offending layer.
        layer: &'static str,
        /// Cell count of the grid.
        expected: usize,
        /// Length of the layer.
        actual: usize,
    },
    /// A ruin lies outside the grid.
    #[error("ruin at {0:?} lies outside the map")]
    RuinOutOfBounds(CellCoord),
}

/// Immutable-shape, mutable-content terrain of a map.
///
/// Nothing here checks exclusivity between layers; editing brushes decide
/// which combinations are legal before writing.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticMap {
    name: String,
    random_seed: u32,
    symmetry: Symmetry,
    dimension: Dimension,
    walls: Vec<bool>,
    clouds: Vec<bool>,
    currents: Vec<u8>,
    resources: Vec<u8>,
    islands: Vec<u32>,
    initial_paint: Vec<u8>,
    ruins: Vec<CellCoord>,
}

impl StaticMap {
    /// Builds terrain from a decoded header, validating its shape.
    pub fn from_header(header: MapHeader) -> Result<Self, MapError> {
        let symmetry = Symmetry::from_tag(header.symmetry)?;
        let dimension = Dimension::new(header.min_corner, header.max_corner)?;
        let expected = dimension.cell_count();

        let initial_paint = if header.initial_paint.is_empty() {
            vec![0; expected]
        } else {
            header.initial_paint
        };

        for (layer, actual) in [
            ("walls", header.walls.len()),
            ("clouds", header.clouds.len()),
            ("currents", header.currents.len()),
            ("resources", header.resources.len()),
            ("islands", header.islands.len()),
            ("initial_paint", initial_paint.len()),
        ] {
            if actual != expected {
                return Err(MapError::LayerLength {
                    layer,
                    expected,
                    actual,
                });
            }
        }

        if let Some(ruin) = header
            .ruins
            .iter()
            .find(|ruin| dimension.index_of(**ruin).is_err())
        {
            return Err(MapError::RuinOutOfBounds(*ruin));
        }

        tracing::debug!(
            target: "mapwright::terrain",
            name = %header.name,
            width = dimension.width(),
            height = dimension.height(),
            symmetry = ?symmetry,
            ruins = header.ruins.len(),
            "terrain.loaded"
        );

        Ok(Self {
            name: header.name,
            random_seed: header.random_seed,
            symmetry,
            dimension,
            walls: header.walls,
            clouds: header.clouds,
            currents: header.currents,
            resources: header.resources,
            islands: header.islands,
            initial_paint,
            ruins: header.ruins,
        })
    }

    /// Creates an empty map of the provided size for the editor.
    #[must_use]
    pub fn blank(width: u32, height: u32, symmetry: Symmetry) -> Self {
        let dimension = Dimension::from_size(width, height);
        let cells = dimension.cell_count();
        Self {
            name: BLANK_MAP_NAME.to_owned(),
            random_seed: 0,
            symmetry,
            dimension,
            walls: vec![false; cells],
            clouds: vec![false; cells],
            currents: vec![0; cells],
            resources: vec![0; cells],
            islands: vec![0; cells],
            initial_paint: vec![0; cells],
            ruins: Vec::new(),
        }
    }

    /// Converts the terrain back into a header for export.
    #[must_use]
    pub fn to_header(&self) -> MapHeader {
        MapHeader {
            name: self.name.clone(),
            random_seed: self.random_seed,
            symmetry: self.symmetry.tag(),
            min_corner: self.dimension.min_corner(),
            max_corner: self.dimension.max_corner(),
            walls: self.walls.clone(),
            clouds: self.clouds.clone(),
            currents: self.currents.clone(),
            resources: self.resources.clone(),
            islands: self.islands.clone(),
            initial_paint: self.initial_paint.clone(),
            ruins: self.ruins.clone(),
        }
    }

    /// Display name of the map.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seed recorded in the map header.
    #[must_use]
    pub const fn random_seed(&self) -> u32 {
        self.random_seed
    }

    /// Symmetry the map was authored with.
    #[must_use]
    pub const fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Extent of the map.
    #[must_use]
    pub const fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Wall layer.
    #[must_use]
    pub fn walls(&self) -> &[bool] {
        &self.walls
    }

    /// Cloud layer.
    #[must_use]
    pub fn clouds(&self) -> &[bool] {
        &self.clouds
    }

    /// Current headings (0 = none).
    #[must_use]
    pub fn currents(&self) -> &[u8] {
        &self.currents
    }

    /// Resource types as authored (0 = none).
    #[must_use]
    pub fn resources(&self) -> &[u8] {
        &self.resources
    }

    /// Island ids (0 = no island).
    #[must_use]
    pub fn islands(&self) -> &[u32] {
        &self.islands
    }

    /// Paint present when a match starts.
    #[must_use]
    pub fn initial_paint(&self) -> &[u8] {
        &self.initial_paint
    }

    /// Ruin locations in insertion order.
    #[must_use]
    pub fn ruins(&self) -> &[CellCoord] {
        &self.ruins
    }

    /// Reports whether the cell holds a wall.
    #[must_use]
    pub fn is_wall(&self, index: usize) -> bool {
        self.walls.get(index).copied().unwrap_or(false)
    }

    /// Sets the wall flag of a cell, returning the previous flag.
    pub fn set_wall(&mut self, index: usize, wall: bool) -> Result<bool, GridError> {
        replace_cell(&mut self.walls, index, wall)
    }

    /// Sets the cloud flag of a cell, returning the previous flag.
    pub fn set_cloud(&mut self, index: usize, cloud: bool) -> Result<bool, GridError> {
        replace_cell(&mut self.clouds, index, cloud)
    }

    /// Sets the current heading of a cell, returning the previous value.
    pub fn set_current(&mut self, index: usize, heading: u8) -> Result<u8, GridError> {
        replace_cell(&mut self.currents, index, heading)
    }

    /// Sets the island id of a cell, returning the previous id.
    pub fn set_island(&mut self, index: usize, island: u32) -> Result<u32, GridError> {
        replace_cell(&mut self.islands, index, island)
    }

    pub(crate) fn set_resource(&mut self, index: usize, resource: u8) -> Result<u8, GridError> {
        replace_cell(&mut self.resources, index, resource)
    }

    pub(crate) fn set_initial_paint(&mut self, index: usize, value: u8) -> Result<u8, GridError> {
        replace_cell(&mut self.initial_paint, index, value)
    }

    /// Reports whether a ruin sits exactly on the cell.
    #[must_use]
    pub fn has_ruin_at(&self, cell: CellCoord) -> bool {
        self.ruins.iter().any(|ruin| *ruin == cell)
    }

    /// Reports whether any ruin lies within the square neighbourhood of `distance`.
    #[must_use]
    pub fn ruin_within(&self, cell: CellCoord, distance: u32) -> bool {
        self.ruins
            .iter()
            .any(|ruin| ruin.chebyshev_distance(cell) <= distance)
    }

    /// Reports whether any wall lies within the square neighbourhood of `distance`.
    #[must_use]
    pub fn wall_within(&self, cell: CellCoord, distance: u32) -> bool {
        let reach = i64::from(distance);
        let (x, y) = (i64::from(cell.x()), i64::from(cell.y()));
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if let Ok(index) = self.dimension.to_index(x + dx, y + dy) {
                    if self.is_wall(index) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Adds a ruin, returning `false` when one already sits on the cell.
    pub fn add_ruin(&mut self, cell: CellCoord) -> Result<bool, GridError> {
        let _ = self.dimension.index_of(cell)?;
        if self.has_ruin_at(cell) {
            return Ok(false);
        }
        self.ruins.push(cell);
        Ok(true)
    }

    /// Removes the ruin on the cell, returning the position it held in the
    /// ruin list.
    pub fn remove_ruin(&mut self, cell: CellCoord) -> Option<usize> {
        let position = self.ruins.iter().position(|ruin| *ruin == cell)?;
        let _ = self.ruins.remove(position);
        Some(position)
    }

    /// Reinserts a ruin at a position of the ruin list, clamped to its length.
    pub fn insert_ruin(&mut self, position: usize, cell: CellCoord) -> Result<(), GridError> {
        let _ = self.dimension.index_of(cell)?;
        if position > self.ruins.len() {
            tracing::warn!(
                target: "mapwright::terrain",
                position,
                ruins = self.ruins.len(),
                "ruin.position_clamped"
            );
        }
        self.ruins.insert(position.min(self.ruins.len()), cell);
        Ok(())
    }

    /// Groups cell indices by island id, skipping cells without an island.
    #[must_use]
    pub fn island_cells(&self) -> BTreeMap<u32, Vec<usize>> {
        let mut islands: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, island) in self.islands.iter().enumerate() {
            if *island != 0 {
                islands.entry(*island).or_default().push(index);
            }
        }
        islands
    }
}

/// Overwrites one cell of a layer, returning the value it held.
pub(crate) fn replace_cell<T: Copy>(layer: &mut [T], index: usize, value: T) -> Result<T, GridError> {
    let len = layer.len();
    let slot = layer
        .get_mut(index)
        .ok_or(GridError::IndexOutOfRange { index, len })?;
    Ok(std::mem::replace(slot, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: u32, height: u32) -> MapHeader {
        StaticMap::blank(width, height, Symmetry::Rotational).to_header()
    }

    #[test]
    fn header_round_trips_through_terrain() {
        let mut original = header(6, 4);
        original.walls[5] = true;
        original.islands[7] = 2;
        original.ruins.push(CellCoord::new(3, 2));

        let map = StaticMap::from_header(original.clone()).expect("header is valid");
        assert_eq!(map.to_header(), original);
    }

    #[test]
    fn unknown_symmetry_tag_is_an_invalid_map() {
        let mut bad = header(4, 4);
        bad.symmetry = 7;
        assert_eq!(
            StaticMap::from_header(bad),
            Err(MapError::Geometry(GridError::InvalidSymmetry(7)))
        );
    }

    #[test]
    fn short_layer_is_an_invalid_map() {
        let mut bad = header(4, 4);
        let _ = bad.currents.pop();
        assert_eq!(
            StaticMap::from_header(bad),
            Err(MapError::LayerLength {
                layer: "currents",
                expected: 16,
                actual: 15,
            })
        );
    }

    #[test]
    fn missing_initial_paint_defaults_to_unpainted() {
        let mut legacy = header(3, 3);
        legacy.initial_paint.clear();
        let map = StaticMap::from_header(legacy).expect("paint layer is optional");
        assert_eq!(map.initial_paint(), &[0; 9]);
    }

    #[test]
    fn ruins_outside_the_grid_are_rejected() {
        let mut bad = header(4, 4);
        bad.ruins.push(CellCoord::new(4, 1));
        assert_eq!(
            StaticMap::from_header(bad),
            Err(MapError::RuinOutOfBounds(CellCoord::new(4, 1)))
        );
    }

    #[test]
    fn setters_return_previous_values_and_check_bounds() {
        let mut map = StaticMap::blank(3, 3, Symmetry::Vertical);
        assert_eq!(map.set_wall(4, true), Ok(false));
        assert_eq!(map.set_wall(4, false), Ok(true));
        assert_eq!(map.set_current(0, 5), Ok(0));
        assert_eq!(
            map.set_cloud(9, true),
            Err(GridError::IndexOutOfRange { index: 9, len: 9 })
        );
    }

    #[test]
    fn neighbourhood_queries_use_square_distance() {
        let mut map = StaticMap::blank(10, 10, Symmetry::Rotational);
        assert_eq!(map.add_ruin(CellCoord::new(5, 5)), Ok(true));
        assert_eq!(map.add_ruin(CellCoord::new(5, 5)), Ok(false));
        assert!(map.ruin_within(CellCoord::new(7, 7), 2));
        assert!(!map.ruin_within(CellCoord::new(8, 5), 2));

        let index = map.dimension().to_index(1, 1).expect("on grid");
        let _ = map.set_wall(index, true).expect("on grid");
        assert!(map.wall_within(CellCoord::new(3, 3), 2));
        assert!(!map.wall_within(CellCoord::new(4, 1), 2));
    }

    #[test]
    fn removed_ruins_reinsert_at_their_old_position() {
        let mut map = StaticMap::blank(8, 8, Symmetry::Horizontal);
        for x in [2, 4, 6] {
            let _ = map.add_ruin(CellCoord::new(x, 3)).expect("on grid");
        }
        assert_eq!(map.remove_ruin(CellCoord::new(2, 2)), None);

        let position = map.remove_ruin(CellCoord::new(4, 3));
        assert_eq!(position, Some(1));
        map.insert_ruin(1, CellCoord::new(4, 3)).expect("on grid");
        assert_eq!(
            map.ruins(),
            &[CellCoord::new(2, 3), CellCoord::new(4, 3), CellCoord::new(6, 3)]
        );
    }

    #[test]
    fn stale_ruin_positions_append_at_the_end() {
        let mut map = StaticMap::blank(8, 8, Symmetry::Horizontal);
        let _ = map.add_ruin(CellCoord::new(2, 3)).expect("on grid");
        map.insert_ruin(5, CellCoord::new(5, 3)).expect("on grid");
        assert_eq!(map.ruins(), &[CellCoord::new(2, 3), CellCoord::new(5, 3)]);
    }

    #[test]
    fn island_cells_group_indices_by_id() {
        let mut map = StaticMap::blank(3, 2, Symmetry::Rotational);
        let _ = map.set_island(0, 4).expect("on grid");
        let _ = map.set_island(5, 4).expect("on grid");
        let _ = map.set_island(2, 1).expect("on grid");

        let islands = map.island_cells();
        assert_eq!(islands.len(), 2);
        assert_eq!(islands[&4], vec![0, 5]);
        assert_eq!(islands[&1], vec![2]);
    }
}
