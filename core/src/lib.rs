#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mapwright replay and editing engine.
//!
//! This crate defines the value types every other crate agrees on: the
//! spatial grid, team and entity tags, map symmetry, the decoded [`Round`]
//! records fed to the world during playback, and the [`Event`] values the
//! world broadcasts after applying them. Renderers and editors consume
//! events and query snapshots; they never reach into world internals.

use serde::{Deserialize, Serialize};

mod delta;
mod grid;

pub use delta::{
    IslandColumns, IslandDelta, PaintDelta, Round, SpawnedBody, WellColumns, WellDelta,
};
pub use grid::{CellCoord, Dimension};

/// One of the two competing teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// First team, index 0.
    A,
    /// Second team, index 1.
    B,
}

impl Team {
    /// Resolves a team from its zero-based index.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }

    /// Zero-based index of the team.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Returns the other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Resolves an editor-relative team: `base XOR side`.
    ///
    /// `side` is 0 for the point the user clicked and 1 for its mirror, so a
    /// single brush setting paints both halves of a symmetric map for
    /// opposing teams.
    #[must_use]
    pub const fn relative(base: u8, side: u8) -> Self {
        if (base ^ side) & 1 == 0 {
            Self::A
        } else {
            Self::B
        }
    }
}

/// Unique identifier assigned to a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of bodies that can occupy a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Stationary tower that refills paint.
    PaintTower,
    /// Stationary tower that generates money.
    MoneyTower,
    /// Stationary tower that attacks nearby enemies.
    DefenseTower,
    /// Mobile unit that paints and attacks.
    Soldier,
    /// Mobile unit that removes enemy paint.
    Mopper,
    /// Mobile unit that paints in an area.
    Splasher,
}

impl EntityKind {
    /// Resolves a kind from the schema's numeric robot type.
    #[must_use]
    pub const fn from_schema_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::PaintTower),
            2 => Some(Self::MoneyTower),
            3 => Some(Self::DefenseTower),
            4 => Some(Self::Soldier),
            5 => Some(Self::Mopper),
            6 => Some(Self::Splasher),
            _ => None,
        }
    }

    /// Numeric robot type used by the schema.
    #[must_use]
    pub const fn schema_id(self) -> u8 {
        match self {
            Self::PaintTower => 1,
            Self::MoneyTower => 2,
            Self::DefenseTower => 3,
            Self::Soldier => 4,
            Self::Mopper => 5,
            Self::Splasher => 6,
        }
    }

    /// Reports whether the kind is a stationary tower.
    #[must_use]
    pub const fn is_tower(self) -> bool {
        matches!(
            self,
            Self::PaintTower | Self::MoneyTower | Self::DefenseTower
        )
    }
}

/// Map-wide transform that symmetric edits mirror automatically.
///
/// Every tag is a two-fold transform; four-fold symmetry is not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symmetry {
    /// 180 degree rotation about the map centre (tag 0).
    Rotational,
    /// Reflection across the horizontal centre line (tag 1).
    Horizontal,
    /// Reflection across the vertical centre line (tag 2).
    Vertical,
}

impl Symmetry {
    /// Resolves a symmetry from its schema tag.
    pub const fn from_tag(tag: u8) -> Result<Self, GridError> {
        match tag {
            0 => Ok(Self::Rotational),
            1 => Ok(Self::Horizontal),
            2 => Ok(Self::Vertical),
            _ => Err(GridError::InvalidSymmetry(tag)),
        }
    }

    /// Schema tag of the symmetry.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Rotational => 0,
            Self::Horizontal => 1,
            Self::Vertical => 2,
        }
    }

    /// Maps a cell onto its symmetric counterpart.
    ///
    /// The cell must lie inside `dimension`; the result then does too.
    #[must_use]
    pub fn mirror(self, dimension: &Dimension, cell: CellCoord) -> CellCoord {
        let last_x = dimension.width().saturating_sub(1);
        let last_y = dimension.height().saturating_sub(1);
        let flipped_x = last_x.saturating_sub(cell.x());
        let flipped_y = last_y.saturating_sub(cell.y());
        match self {
            Self::Rotational => CellCoord::new(flipped_x, flipped_y),
            Self::Horizontal => CellCoord::new(cell.x(), flipped_y),
            Self::Vertical => CellCoord::new(flipped_x, cell.y()),
        }
    }
}

/// Resource produced by a well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Adamantium (id 1).
    Adamantium,
    /// Mana (id 2).
    Mana,
    /// Elixir (id 3).
    Elixir,
}

impl ResourceKind {
    /// Every resource kind in id order.
    pub const ALL: [ResourceKind; 3] = [Self::Adamantium, Self::Mana, Self::Elixir];

    /// Resolves a resource from its layer value; 0 means no resource.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Adamantium),
            2 => Some(Self::Mana),
            3 => Some(Self::Elixir),
            _ => None,
        }
    }

    /// Layer value stored in the resource grid.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Adamantium => 1,
            Self::Mana => 2,
            Self::Elixir => 3,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adamantium => "Adamantium",
            Self::Mana => "Mana",
            Self::Elixir => "Elixir",
        }
    }
}

/// Compass heading of a current; layer value 0 means no current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Toward decreasing rows.
    North,
    /// Diagonal north-east.
    NorthEast,
    /// Toward increasing columns.
    East,
    /// Diagonal south-east.
    SouthEast,
    /// Toward increasing rows.
    South,
    /// Diagonal south-west.
    SouthWest,
    /// Toward decreasing columns.
    West,
    /// Diagonal north-west.
    NorthWest,
}

impl Heading {
    /// Every heading in layer-value order.
    pub const ALL: [Heading; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Resolves a heading from its layer value.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        let index = usize::from(id.checked_sub(1)?);
        Self::ALL.get(index).copied()
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::NorthEast => "North-East",
            Self::East => "East",
            Self::SouthEast => "South-East",
            Self::South => "South",
            Self::SouthWest => "South-West",
            Self::West => "West",
            Self::NorthWest => "North-West",
        }
    }

    /// Layer value stored in the currents grid (1..=8).
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::North => 1,
            Self::NorthEast => 2,
            Self::East => 3,
            Self::SouthEast => 4,
            Self::South => 5,
            Self::SouthWest => 6,
            Self::West => 7,
            Self::NorthWest => 8,
        }
    }
}

/// Encodes a team's paint for the paint layers.
///
/// `secondary` selects the team's secondary pattern. 0 is reserved for
/// unpainted cells.
#[must_use]
pub const fn paint_value(team: Team, secondary: bool) -> u8 {
    team.index() * 2 + 1 + if secondary { 1 } else { 0 }
}

/// Decodes the team that owns a paint value, if any.
#[must_use]
pub const fn paint_team(value: u8) -> Option<Team> {
    match value {
        1 | 2 => Some(Team::A),
        3 | 4 => Some(Team::B),
        _ => None,
    }
}

/// Events broadcast by the world after applying a round record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A resource well's stats were overwritten.
    WellUpdated {
        /// Linear index of the well cell.
        index: usize,
        /// Whether the well is upgraded after the update.
        upgraded: bool,
    },
    /// An island changed hands.
    IslandOwnerChanged {
        /// Island identifier.
        island: u32,
        /// Owner before the round (0 = neutral).
        previous_owner: u8,
        /// Owner after the round (0 = neutral).
        owner: u8,
    },
    /// A body appeared.
    EntitySpawned {
        /// Identifier of the body.
        id: EntityId,
        /// Kind of body.
        kind: EntityKind,
        /// Owning team.
        team: Team,
        /// Cell the body occupies.
        cell: CellCoord,
    },
    /// A body was destroyed.
    EntityRemoved {
        /// Identifier of the body.
        id: EntityId,
        /// Cell the body occupied.
        cell: CellCoord,
    },
    /// A cell's dynamic paint changed.
    CellPainted {
        /// Linear index of the cell.
        index: usize,
        /// Paint value after the change.
        value: u8,
    },
    /// Every change of a round has been applied.
    RoundApplied {
        /// Sequence number of the applied round.
        number: u32,
    },
}

/// Errors raised by the spatial grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// The linear index does not address a cell.
    #[error("cell index {index} is outside a grid of {len} cells")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of cells in the grid.
        len: usize,
    },
    /// The maximum corner lies before the minimum corner.
    #[error("max corner {max:?} precedes min corner {min:?}")]
    InvertedCorners {
        /// Minimum corner supplied.
        min: CellCoord,
        /// Maximum corner supplied.
        max: CellCoord,
    },
    /// The symmetry tag is not one of the supported transforms.
    #[error("symmetry tag {0} is not one of 0, 1 or 2")]
    InvalidSymmetry(u8),
}

/// Errors raised while assembling a round record from decoder columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A parallel column differs in length from its group.
    #[error("column `{column}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending column.
        column: &'static str,
        /// Length of the group's leading column.
        expected: usize,
        /// Length of the offending column.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn round_record_round_trips_through_bincode() {
        let mut round = Round::new(9);
        round.spawned.push(SpawnedBody {
            id: EntityId::new(3),
            x: 4,
            y: 5,
            team: Team::B,
            kind: EntityKind::Mopper,
        });
        round.painted.push(PaintDelta { index: 7, value: 3 });
        assert_round_trip(&round);
    }

    #[test]
    fn relative_team_is_base_xor_side() {
        assert_eq!(Team::relative(0, 0), Team::A);
        assert_eq!(Team::relative(0, 1), Team::B);
        assert_eq!(Team::relative(1, 0), Team::B);
        assert_eq!(Team::relative(1, 1), Team::A);
    }

    #[test]
    fn symmetry_tags_outside_range_are_rejected() {
        assert_eq!(Symmetry::from_tag(1), Ok(Symmetry::Horizontal));
        assert_eq!(Symmetry::from_tag(3), Err(GridError::InvalidSymmetry(3)));
    }

    #[test]
    fn mirror_points_follow_each_transform() {
        let dimension = Dimension::from_size(10, 8);
        let cell = CellCoord::new(2, 1);
        assert_eq!(
            Symmetry::Rotational.mirror(&dimension, cell),
            CellCoord::new(7, 6)
        );
        assert_eq!(
            Symmetry::Horizontal.mirror(&dimension, cell),
            CellCoord::new(2, 6)
        );
        assert_eq!(
            Symmetry::Vertical.mirror(&dimension, cell),
            CellCoord::new(7, 1)
        );
    }

    #[test]
    fn mirroring_twice_is_identity() {
        let dimension = Dimension::from_size(9, 6);
        for symmetry in [Symmetry::Rotational, Symmetry::Horizontal, Symmetry::Vertical] {
            let cell = CellCoord::new(3, 4);
            let back = symmetry.mirror(&dimension, symmetry.mirror(&dimension, cell));
            assert_eq!(back, cell, "{symmetry:?} is not an involution");
        }
    }

    #[test]
    fn paint_values_encode_team_and_pattern() {
        assert_eq!(paint_value(Team::A, false), 1);
        assert_eq!(paint_value(Team::A, true), 2);
        assert_eq!(paint_value(Team::B, false), 3);
        assert_eq!(paint_value(Team::B, true), 4);
        assert_eq!(paint_team(4), Some(Team::B));
        assert_eq!(paint_team(0), None);
    }

    #[test]
    fn heading_ids_are_one_based() {
        assert_eq!(Heading::North.id(), 1);
        assert_eq!(Heading::NorthWest.id(), 8);
        assert_eq!(Heading::from_id(3), Some(Heading::East));
        assert_eq!(Heading::from_id(0), None);
        assert_eq!(Heading::from_id(9), None);
        for heading in Heading::ALL {
            assert_eq!(Heading::from_id(heading.id()), Some(heading));
        }
    }

    #[test]
    fn entity_kind_schema_ids_round_trip() {
        for id in 1..=6 {
            let kind = EntityKind::from_schema_id(id).expect("known robot type");
            assert_eq!(kind.schema_id(), id);
        }
        assert!(EntityKind::MoneyTower.is_tower());
        assert!(!EntityKind::Soldier.is_tower());
    }
}
