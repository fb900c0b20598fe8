//! Decoded per-round records consumed by the replay engine.
//!
//! The binary schema layer decodes each round of a match stream into the
//! typed values below. Nothing here parses bytes; the records are read-only
//! inputs to the world's `apply` entry point.

use serde::{Deserialize, Serialize};

use crate::{EntityId, EntityKind, RecordError, Team};

/// Resource-well update carried by a round record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WellDelta {
    /// Linear index of the well cell.
    pub index: u32,
    /// Resource type now produced by the well (0 clears the cell).
    pub resource: u8,
    /// Accumulated adamantium.
    pub adamantium: i32,
    /// Accumulated mana.
    pub mana: i32,
    /// Accumulated elixir.
    pub elixir: i32,
    /// Acceleration identifier; any positive value marks the well upgraded.
    pub acceleration: i32,
}

/// Island ownership update carried by a round record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IslandDelta {
    /// Island identifier (never 0).
    pub island: u32,
    /// Owning team index plus one; 0 means neutral.
    pub owner: u8,
    /// Turns of flip progress accumulated by the current owner.
    pub turnover: i32,
}

/// Body created during the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnedBody {
    /// Identifier assigned by the engine.
    pub id: EntityId,
    /// Column the body appeared in.
    pub x: u32,
    /// Row the body appeared in.
    pub y: u32,
    /// Team that owns the body.
    pub team: Team,
    /// Kind of body.
    pub kind: EntityKind,
}

/// Paint change applied to a single cell during the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaintDelta {
    /// Linear index of the painted cell.
    pub index: u32,
    /// Encoded paint value; 0 removes paint.
    pub value: u8,
}

/// One decoded round of the match stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Sequence number of the round within the match.
    pub number: u32,
    /// Resource-well updates.
    #[serde(default)]
    pub wells: Vec<WellDelta>,
    /// Island ownership updates.
    #[serde(default)]
    pub islands: Vec<IslandDelta>,
    /// Bodies that appeared this round.
    #[serde(default)]
    pub spawned: Vec<SpawnedBody>,
    /// Bodies that were destroyed this round.
    #[serde(default)]
    pub died: Vec<EntityId>,
    /// Paint and unpaint actions.
    #[serde(default)]
    pub painted: Vec<PaintDelta>,
}

/// Parallel well columns exactly as exposed by the schema decoder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WellColumns<'a> {
    /// Well cell indices.
    pub locations: &'a [u32],
    /// Resource type identifiers.
    pub resource_ids: &'a [u8],
    /// Adamantium amounts.
    pub adamantium: &'a [i32],
    /// Mana amounts.
    pub mana: &'a [i32],
    /// Elixir amounts.
    pub elixir: &'a [i32],
    /// Acceleration identifiers.
    pub acceleration_ids: &'a [i32],
}

/// Parallel island columns exactly as exposed by the schema decoder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IslandColumns<'a> {
    /// Island identifiers.
    pub ids: &'a [u32],
    /// Ownership values.
    pub ownership: &'a [u8],
    /// Turnover turn counts.
    pub turnover_turns: &'a [i32],
}

impl Round {
    /// Creates an empty round with the provided sequence number.
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Zips the decoder's parallel columns into a round record.
    ///
    /// Every column of a group must have the same length.
    pub fn from_columns(
        number: u32,
        wells: WellColumns<'_>,
        islands: IslandColumns<'_>,
    ) -> Result<Self, RecordError> {
        let well_count = wells.locations.len();
        for (column, len) in [
            ("resource_ids", wells.resource_ids.len()),
            ("adamantium", wells.adamantium.len()),
            ("mana", wells.mana.len()),
            ("elixir", wells.elixir.len()),
            ("acceleration_ids", wells.acceleration_ids.len()),
        ] {
            if len != well_count {
                return Err(RecordError::LengthMismatch {
                    column,
                    expected: well_count,
                    actual: len,
                });
            }
        }

        let island_count = islands.ids.len();
        for (column, len) in [
            ("ownership", islands.ownership.len()),
            ("turnover_turns", islands.turnover_turns.len()),
        ] {
            if len != island_count {
                return Err(RecordError::LengthMismatch {
                    column,
                    expected: island_count,
                    actual: len,
                });
            }
        }

        let wells = (0..well_count)
            .map(|i| WellDelta {
                index: wells.locations[i],
                resource: wells.resource_ids[i],
                adamantium: wells.adamantium[i],
                mana: wells.mana[i],
                elixir: wells.elixir[i],
                acceleration: wells.acceleration_ids[i],
            })
            .collect();
        let islands = (0..island_count)
            .map(|i| IslandDelta {
                island: islands.ids[i],
                owner: islands.ownership[i],
                turnover: islands.turnover_turns[i],
            })
            .collect();

        Ok(Self {
            number,
            wells,
            islands,
            ..Self::default()
        })
    }
}
