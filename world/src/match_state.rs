//! Per-round dynamic state layered over shared terrain.

use std::{collections::BTreeMap, sync::Arc};

use mapwright_core::{Event, GridError, Round};

use crate::{
    terrain::{replace_cell, StaticMap},
    WorldError,
};

/// Accumulated output of a resource well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WellStats {
    /// Adamantium collected so far.
    pub adamantium: i32,
    /// Mana collected so far.
    pub mana: i32,
    /// Elixir collected so far.
    pub elixir: i32,
    /// Whether the well has been accelerated.
    pub upgraded: bool,
}

/// Everything a resource edit touches on one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceSlot {
    /// Resource in the dynamic layer (0 = none).
    pub resource: u8,
    /// Resource stored in the terrain (0 = none).
    pub initial: u8,
    /// Well stats tracked for the cell.
    pub well: Option<WellStats>,
}

/// Ownership state of an island.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IslandStats {
    /// Owning team index plus one; 0 means neutral.
    pub owner: u8,
    /// Turns of flip progress held by the owner.
    pub flip_progress: i32,
    /// Cell indices belonging to the island, ascending.
    pub cells: Vec<usize>,
    /// Whether the island is accelerated. Cleared whenever the owner changes.
    pub accelerated: bool,
}

/// Inconsistencies between a round record and the tracked state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// A well entry names a cell that never held a resource.
    #[error("round references untracked resource well at cell {index}")]
    UntrackedWell {
        /// Linear cell index from the record.
        index: u32,
    },
    /// An island entry names an id with no cells on the map.
    #[error("round references untracked island {island}")]
    UntrackedIsland {
        /// Island id from the record.
        island: u32,
    },
    /// A body was spawned onto a cell that already holds one.
    #[error("round spawns body {id} onto an occupied cell")]
    SpawnOnOccupiedCell {
        /// Numeric id of the spawned body.
        id: u32,
    },
    /// A body was spawned with an id that is already alive.
    #[error("round spawns body {id} twice")]
    DuplicateBody {
        /// Numeric id of the spawned body.
        id: u32,
    },
    /// A body that is not alive was reported dead.
    #[error("round removes unknown body {id}")]
    UnknownBody {
        /// Numeric id from the record.
        id: u32,
    },
}

/// Snapshot-able dynamic state of a match.
///
/// Cloning is cheap relative to the map: the terrain is shared through an
/// [`Arc`] and only the per-cell dynamic layers and stat tables are copied.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchState {
    terrain: Arc<StaticMap>,
    resources: Vec<u8>,
    paint: Vec<u8>,
    wells: BTreeMap<usize, WellStats>,
    islands: BTreeMap<u32, IslandStats>,
}

impl MatchState {
    /// Initialises dynamic state from terrain.
    ///
    /// Every resource cell becomes a tracked well with zeroed stats and every
    /// island id becomes a neutral island.
    #[must_use]
    pub fn new(terrain: Arc<StaticMap>) -> Self {
        let wells = terrain
            .resources()
            .iter()
            .enumerate()
            .filter(|(_, resource)| **resource != 0)
            .map(|(index, _)| (index, WellStats::default()))
            .collect();
        let islands = terrain
            .island_cells()
            .into_iter()
            .map(|(island, cells)| {
                (
                    island,
                    IslandStats {
                        cells,
                        ..IslandStats::default()
                    },
                )
            })
            .collect();

        Self {
            resources: terrain.resources().to_vec(),
            paint: terrain.initial_paint().to_vec(),
            terrain,
            wells,
            islands,
        }
    }

    /// Produces an independent snapshot that shares the terrain.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Applies the well and island entries of a round.
    ///
    /// The record is checked against the tracked wells and islands before
    /// anything is written, so a rejected record leaves the state untouched.
    pub fn apply_delta(
        &mut self,
        round: &Round,
        out_events: &mut Vec<Event>,
    ) -> Result<(), StreamError> {
        if let Some(well) = round
            .wells
            .iter()
            .find(|well| !self.wells.contains_key(&(well.index as usize)))
        {
            return Err(StreamError::UntrackedWell { index: well.index });
        }
        if let Some(entry) = round
            .islands
            .iter()
            .find(|entry| !self.islands.contains_key(&entry.island))
        {
            return Err(StreamError::UntrackedIsland {
                island: entry.island,
            });
        }

        for well in &round.wells {
            let index = well.index as usize;
            if let Some(resource) = self.resources.get_mut(index) {
                *resource = well.resource;
            }
            if let Some(stats) = self.wells.get_mut(&index) {
                *stats = WellStats {
                    adamantium: well.adamantium,
                    mana: well.mana,
                    elixir: well.elixir,
                    upgraded: well.acceleration > 0,
                };
                out_events.push(Event::WellUpdated {
                    index,
                    upgraded: stats.upgraded,
                });
            }
        }

        for entry in &round.islands {
            if let Some(stats) = self.islands.get_mut(&entry.island) {
                stats.flip_progress = entry.turnover;
                if stats.owner != entry.owner {
                    stats.accelerated = false;
                    out_events.push(Event::IslandOwnerChanged {
                        island: entry.island,
                        previous_owner: stats.owner,
                        owner: entry.owner,
                    });
                }
                stats.owner = entry.owner;
            }
        }

        tracing::trace!(
            target: "mapwright::match_state",
            round = round.number,
            wells = round.wells.len(),
            islands = round.islands.len(),
            "delta.applied"
        );
        Ok(())
    }

    /// Shared terrain the state is layered over.
    #[must_use]
    pub fn terrain(&self) -> &Arc<StaticMap> {
        &self.terrain
    }

    /// Mutable terrain access for the editor.
    ///
    /// Fails with [`WorldError::SharedTerrain`] while any other snapshot
    /// holds the same terrain.
    pub fn terrain_mut(&mut self) -> Result<&mut StaticMap, WorldError> {
        Arc::get_mut(&mut self.terrain).ok_or(WorldError::SharedTerrain)
    }

    /// Current resource layer.
    #[must_use]
    pub fn resources(&self) -> &[u8] {
        &self.resources
    }

    /// Current paint layer.
    #[must_use]
    pub fn paint(&self) -> &[u8] {
        &self.paint
    }

    /// Paint value of a single cell; 0 when unpainted or off the grid.
    #[must_use]
    pub fn paint_at(&self, index: usize) -> u8 {
        self.paint.get(index).copied().unwrap_or(0)
    }

    /// Tracked wells keyed by cell index.
    #[must_use]
    pub fn wells(&self) -> &BTreeMap<usize, WellStats> {
        &self.wells
    }

    /// Tracked islands keyed by island id.
    #[must_use]
    pub fn islands(&self) -> &BTreeMap<u32, IslandStats> {
        &self.islands
    }

    /// Replay paint: writes the dynamic layer only, returning the previous value.
    pub fn paint_cell(&mut self, index: usize, value: u8) -> Result<u8, GridError> {
        replace_cell(&mut self.paint, index, value)
    }

    /// Editor paint: writes both the dynamic layer and the terrain's initial
    /// paint, returning the previous `(dynamic, initial)` pair.
    pub fn set_paint(&mut self, index: usize, value: u8) -> Result<(u8, u8), WorldError> {
        self.restore_paint(index, value, value)
    }

    /// Writes the dynamic and initial paint of a cell independently,
    /// returning the previous `(dynamic, initial)` pair.
    pub fn restore_paint(
        &mut self,
        index: usize,
        paint: u8,
        initial: u8,
    ) -> Result<(u8, u8), WorldError> {
        let terrain = Arc::get_mut(&mut self.terrain).ok_or(WorldError::SharedTerrain)?;
        let previous_initial = terrain.set_initial_paint(index, initial)?;
        let previous_paint = replace_cell(&mut self.paint, index, paint)?;
        Ok((previous_paint, previous_initial))
    }

    /// Editor resource placement.
    ///
    /// A nonzero `resource` starts a fresh well with zeroed stats in both the
    /// dynamic layer and the terrain; zero removes the well. Returns what the
    /// cell held so the caller can restore it.
    pub fn set_resource(&mut self, index: usize, resource: u8) -> Result<ResourceSlot, WorldError> {
        self.restore_resource(
            index,
            ResourceSlot {
                resource,
                initial: resource,
                well: (resource != 0).then(WellStats::default),
            },
        )
    }

    /// Writes a cell's dynamic resource, terrain resource and well stats
    /// independently, returning what was there.
    pub fn restore_resource(
        &mut self,
        index: usize,
        slot: ResourceSlot,
    ) -> Result<ResourceSlot, WorldError> {
        let terrain = Arc::get_mut(&mut self.terrain).ok_or(WorldError::SharedTerrain)?;
        let previous_initial = terrain.set_resource(index, slot.initial)?;
        let previous_resource = replace_cell(&mut self.resources, index, slot.resource)?;
        let previous_well = match slot.well {
            Some(stats) => self.wells.insert(index, stats),
            None => self.wells.remove(&index),
        };
        Ok(ResourceSlot {
            resource: previous_resource,
            initial: previous_initial,
            well: previous_well,
        })
    }
}
