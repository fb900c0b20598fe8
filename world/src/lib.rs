#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Mapwright.
//!
//! A [`World`] pairs the [`MatchState`] layered over shared terrain with the
//! [`EntityRegistry`] of live bodies. Replay drives it forward through
//! [`apply`]; the map editor mutates it through the unique-owner accessors;
//! everyone else reads it through [`query`].

use std::{collections::BTreeSet, sync::Arc};

use mapwright_core::{CellCoord, EntityId, Event, GridError, Round};

mod bodies;
mod match_state;
mod terrain;

pub use bodies::{Entity, EntityRegistry, RegistryError};
pub use match_state::{IslandStats, MatchState, ResourceSlot, StreamError, WellStats};
pub use terrain::{MapError, MapHeader, StaticMap};

/// Failures raised while building or mutating a world.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The map header could not be turned into terrain.
    #[error("invalid map: {0}")]
    InvalidMap(#[from] MapError),
    /// A coordinate or index left the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The entity registry refused the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A round record disagrees with the tracked state.
    #[error("inconsistent round stream: {0}")]
    Stream(#[from] StreamError),
    /// Terrain mutation was attempted while another snapshot shares it.
    #[error("terrain is shared with another snapshot")]
    SharedTerrain,
}

/// Complete state of a match at one point in its timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    state: MatchState,
    bodies: EntityRegistry,
    rounds_applied: u32,
}

impl World {
    /// Creates a world over freshly owned terrain.
    #[must_use]
    pub fn new(terrain: StaticMap) -> Self {
        Self::with_shared_terrain(Arc::new(terrain))
    }

    /// Creates a world over terrain that may already be shared.
    #[must_use]
    pub fn with_shared_terrain(terrain: Arc<StaticMap>) -> Self {
        let bodies = EntityRegistry::new(*terrain.dimension());
        Self {
            state: MatchState::new(terrain),
            bodies,
            rounds_applied: 0,
        }
    }

    /// Validates a decoded map header and creates a world over it.
    pub fn from_header(header: MapHeader) -> Result<Self, WorldError> {
        Ok(Self::new(StaticMap::from_header(header)?))
    }

    /// Produces an independent snapshot that shares the terrain.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            state: self.state.copy(),
            bodies: self.bodies.clone(),
            rounds_applied: self.rounds_applied,
        }
    }

    /// Mutable dynamic state for editing tools.
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    /// Mutable entity registry for editing tools.
    pub fn bodies_mut(&mut self) -> &mut EntityRegistry {
        &mut self.bodies
    }

    fn check_bodies(&self, round: &Round) -> Result<(), WorldError> {
        let dimension = self.state.terrain().dimension();
        let mut spawned_ids: BTreeSet<EntityId> = BTreeSet::new();
        let mut claimed_cells: BTreeSet<CellCoord> = BTreeSet::new();

        for body in &round.spawned {
            let cell = CellCoord::new(body.x, body.y);
            let _ = dimension.index_of(cell)?;
            if self.bodies.get(body.id).is_some() || !spawned_ids.insert(body.id) {
                return Err(StreamError::DuplicateBody { id: body.id.get() }.into());
            }
            if self.bodies.at(cell).is_some() || !claimed_cells.insert(cell) {
                return Err(StreamError::SpawnOnOccupiedCell { id: body.id.get() }.into());
            }
        }

        let mut dead: BTreeSet<EntityId> = BTreeSet::new();
        for id in &round.died {
            let alive = self.bodies.get(*id).is_some() || spawned_ids.contains(id);
            if !alive || !dead.insert(*id) {
                return Err(StreamError::UnknownBody { id: id.get() }.into());
            }
        }

        for paint in &round.painted {
            dimension.check_index(paint.index as usize)?;
        }
        Ok(())
    }
}

/// Applies a decoded round record to the world.
///
/// Wells and islands are updated first, then spawns, deaths and paint
/// actions in record order. The whole record is checked before anything is
/// written; an inconsistent record is fatal and leaves the world as it was.
pub fn apply(world: &mut World, round: &Round, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
    if let Err(error) = world.check_bodies(round) {
        tracing::warn!(
            target: "mapwright::world",
            round = round.number,
            error = %error,
            "round.rejected"
        );
        return Err(error);
    }
    if let Err(error) = world.state.apply_delta(round, out_events) {
        tracing::warn!(
            target: "mapwright::world",
            round = round.number,
            error = %error,
            "round.rejected"
        );
        return Err(error.into());
    }

    for body in &round.spawned {
        let entity = Entity {
            id: body.id,
            kind: body.kind,
            team: body.team,
            cell: CellCoord::new(body.x, body.y),
        };
        world.bodies.spawn(entity)?;
        out_events.push(Event::EntitySpawned {
            id: entity.id,
            kind: entity.kind,
            team: entity.team,
            cell: entity.cell,
        });
    }

    for id in &round.died {
        let entity = world.bodies.remove(*id)?;
        out_events.push(Event::EntityRemoved {
            id: entity.id,
            cell: entity.cell,
        });
    }

    for paint in &round.painted {
        let index = paint.index as usize;
        let _ = world.state.paint_cell(index, paint.value)?;
        out_events.push(Event::CellPainted {
            index,
            value: paint.value,
        });
    }

    world.rounds_applied = world.rounds_applied.saturating_add(1);
    out_events.push(Event::RoundApplied {
        number: round.number,
    });

    tracing::debug!(
        target: "mapwright::world",
        round = round.number,
        spawned = round.spawned.len(),
        died = round.died.len(),
        painted = round.painted.len(),
        "round.applied"
    );
    Ok(())
}

/// Read-only queries that expose snapshots of the world state.
pub mod query {
    use std::{collections::BTreeMap, sync::Arc};

    use mapwright_core::{paint_team, CellCoord, Dimension, Team};

    use super::{Entity, IslandStats, StaticMap, WellStats, World};

    /// Terrain the world is layered over.
    #[must_use]
    pub fn terrain(world: &World) -> &Arc<StaticMap> {
        world.state.terrain()
    }

    /// Extent of the world's grid.
    #[must_use]
    pub fn dimension(world: &World) -> &Dimension {
        world.state.terrain().dimension()
    }

    /// Current dynamic paint layer.
    #[must_use]
    pub fn paint(world: &World) -> &[u8] {
        world.state.paint()
    }

    /// Current dynamic resource layer.
    #[must_use]
    pub fn resources(world: &World) -> &[u8] {
        world.state.resources()
    }

    /// Tracked resource wells keyed by cell index.
    #[must_use]
    pub fn wells(world: &World) -> &BTreeMap<usize, WellStats> {
        world.state.wells()
    }

    /// Tracked islands keyed by island id.
    #[must_use]
    pub fn islands(world: &World) -> &BTreeMap<u32, IslandStats> {
        world.state.islands()
    }

    /// Body occupying the cell, if any.
    #[must_use]
    pub fn entity_at(world: &World, cell: CellCoord) -> Option<&Entity> {
        world.bodies.at(cell)
    }

    /// Live bodies in ascending id order.
    pub fn entities(world: &World) -> impl Iterator<Item = &Entity> + '_ {
        world.bodies.iter()
    }

    /// Number of rounds applied since the world was created.
    #[must_use]
    pub fn rounds_applied(world: &World) -> u32 {
        world.rounds_applied
    }

    /// Aggregate counts describing the world, indexed by team where relevant.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WorldSummary {
        /// Grid width.
        pub width: u32,
        /// Grid height.
        pub height: u32,
        /// Rounds applied so far.
        pub rounds_applied: u32,
        /// Live bodies per team.
        pub bodies: [usize; 2],
        /// Live towers per team.
        pub towers: [usize; 2],
        /// Painted cells per team.
        pub painted_cells: [usize; 2],
        /// Islands owned per team.
        pub islands_owned: [usize; 2],
        /// Tracked resource wells.
        pub wells: usize,
        /// Wells that have been accelerated.
        pub upgraded_wells: usize,
    }

    /// Summarises the world for adapters.
    #[must_use]
    pub fn summary(world: &World) -> WorldSummary {
        let dimension = dimension(world);
        let mut summary = WorldSummary {
            width: dimension.width(),
            height: dimension.height(),
            rounds_applied: world.rounds_applied,
            wells: world.state.wells().len(),
            upgraded_wells: world
                .state
                .wells()
                .values()
                .filter(|stats| stats.upgraded)
                .count(),
            ..WorldSummary::default()
        };

        for entity in world.bodies.iter() {
            let team = usize::from(entity.team.index());
            summary.bodies[team] += 1;
            if entity.kind.is_tower() {
                summary.towers[team] += 1;
            }
        }
        for team in world.state.paint().iter().filter_map(|value| paint_team(*value)) {
            summary.painted_cells[usize::from(team.index())] += 1;
        }
        for stats in world.state.islands().values() {
            let owner = stats.owner.checked_sub(1).and_then(Team::from_index);
            if let Some(team) = owner {
                summary.islands_owned[usize::from(team.index())] += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapwright_core::{EntityKind, IslandDelta, PaintDelta, SpawnedBody, Symmetry, Team};

    fn world() -> World {
        let mut header = StaticMap::blank(6, 6, Symmetry::Rotational).to_header();
        header.resources[7] = 2;
        header.islands[20] = 1;
        World::from_header(header).expect("valid header")
    }

    fn spawn(id: u32, x: u32, y: u32, kind: EntityKind) -> SpawnedBody {
        SpawnedBody {
            id: EntityId::new(id),
            x,
            y,
            team: Team::B,
            kind,
        }
    }

    #[test]
    fn apply_emits_events_in_order() {
        let mut world = world();
        let mut round = Round::new(4);
        round.islands.push(IslandDelta {
            island: 1,
            owner: 2,
            turnover: 1,
        });
        round.spawned.push(spawn(5, 2, 3, EntityKind::Soldier));
        round.painted.push(PaintDelta { index: 8, value: 3 });
        let mut events = Vec::new();

        apply(&mut world, &round, &mut events).expect("consistent round");

        assert_eq!(
            events,
            vec![
                Event::IslandOwnerChanged {
                    island: 1,
                    previous_owner: 0,
                    owner: 2,
                },
                Event::EntitySpawned {
                    id: EntityId::new(5),
                    kind: EntityKind::Soldier,
                    team: Team::B,
                    cell: CellCoord::new(2, 3),
                },
                Event::CellPainted { index: 8, value: 3 },
                Event::RoundApplied { number: 4 },
            ]
        );
        assert_eq!(query::rounds_applied(&world), 1);
        assert_eq!(query::paint(&world)[8], 3);
    }

    #[test]
    fn deaths_free_cells_and_report_position() {
        let mut world = world();
        let mut round = Round::new(1);
        round.spawned.push(spawn(2, 1, 1, EntityKind::Mopper));
        apply(&mut world, &round, &mut Vec::new()).expect("consistent round");

        let mut round = Round::new(2);
        round.died.push(EntityId::new(2));
        let mut events = Vec::new();
        apply(&mut world, &round, &mut events).expect("consistent round");

        assert_eq!(
            events[0],
            Event::EntityRemoved {
                id: EntityId::new(2),
                cell: CellCoord::new(1, 1),
            }
        );
        assert!(query::entity_at(&world, CellCoord::new(1, 1)).is_none());
    }

    #[test]
    fn spawn_onto_occupied_cell_is_fatal() {
        let mut world = world();
        let mut round = Round::new(1);
        round.spawned.push(spawn(1, 0, 0, EntityKind::Soldier));
        round.spawned.push(spawn(2, 0, 0, EntityKind::Splasher));

        assert_eq!(
            apply(&mut world, &round, &mut Vec::new()),
            Err(WorldError::Stream(StreamError::SpawnOnOccupiedCell { id: 2 }))
        );
        assert_eq!(query::entities(&world).count(), 0);
    }

    #[test]
    fn unknown_death_is_fatal_and_nothing_is_written() {
        let mut world = world();
        let before = world.copy();
        let mut round = Round::new(1);
        round.painted.push(PaintDelta { index: 0, value: 1 });
        round.died.push(EntityId::new(40));

        assert_eq!(
            apply(&mut world, &round, &mut Vec::new()),
            Err(WorldError::Stream(StreamError::UnknownBody { id: 40 }))
        );
        assert_eq!(world, before);
    }

    #[test]
    fn unknown_well_index_is_fatal() {
        let mut world = world();
        let mut round = Round::new(1);
        round.wells.push(mapwright_core::WellDelta {
            index: 8,
            resource: 1,
            adamantium: 0,
            mana: 0,
            elixir: 0,
            acceleration: 0,
        });
        assert_eq!(
            apply(&mut world, &round, &mut Vec::new()),
            Err(WorldError::Stream(StreamError::UntrackedWell { index: 8 }))
        );
    }

    #[test]
    fn invalid_symmetry_is_an_invalid_map() {
        let mut header = StaticMap::blank(4, 4, Symmetry::Rotational).to_header();
        header.symmetry = 5;
        assert_eq!(
            World::from_header(header),
            Err(WorldError::InvalidMap(MapError::Geometry(
                GridError::InvalidSymmetry(5)
            )))
        );
    }

    #[test]
    fn summary_counts_per_team() {
        let mut world = world();
        let mut round = Round::new(1);
        round.spawned.push(spawn(1, 0, 0, EntityKind::MoneyTower));
        round.spawned.push(spawn(2, 1, 0, EntityKind::Soldier));
        round.painted.push(PaintDelta { index: 5, value: 2 });
        round.islands.push(IslandDelta {
            island: 1,
            owner: 1,
            turnover: 0,
        });
        apply(&mut world, &round, &mut Vec::new()).expect("consistent round");

        let summary = query::summary(&world);
        assert_eq!(summary.width, 6);
        assert_eq!(summary.bodies, [0, 2]);
        assert_eq!(summary.towers, [0, 1]);
        assert_eq!(summary.painted_cells, [1, 0]);
        assert_eq!(summary.islands_owned, [1, 0]);
        assert_eq!(summary.wells, 1);
    }
}
