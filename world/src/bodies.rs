//! Registry of live bodies indexed by id and by cell.

use std::collections::BTreeMap;

use mapwright_core::{CellCoord, Dimension, EntityId, EntityKind, GridError, Team};

/// Body occupying a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Kind of body.
    pub kind: EntityKind,
    /// Owning team.
    pub team: Team,
    /// Occupied cell.
    pub cell: CellCoord,
}

/// Failures raised by the entity registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Another live body already holds the cell.
    #[error("cell {cell:?} is already occupied by body {occupant:?}")]
    OccupiedCell {
        /// Requested cell.
        cell: CellCoord,
        /// Body holding the cell.
        occupant: EntityId,
    },
    /// No live body has the identifier.
    #[error("no live body with id {0:?}")]
    NotFound(EntityId),
    /// A live body already uses the identifier.
    #[error("body id {0:?} is already in use")]
    DuplicateId(EntityId),
    /// The body's cell lies outside the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Bodies keyed by id with a dense occupancy grid for cell lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRegistry {
    dimension: Dimension,
    entries: BTreeMap<EntityId, Entity>,
    occupancy: Vec<Option<EntityId>>,
    next_id: u32,
}

impl EntityRegistry {
    /// Creates an empty registry covering the provided grid.
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            occupancy: vec![None; dimension.cell_count()],
            dimension,
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Allocates a fresh identifier. Identifiers are never reused.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Places a body on its cell.
    pub fn spawn(&mut self, entity: Entity) -> Result<(), RegistryError> {
        let index = self.dimension.index_of(entity.cell)?;
        if self.entries.contains_key(&entity.id) {
            return Err(RegistryError::DuplicateId(entity.id));
        }
        if let Some(occupant) = self.occupancy.get(index).copied().flatten() {
            return Err(RegistryError::OccupiedCell {
                cell: entity.cell,
                occupant,
            });
        }

        if entity.id.get() >= self.next_id {
            self.next_id = entity.id.get().saturating_add(1);
        }
        if let Some(slot) = self.occupancy.get_mut(index) {
            *slot = Some(entity.id);
        }
        let _ = self.entries.insert(entity.id, entity);
        Ok(())
    }

    /// Removes a live body and frees its cell.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, RegistryError> {
        let entity = self
            .entries
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if let Ok(index) = self.dimension.index_of(entity.cell) {
            if let Some(slot) = self.occupancy.get_mut(index) {
                *slot = None;
            }
        }
        Ok(entity)
    }

    /// Body occupying the cell, if any.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> Option<&Entity> {
        let index = self.dimension.index_of(cell).ok()?;
        let id = self.occupancy.get(index).copied().flatten()?;
        self.entries.get(&id)
    }

    /// Body with the identifier, if alive.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    /// Live bodies in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entries.values()
    }

    /// Number of live bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no body is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
