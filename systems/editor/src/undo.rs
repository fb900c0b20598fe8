//! Inverse values returned by brushes.

use mapwright_core::{CellCoord, EntityId};
use mapwright_world::{Entity, ResourceSlot, World, WorldError};

use crate::EditError;

/// Previous content of one cell layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellValue {
    /// Wall flag.
    Wall(bool),
    /// Cloud flag.
    Cloud(bool),
    /// Current heading (0 = none).
    Current(u8),
    /// Dynamic and terrain resource together with the well it carried.
    Resource(ResourceSlot),
    /// Dynamic and initial paint.
    Paint {
        /// Dynamic paint value.
        paint: u8,
        /// Initial paint value stored in the terrain.
        initial: u8,
    },
}

/// Cell index paired with the value to put back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRestore {
    /// Linear cell index.
    pub index: usize,
    /// Value held before the edit.
    pub value: CellValue,
}

/// Explicit inverse of one brush application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoRecord {
    /// Restores the listed cells, last change first.
    Cells(Vec<CellRestore>),
    /// Removes a ruin that the edit added.
    RemoveRuin(CellCoord),
    /// Puts back a ruin that the edit removed.
    RestoreRuin {
        /// Ruin location.
        cell: CellCoord,
        /// Position the ruin held in the ruin list.
        position: usize,
    },
    /// Removes a body that the edit spawned.
    RemoveEntity(EntityId),
    /// Respawns a body that the edit removed, with its original id.
    RestoreEntity(Entity),
    /// Reverts nested records, last first.
    Batch(Vec<UndoRecord>),
}

impl UndoRecord {
    /// Combines per-point records, returning `None` when nothing changed.
    pub(crate) fn combine(mut records: Vec<UndoRecord>) -> Option<Self> {
        match records.len() {
            0 => None,
            1 => records.pop(),
            _ => Some(Self::Batch(records)),
        }
    }

    /// Puts the world back the way it was before the edit.
    pub fn revert(self, world: &mut World) -> Result<(), EditError> {
        match self {
            Self::Cells(cells) => {
                for restore in cells.into_iter().rev() {
                    restore_cell(world, restore)?;
                }
            }
            Self::RemoveRuin(cell) => {
                if world.state_mut().terrain_mut()?.remove_ruin(cell).is_none() {
                    tracing::warn!(
                        target: "mapwright::editor",
                        x = cell.x(),
                        y = cell.y(),
                        "undo.ruin_missing"
                    );
                }
            }
            Self::RestoreRuin { cell, position } => {
                world.state_mut().terrain_mut()?.insert_ruin(position, cell)?;
            }
            Self::RemoveEntity(id) => {
                let _ = world.bodies_mut().remove(id).map_err(WorldError::from)?;
            }
            Self::RestoreEntity(entity) => {
                world.bodies_mut().spawn(entity).map_err(WorldError::from)?;
            }
            Self::Batch(records) => {
                for record in records.into_iter().rev() {
                    record.revert(world)?;
                }
            }
        }
        Ok(())
    }
}

fn restore_cell(world: &mut World, restore: CellRestore) -> Result<(), EditError> {
    let index = restore.index;
    let state = world.state_mut();
    match restore.value {
        CellValue::Wall(wall) => {
            let _ = state.terrain_mut()?.set_wall(index, wall)?;
        }
        CellValue::Cloud(cloud) => {
            let _ = state.terrain_mut()?.set_cloud(index, cloud)?;
        }
        CellValue::Current(heading) => {
            let _ = state.terrain_mut()?.set_current(index, heading)?;
        }
        CellValue::Resource(slot) => {
            let _ = state.restore_resource(index, slot)?;
        }
        CellValue::Paint { paint, initial } => {
            let _ = state.restore_paint(index, paint, initial)?;
        }
    }
    Ok(())
}
