#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map-editor brushes that mutate a world and hand back explicit undo records.
//!
//! Every brush is a [`BrushKind`] tag plus a fixed set of typed
//! [`BrushFields`]. Applying a brush either changes the world and returns an
//! [`UndoRecord`] describing exactly what it overwrote, or changes nothing and
//! returns `None`. Illegal placements are not errors; only malformed input and
//! world failures are.

use mapwright_core::{paint_value, CellCoord, EntityKind, GridError, Heading, ResourceKind, Team};
use mapwright_world::{query, Entity, World, WorldError};

mod area;
mod fields;
mod undo;

pub use fields::{BrushField, BrushFields, FieldKind, FieldValue, SelectOption};
pub use undo::{CellRestore, CellValue, UndoRecord};

use area::cells_in_radius;

const SHOULD_ADD: &str = "should_add";
const RESOURCE: &str = "resource";
const DIRECTION: &str = "direction";
const RADIUS: &str = "radius";
const TEAM: &str = "team";
const PAINT_TYPE: &str = "paint_type";
const TOWER_TYPE: &str = "tower_type";

const RUIN_CLEARANCE: u32 = 2;
const RUIN_SPACING: u32 = 4;
const RUIN_WALL_CLEARANCE: u32 = 2;
const RUIN_BORDER_MARGIN: i64 = 2;

/// Failures raised while configuring or applying a brush.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The brush has no field with the requested name.
    #[error("brush has no field named `{field}`")]
    UnknownField {
        /// Requested field name.
        field: String,
    },
    /// The value does not match the field's declared type.
    #[error("field `{field}` holds a {expected} value, not a {actual} value")]
    FieldKind {
        /// Field name.
        field: &'static str,
        /// Declared type.
        expected: FieldKind,
        /// Type of the rejected value.
        actual: FieldKind,
    },
    /// The value has the right type but is outside the allowed set.
    #[error("value {value} is not allowed for field `{field}`")]
    InvalidOption {
        /// Field name.
        field: &'static str,
        /// Rejected raw value.
        value: u32,
    },
    /// The world refused the mutation.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The brush centre or a touched cell left the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Kinds of brush offered by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrushKind {
    /// Places or clears a resource well on one cell.
    Resources,
    /// Toggles a cloud on one cell.
    Clouds,
    /// Sets or clears a current on one cell.
    Currents,
    /// Paints walls in a disc, mirrored.
    Walls,
    /// Places or removes a ruin, mirrored.
    Ruins,
    /// Paints team colour in a disc, mirrored.
    Paint,
    /// Places or removes a tower, mirrored.
    Towers,
}

impl BrushKind {
    /// Display name of the brush.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Resources => "Resources",
            Self::Clouds => "Clouds",
            Self::Currents => "Currents",
            Self::Walls => "Walls",
            Self::Ruins => "Ruins",
            Self::Paint => "Paint",
            Self::Towers => "Towers",
        }
    }

    /// Reports whether the brush also applies at the mirrored cell.
    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        matches!(self, Self::Walls | Self::Ruins | Self::Paint | Self::Towers)
    }

    fn default_fields(self) -> BrushFields {
        let mut fields = vec![BrushField::add_remove(SHOULD_ADD)];
        match self {
            Self::Resources => fields.push(BrushField::single_select(
                RESOURCE,
                "Resource",
                ResourceKind::ALL
                    .iter()
                    .map(|kind| SelectOption {
                        value: kind.id(),
                        label: kind.label(),
                    })
                    .collect(),
            )),
            Self::Clouds | Self::Ruins => {}
            Self::Currents => fields.push(BrushField::single_select(
                DIRECTION,
                "Direction",
                Heading::ALL
                    .iter()
                    .map(|heading| SelectOption {
                        value: heading.id(),
                        label: heading.label(),
                    })
                    .collect(),
            )),
            Self::Walls => fields.push(BrushField::positive_integer(RADIUS, "Radius", 1)),
            Self::Paint => {
                fields.push(BrushField::team(TEAM));
                fields.push(BrushField::positive_integer(RADIUS, "Radius", 1));
                fields.push(BrushField::single_select(
                    PAINT_TYPE,
                    "Paint Type",
                    vec![
                        SelectOption {
                            value: 0,
                            label: "Primary",
                        },
                        SelectOption {
                            value: 1,
                            label: "Secondary",
                        },
                    ],
                ));
            }
            Self::Towers => {
                fields.push(BrushField::team(TEAM));
                fields.push(BrushField::single_select(
                    TOWER_TYPE,
                    "Tower Type",
                    vec![
                        SelectOption {
                            value: EntityKind::PaintTower.schema_id(),
                            label: "Paint Tower",
                        },
                        SelectOption {
                            value: EntityKind::MoneyTower.schema_id(),
                            label: "Money Tower",
                        },
                    ],
                ));
            }
        }
        BrushFields::new(fields)
    }
}

/// Which part of the game the editor is working on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorScope {
    /// Terrain only.
    Terrain,
    /// Terrain plus match setup (resources, paint and towers).
    Match,
}

/// Whether symmetric brushes also edit the mirrored cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// Edit the clicked cell only.
    Off,
    /// Edit the clicked cell and its counterpart under the map's symmetry.
    #[default]
    Symmetric,
}

/// Brushes offered for the scope, in display order.
#[must_use]
pub fn brushes_for(scope: EditorScope) -> Vec<Brush> {
    let mut kinds = vec![
        BrushKind::Walls,
        BrushKind::Clouds,
        BrushKind::Currents,
        BrushKind::Ruins,
    ];
    if scope == EditorScope::Match {
        kinds.extend([BrushKind::Resources, BrushKind::Paint, BrushKind::Towers]);
    }
    kinds.into_iter().map(Brush::new).collect()
}

/// A brush and its current settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Brush {
    kind: BrushKind,
    fields: BrushFields,
}

impl Brush {
    /// Creates a brush with default settings.
    #[must_use]
    pub fn new(kind: BrushKind) -> Self {
        Self {
            kind,
            fields: kind.default_fields(),
        }
    }

    /// Kind of brush.
    #[must_use]
    pub const fn kind(&self) -> BrushKind {
        self.kind
    }

    /// Display name of the brush.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Current settings.
    #[must_use]
    pub fn fields(&self) -> &BrushFields {
        &self.fields
    }

    /// Updates one setting.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), EditError> {
        self.fields.set(name, value)
    }

    /// Applies the brush centred on `center`.
    ///
    /// Symmetric brushes run at the clicked cell as side 0 and, unless
    /// mirroring is off, at its mirror as side 1. A cell that is its own
    /// mirror is edited once. Returns `None` when nothing changed.
    pub fn apply(
        &self,
        world: &mut World,
        center: CellCoord,
        mirroring: Mirroring,
    ) -> Result<Option<UndoRecord>, EditError> {
        let dimension = *query::dimension(world);
        let _ = dimension.index_of(center)?;

        let record = if self.kind.is_symmetric() {
            let mut records = Vec::new();
            records.extend(self.apply_at(world, center, 0)?);
            if mirroring == Mirroring::Symmetric {
                let mirror = query::terrain(world).symmetry().mirror(&dimension, center);
                if mirror != center {
                    records.extend(self.apply_at(world, mirror, 1)?);
                }
            }
            UndoRecord::combine(records)
        } else {
            self.apply_at(world, center, 0)?
        };

        tracing::debug!(
            target: "mapwright::editor",
            brush = self.name(),
            x = center.x(),
            y = center.y(),
            changed = record.is_some(),
            "brush.applied"
        );
        Ok(record)
    }

    fn apply_at(
        &self,
        world: &mut World,
        cell: CellCoord,
        side: u8,
    ) -> Result<Option<UndoRecord>, EditError> {
        let add = self.fields.flag(SHOULD_ADD);
        match self.kind {
            BrushKind::Resources => {
                let resource = if add {
                    self.fields.selected(RESOURCE)
                } else {
                    0
                };
                apply_resource(world, cell, resource)
            }
            BrushKind::Clouds => apply_cloud(world, cell, add),
            BrushKind::Currents => {
                let heading = if add {
                    self.fields.selected(DIRECTION)
                } else {
                    0
                };
                apply_current(world, cell, heading)
            }
            BrushKind::Walls => apply_walls(world, cell, self.fields.integer(RADIUS), add),
            BrushKind::Ruins => {
                if add {
                    add_ruin(world, cell)
                } else {
                    remove_ruin(world, cell)
                }
            }
            BrushKind::Paint => {
                let value = add.then(|| {
                    let team = Team::relative(self.fields.team(TEAM), side);
                    paint_value(team, self.fields.selected(PAINT_TYPE) == 1)
                });
                apply_paint(world, cell, self.fields.integer(RADIUS), value)
            }
            BrushKind::Towers => {
                if add {
                    let team = Team::relative(self.fields.team(TEAM), side);
                    add_tower(world, cell, team, self.fields.selected(TOWER_TYPE))
                } else {
                    remove_tower(world, cell)
                }
            }
        }
    }
}

fn changed_cells(cells: Vec<CellRestore>) -> Option<UndoRecord> {
    if cells.is_empty() {
        None
    } else {
        Some(UndoRecord::Cells(cells))
    }
}

fn apply_resource(
    world: &mut World,
    cell: CellCoord,
    resource: u8,
) -> Result<Option<UndoRecord>, EditError> {
    let index = query::dimension(world).index_of(cell)?;
    if query::resources(world).get(index) == Some(&resource) {
        return Ok(None);
    }
    let previous = world.state_mut().set_resource(index, resource)?;
    Ok(changed_cells(vec![CellRestore {
        index,
        value: CellValue::Resource(previous),
    }]))
}

fn apply_cloud(world: &mut World, cell: CellCoord, cloud: bool) -> Result<Option<UndoRecord>, EditError> {
    let index = query::dimension(world).index_of(cell)?;
    if query::terrain(world).clouds().get(index) == Some(&cloud) {
        return Ok(None);
    }
    let previous = world.state_mut().terrain_mut()?.set_cloud(index, cloud)?;
    Ok(changed_cells(vec![CellRestore {
        index,
        value: CellValue::Cloud(previous),
    }]))
}

fn apply_current(
    world: &mut World,
    cell: CellCoord,
    heading: u8,
) -> Result<Option<UndoRecord>, EditError> {
    let index = query::dimension(world).index_of(cell)?;
    if query::terrain(world).currents().get(index) == Some(&heading) {
        return Ok(None);
    }
    let previous = world.state_mut().terrain_mut()?.set_current(index, heading)?;
    Ok(changed_cells(vec![CellRestore {
        index,
        value: CellValue::Current(previous),
    }]))
}

fn apply_walls(
    world: &mut World,
    cell: CellCoord,
    radius: u32,
    add: bool,
) -> Result<Option<UndoRecord>, EditError> {
    let terrain = query::terrain(world);
    let dimension = *terrain.dimension();
    let targets: Vec<usize> = cells_in_radius(&dimension, cell, radius)
        .into_iter()
        .filter(|index| {
            let wall = terrain.is_wall(*index);
            if !add {
                return wall;
            }
            let near_ruin = dimension
                .to_coord(*index)
                .map_or(true, |position| terrain.ruin_within(position, RUIN_CLEARANCE));
            let painted = terrain.initial_paint().get(*index).map_or(false, |paint| *paint != 0);
            !wall && !near_ruin && !painted
        })
        .collect();
    if targets.is_empty() {
        return Ok(None);
    }

    let terrain = world.state_mut().terrain_mut()?;
    let mut cells = Vec::with_capacity(targets.len());
    for index in targets {
        let previous = terrain.set_wall(index, add)?;
        cells.push(CellRestore {
            index,
            value: CellValue::Wall(previous),
        });
    }
    Ok(changed_cells(cells))
}

fn add_ruin(world: &mut World, cell: CellCoord) -> Result<Option<UndoRecord>, EditError> {
    let terrain = query::terrain(world);
    let dimension = terrain.dimension();
    let index = dimension.index_of(cell)?;
    let (x, y) = (i64::from(cell.x()), i64::from(cell.y()));
    let (width, height) = (i64::from(dimension.width()), i64::from(dimension.height()));
    let near_border = x < RUIN_BORDER_MARGIN
        || x >= width - RUIN_BORDER_MARGIN
        || y < RUIN_BORDER_MARGIN
        || y >= height - RUIN_BORDER_MARGIN;
    let blocked = near_border
        || terrain.ruin_within(cell, RUIN_SPACING)
        || terrain.wall_within(cell, RUIN_WALL_CLEARANCE)
        || terrain.initial_paint().get(index).map_or(false, |paint| *paint != 0);
    if blocked {
        return Ok(None);
    }

    if world.state_mut().terrain_mut()?.add_ruin(cell)? {
        Ok(Some(UndoRecord::RemoveRuin(cell)))
    } else {
        Ok(None)
    }
}

fn remove_ruin(world: &mut World, cell: CellCoord) -> Result<Option<UndoRecord>, EditError> {
    if !query::terrain(world).has_ruin_at(cell) {
        return Ok(None);
    }
    let position = world.state_mut().terrain_mut()?.remove_ruin(cell);
    Ok(position.map(|position| UndoRecord::RestoreRuin { cell, position }))
}

fn apply_paint(
    world: &mut World,
    cell: CellCoord,
    radius: u32,
    value: Option<u8>,
) -> Result<Option<UndoRecord>, EditError> {
    let terrain = query::terrain(world);
    let dimension = *terrain.dimension();
    let paint = query::paint(world);
    let target = value.unwrap_or(0);
    let targets: Vec<usize> = cells_in_radius(&dimension, cell, radius)
        .into_iter()
        .filter(|index| {
            let current = paint.get(*index).copied().unwrap_or(0);
            let initial = terrain.initial_paint().get(*index).copied().unwrap_or(0);
            if current == target && initial == target {
                return false;
            }
            if value.is_none() {
                return true;
            }
            let on_ruin = dimension
                .to_coord(*index)
                .map_or(true, |position| terrain.has_ruin_at(position));
            !on_ruin && !terrain.is_wall(*index)
        })
        .collect();
    if targets.is_empty() {
        return Ok(None);
    }

    let state = world.state_mut();
    let mut cells = Vec::with_capacity(targets.len());
    for index in targets {
        let (paint, initial) = state.set_paint(index, target)?;
        cells.push(CellRestore {
            index,
            value: CellValue::Paint { paint, initial },
        });
    }
    Ok(changed_cells(cells))
}

fn add_tower(
    world: &mut World,
    cell: CellCoord,
    team: Team,
    tower_type: u8,
) -> Result<Option<UndoRecord>, EditError> {
    let kind = EntityKind::from_schema_id(tower_type)
        .filter(|kind| kind.is_tower())
        .ok_or(EditError::InvalidOption {
            field: TOWER_TYPE,
            value: u32::from(tower_type),
        })?;
    let terrain = query::terrain(world);
    let index = terrain.dimension().index_of(cell)?;
    let blocked = query::entity_at(world, cell).is_some()
        || terrain.is_wall(index)
        || terrain.ruin_within(cell, RUIN_CLEARANCE);
    if blocked {
        return Ok(None);
    }

    let bodies = world.bodies_mut();
    let id = bodies.next_id();
    bodies
        .spawn(Entity {
            id,
            kind,
            team,
            cell,
        })
        .map_err(WorldError::from)?;
    Ok(Some(UndoRecord::RemoveEntity(id)))
}

fn remove_tower(world: &mut World, cell: CellCoord) -> Result<Option<UndoRecord>, EditError> {
    let Some(id) = query::entity_at(world, cell).map(|entity| entity.id) else {
        return Ok(None);
    };
    let entity = world.bodies_mut().remove(id).map_err(WorldError::from)?;
    Ok(Some(UndoRecord::RestoreEntity(entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_scope_offers_terrain_brushes_only() {
        let kinds: Vec<BrushKind> = brushes_for(EditorScope::Terrain)
            .iter()
            .map(Brush::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                BrushKind::Walls,
                BrushKind::Clouds,
                BrushKind::Currents,
                BrushKind::Ruins,
            ]
        );
    }

    #[test]
    fn match_scope_adds_resources_paint_and_towers() {
        let kinds: Vec<BrushKind> = brushes_for(EditorScope::Match)
            .iter()
            .map(Brush::kind)
            .collect();
        assert_eq!(kinds.len(), 7);
        for kind in [BrushKind::Resources, BrushKind::Paint, BrushKind::Towers] {
            assert!(kinds.contains(&kind), "{kind:?} missing from match scope");
        }
    }

    #[test]
    fn field_sets_are_fixed_per_brush() {
        let names = |kind: BrushKind| -> Vec<&'static str> {
            Brush::new(kind).fields().iter().map(BrushField::name).collect()
        };
        assert_eq!(names(BrushKind::Clouds), vec![SHOULD_ADD]);
        assert_eq!(names(BrushKind::Currents), vec![SHOULD_ADD, DIRECTION]);
        assert_eq!(
            names(BrushKind::Paint),
            vec![SHOULD_ADD, TEAM, RADIUS, PAINT_TYPE]
        );
        assert_eq!(names(BrushKind::Towers), vec![SHOULD_ADD, TEAM, TOWER_TYPE]);
    }

    #[test]
    fn currents_offer_eight_headings() {
        let brush = Brush::new(BrushKind::Currents);
        let options = brush
            .fields()
            .get(DIRECTION)
            .map(|field| field.options().len());
        assert_eq!(options, Some(8));
    }

    #[test]
    fn only_area_and_point_brushes_mirror() {
        assert!(BrushKind::Walls.is_symmetric());
        assert!(BrushKind::Towers.is_symmetric());
        assert!(!BrushKind::Resources.is_symmetric());
        assert!(!BrushKind::Clouds.is_symmetric());
    }
}
