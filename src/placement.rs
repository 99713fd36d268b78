//! Object placement: catalog, preview and the editing engine on top of
//! [`crate::grid`].

mod catalog;
mod error;
mod instruction;
mod placer;
mod preview;

pub use catalog::{FAVORITE_COUNT, MeshDescriptor, MeshShape, ObjectCatalog};
pub use error::{EditMode, EditOutcome, PlacementError, PlacementNotice};
pub use instruction::BuildInstruction;
pub use placer::ObjectPlacer;
pub use preview::{
    Placement, PreviewFrame, PreviewState, StackMarker, placement_for, rotation_for, stack_markers,
};

use bevy::prelude::*;

use crate::grid::HexDirection;

/// Where a full-height build starts and which way it goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum TowerFill {
    /// From the active level up to the top of the cell.
    #[default]
    Upward,
    /// From the active level down to the ground (or to level 1.5 when
    /// starting on a half level with a full-height item). Starting on the
    /// ground fills upward to the top instead.
    Downward,
}

/// Placement policies.
#[derive(Clone, Debug, Reflect)]
pub struct PlacementSettings {
    /// Allow stacking onto a level that already holds something.
    pub add_to_occupied: bool,
    /// Refuse structures that clash with what a level already holds.
    pub enforce_structure_rules: bool,
    /// Jump the active level above the highest object of a hovered cell.
    pub select_above_highest_occupied: bool,
    /// Keep the preferred level instead of following the terrain.
    pub keep_height_on_uneven_terrain: bool,
    /// Direction of full-height builds.
    pub tower_fill: TowerFill,
    /// Facing of the first object.
    pub initial_direction: HexDirection,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            add_to_occupied: true,
            enforce_structure_rules: false,
            select_above_highest_occupied: false,
            keep_height_on_uneven_terrain: false,
            tower_fill: TowerFill::Upward,
            initial_direction: HexDirection::Right,
        }
    }
}

/// Object pool sizing.
#[derive(Clone, Debug, Reflect)]
pub struct PoolSettings {
    /// Objects allocated up front.
    pub size: usize,
    /// Allocate more when the pool runs dry.
    pub grow: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            size: 20,
            grow: false,
        }
    }
}
