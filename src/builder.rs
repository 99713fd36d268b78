//! Editor plugin: owns the placement engine and turns mouse and keyboard
//! input into edits.
//!
//! Systems run in [`BuilderSet`] order each frame: input edits the grid, then
//! the preview is recomputed, then the visuals sync to the result.

mod entities;
mod startup_systems;
mod systems;

pub use entities::{ActiveEditMode, Builder, CursorCell};

use bevy::prelude::*;

use crate::GameState;
use crate::grid::{GridSettings, TerrainSettings};
use crate::placement::{PlacementNotice, PlacementSettings, PoolSettings};

/// Nested configuration for the editor.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct BuilderConfig {
    /// Grid geometry and height rules.
    pub grid: GridSettings,
    /// Object pool sizing.
    pub pool: PoolSettings,
    /// Placement policies.
    pub placement: PlacementSettings,
    /// Terrain the support bases rest on.
    pub terrain: TerrainSettings,
    /// Background clear color.
    pub clear_color: Color,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            pool: PoolSettings::default(),
            placement: PlacementSettings::default(),
            terrain: TerrainSettings::default(),
            clear_color: Color::srgb(0.01, 0.01, 0.02),
        }
    }
}

/// Frame phases of the editor.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuilderSet {
    /// Cursor tracking and edits.
    Input,
    /// Preview recompute and notice forwarding.
    Preview,
    /// Scene entities follow the engine state.
    Sync,
}

/// Hex building editor: grid, pool and catalog at startup, edits at runtime.
pub struct BuilderPlugin(pub BuilderConfig);

impl Plugin for BuilderPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BuilderConfig>()
            .register_type::<CursorCell>()
            .register_type::<ActiveEditMode>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .init_resource::<CursorCell>()
            .init_resource::<ActiveEditMode>()
            .add_message::<PlacementNotice>()
            .configure_sets(
                Update,
                (BuilderSet::Input, BuilderSet::Preview, BuilderSet::Sync).chain(),
            )
            .add_systems(Startup, startup_systems::build_engine)
            .add_systems(
                Update,
                systems::track_cursor_cell
                    .in_set(BuilderSet::Input)
                    .run_if(resource_exists::<Builder>),
            )
            .add_systems(
                Update,
                (systems::handle_mouse_edits, systems::handle_edit_keys)
                    .chain()
                    .after(systems::track_cursor_cell)
                    .in_set(BuilderSet::Input)
                    .run_if(resource_exists::<Builder>)
                    .run_if(in_state(GameState::Editing)),
            )
            .add_systems(
                Update,
                (systems::update_preview, systems::forward_notices)
                    .chain()
                    .in_set(BuilderSet::Preview)
                    .run_if(resource_exists::<Builder>),
            );
    }
}
