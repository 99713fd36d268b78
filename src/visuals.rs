//! Scene visuals: support-base tiles, pooled object meshes, the placement
//! preview with its level markers, and the rectangle-selection outline.
//!
//! Everything here only reads the [`Builder`](crate::builder::Builder)
//! engine; entities are spawned once and then synced every frame.

mod entities;
mod startup_systems;
mod systems;

pub use entities::{BaseTile, LevelMarker, OutlineEdge, PreviewGhost, SceneAssets, SlotVisual};

use bevy::prelude::*;

use crate::builder::{Builder, BuilderSet};

/// Visual tuning.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct VisualsConfig {
    /// Tile radius as a fraction of the cell radius (leaves a gap between tiles).
    pub tile_scale: f32,
    /// Opacity of the preview ghost.
    pub ghost_alpha: f32,
    /// Thickness of the selection outline bars.
    pub outline_thickness: f32,
    /// Light intensity in lux.
    pub light_illuminance: f32,
}

impl Default for VisualsConfig {
    fn default() -> Self {
        Self {
            tile_scale: 0.95,
            ghost_alpha: 0.45,
            outline_thickness: 0.06,
            light_illuminance: 6000.0,
        }
    }
}

/// Spawns and syncs every scene entity that mirrors the engine.
pub struct VisualsPlugin(pub VisualsConfig);

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<VisualsConfig>()
            .register_type::<BaseTile>()
            .register_type::<SlotVisual>()
            .register_type::<PreviewGhost>()
            .register_type::<LevelMarker>()
            .register_type::<OutlineEdge>()
            .insert_resource(self.0.clone())
            .init_resource::<entities::SlotEntities>()
            .add_systems(
                PostStartup,
                startup_systems::spawn_scene.run_if(resource_exists::<Builder>),
            )
            .add_systems(
                Update,
                (
                    systems::sync_bases,
                    systems::sync_slots,
                    systems::sync_preview,
                    systems::sync_outline,
                )
                    .in_set(BuilderSet::Sync)
                    .run_if(resource_exists::<SceneAssets>),
            );
    }
}
