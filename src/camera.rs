//! Orbit camera over the grid.
//!
//! WASD pans the focus point, arrow keys orbit, the scroll wheel zooms.
//! Spawns the `Camera3d` entity with HDR, tonemapping and bloom.

mod entities;
mod systems;

pub use entities::{BuilderCamera, OrbitRig};

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for the orbit camera.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Focus pan speed in world-units per second.
    pub pan_speed: f32,
    /// Orbit speed in radians per second.
    pub orbit_speed: f32,
    /// Distance change per scroll line.
    pub zoom_speed: f32,
    /// Closest the camera gets to its focus.
    pub min_distance: f32,
    /// Farthest the camera gets from its focus.
    pub max_distance: f32,
    /// Margin from vertical to prevent camera flip (radians).
    pub pitch_margin: f32,
    /// Initial distance from the focus.
    pub start_distance: f32,
    /// Initial pitch (negative looks down).
    pub start_pitch: f32,
    /// Bloom post-processing intensity.
    pub bloom_intensity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 8.0,
            orbit_speed: 1.5,
            zoom_speed: 1.5,
            min_distance: 3.0,
            max_distance: 60.0,
            pitch_margin: 0.05,
            start_distance: 18.0,
            start_pitch: -0.9,
            bloom_intensity: 0.2,
        }
    }
}

/// Orbit camera with pan, orbit and zoom.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BuilderCamera>()
            .register_type::<OrbitRig>()
            .register_type::<CameraConfig>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                systems::orbit_camera.run_if(in_state(GameState::Editing)),
            );
    }
}
