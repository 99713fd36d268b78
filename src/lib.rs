#![warn(missing_docs)]
//! Hex grid building editor.
//!
//! Place stacked building pieces on a hexagonal grid resting on noise
//! terrain: towers, rectangle edits, hiding, a live preview with level
//! markers, and a pooled object store.

pub mod builder;
pub mod camera;
pub mod grid;
pub mod hud;
pub mod math;
pub mod placement;
pub mod pool;
pub mod visuals;

use bevy::prelude::*;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal editing.
    #[default]
    Editing,
    /// Inspector overlay active (Tab to toggle).
    Debugging,
}
