use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::grid::HexCoord;
use crate::placement::{EditMode, ObjectPlacer};

/// The placement engine as a resource. Only builder systems mutate it.
#[derive(Resource)]
pub struct Builder(pub ObjectPlacer);

/// Cell under the mouse cursor.
#[derive(Resource, Default, Reflect)]
pub struct CursorCell {
    /// Hovered cell, `None` when the cursor is off the grid.
    pub current: Option<HexCoord>,
    /// Where the cursor ray meets the grid plane.
    pub world: Option<Vec3>,
}

/// Edit applied by left clicks and rectangle drags (M to cycle).
#[derive(Resource, Default, Reflect)]
pub struct ActiveEditMode(pub EditMode);

/// Left-button drag in progress.
#[derive(Default)]
pub struct Drag {
    /// Cell the button went down on.
    pub anchor: Option<HexCoord>,
}

/// Bundled input state for the edit systems.
#[derive(SystemParam)]
pub struct EditInput<'w> {
    /// Keyboard state.
    pub keys: Res<'w, ButtonInput<KeyCode>>,
    /// Mouse button state.
    pub mouse: Res<'w, ButtonInput<MouseButton>>,
    /// Hovered cell.
    pub cursor: Res<'w, CursorCell>,
}

impl EditInput<'_> {
    /// Either shift key is held.
    pub fn shift(&self) -> bool {
        self.keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight])
    }

    /// Either control key is held.
    pub fn ctrl(&self) -> bool {
        self.keys
            .any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight])
    }
}
