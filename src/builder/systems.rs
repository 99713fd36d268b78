use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::entities::{ActiveEditMode, Builder, CursorCell, Drag, EditInput};
use crate::camera::BuilderCamera;
use crate::grid::{HexCoord, Turn};
use crate::placement::{EditMode, FAVORITE_COUNT, ObjectPlacer, PlacementError, PlacementNotice};

/// Number-row keys, indexed by favourite slot.
const FAVORITE_KEYS: [KeyCode; FAVORITE_COUNT] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

// ── Cursor ──────────────────────────────────────────────────────────

/// Casts the cursor ray onto the grid plane and stores the hovered cell.
pub fn track_cursor_cell(
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<BuilderCamera>>,
    builder: Res<Builder>,
    mut cursor: ResMut<CursorCell>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let layout = builder.0.grid().layout();

    let hit = window
        .cursor_position()
        .and_then(|pos| camera.viewport_to_world(cam_gt, pos).ok())
        .and_then(|ray| {
            ray.intersect_plane(layout.origin, InfinitePlane3d::new(Vec3::Y))
                .map(|distance| ray.get_point(distance))
        });
    let cell = hit.and_then(|p| layout.cell_from_position(p));

    cursor.world = hit;
    if cursor.current != cell {
        cursor.current = cell;
    }
}

// ── Edits ───────────────────────────────────────────────────────────

/// Applies the active mode to one cell. Shift turns add into a tower and
/// remove into a whole-cell clear.
fn click(
    placer: &mut ObjectPlacer,
    cell: HexCoord,
    mode: EditMode,
    full_height: bool,
) -> Result<(), PlacementError> {
    match mode {
        EditMode::Add => placer
            .add_or_remove_object(cell, full_height, false, None)
            .map(|_| ()),
        EditMode::Remove => placer
            .add_or_remove_object(cell, full_height, true, None)
            .map(|_| ()),
        EditMode::Hide => {
            let hidden = placer
                .grid()
                .support_base(cell)
                .is_some_and(|b| b.objects_hidden);
            placer.hide_cell(cell, !hidden).map(|_| ())
        }
    }
}

/// Left click applies the edit mode; dragging across cells selects a
/// rectangle that is applied on release. Right click always removes.
pub fn handle_mouse_edits(
    input: EditInput,
    mode: Res<ActiveEditMode>,
    mut builder: ResMut<Builder>,
    mut drag: Local<Drag>,
) {
    let placer = &mut builder.0;
    let hovered = input.cursor.current;

    if input.mouse.just_pressed(MouseButton::Left) {
        placer.reset_multi_selection();
        drag.anchor = hovered;
        if let Some(cell) = hovered {
            placer.start_multi_selection(cell);
        }
    } else if input.mouse.pressed(MouseButton::Left)
        && drag.anchor.is_some()
        && !placer.multi_selection_active()
        && let Some(cell) = hovered
    {
        placer.start_multi_selection(cell);
    }

    if input.mouse.just_released(MouseButton::Left) {
        let anchor = drag.anchor.take();
        match (anchor, hovered) {
            (Some(_), Some(cell)) if placer.multi_selection_active() => {
                match placer.finish_multi_selection(cell, mode.0) {
                    Ok(changed) => info!("{} applied to {changed} cells", mode.0.label()),
                    Err(e) => warn!("Rectangle edit stopped: {e}"),
                }
            }
            (Some(_), Some(cell)) => {
                placer.reset_multi_selection();
                if let Err(e) = click(placer, cell, mode.0, input.shift()) {
                    debug!("Click on {cell} refused: {e}");
                }
            }
            _ => placer.reset_multi_selection(),
        }
    }

    if input.mouse.just_pressed(MouseButton::Right)
        && let Some(cell) = hovered
        && let Err(e) = click(placer, cell, EditMode::Remove, input.shift())
    {
        debug!("Removal from {cell} refused: {e}");
    }
}

/// Keyboard commands: rotation, height, catalog, favourites, mode and the
/// whole-grid actions.
pub fn handle_edit_keys(
    input: EditInput,
    mut mode: ResMut<ActiveEditMode>,
    mut builder: ResMut<Builder>,
) {
    let keys = &input.keys;
    let placer = &mut builder.0;

    if keys.just_pressed(KeyCode::KeyQ) {
        placer.change_rotation_for_next_object(Turn::Left);
    }
    if keys.just_pressed(KeyCode::KeyE) {
        placer.change_rotation_for_next_object(Turn::Right);
    }

    let step = if input.shift() { 0.5 } else { 1.0 };
    if keys.just_pressed(KeyCode::KeyR) {
        placer.change_height_level(step);
    }
    if keys.just_pressed(KeyCode::KeyF) {
        placer.change_height_level(-step);
    }

    if keys.just_pressed(KeyCode::KeyX) {
        placer.change_object(true);
    }
    if keys.just_pressed(KeyCode::KeyZ) {
        placer.change_object(false);
    }
    if keys.just_pressed(KeyCode::KeyG) {
        placer.sort_catalog();
        info!("Catalog sorted by structure type");
    }

    for (slot, key) in FAVORITE_KEYS.iter().enumerate() {
        if !keys.just_pressed(*key) {
            continue;
        }
        if input.ctrl() {
            if placer.save_current_to_favorites(slot) {
                info!("Saved current item to favourite {slot}");
            }
        } else if !placer.select_favorite(slot) {
            debug!("Favourite {slot} is empty");
        }
    }

    if keys.just_pressed(KeyCode::KeyM) {
        mode.0 = mode.0.next();
        info!("Edit mode: {}", mode.0.label());
    }

    if let Some(cell) = input.cursor.current {
        if keys.just_pressed(KeyCode::KeyP) {
            placer.pick_object_in_cell(cell);
        }
        if keys.just_pressed(KeyCode::KeyT) && !placer.match_rotation_in_cell(cell) {
            debug!("No visible object in {cell} to match rotation with");
        }
    }

    if keys.just_pressed(KeyCode::KeyV) {
        placer.show_all();
    }
    if keys.just_pressed(KeyCode::Backspace) {
        placer.reset();
    }
}

// ── Preview & notices ──────────────────────────────────────────────

/// Moves the preview to the hovered cell.
pub fn update_preview(cursor: Res<CursorCell>, mut builder: ResMut<Builder>) {
    builder.0.update_preview(cursor.current);
}

/// Publishes the engine's pending notices as messages.
pub fn forward_notices(mut builder: ResMut<Builder>, mut notices: MessageWriter<PlacementNotice>) {
    for notice in builder.0.drain_notices() {
        notices.write(notice);
    }
}
