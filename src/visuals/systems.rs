use bevy::prelude::*;

use super::VisualsConfig;
use super::entities::{
    BaseTile, LevelMarker, OutlineEdge, PreviewGhost, SceneAssets, SlotEntities, SlotVisual,
};
use super::startup_systems::slot_bundle;
use crate::builder::{Builder, CursorCell};

/// Transform of a placed mesh; half-height items are squashed to half a level.
pub fn object_transform(position: Vec3, rotation_y_degrees: f32, half_height: bool) -> Transform {
    let height = if half_height { 0.5 } else { 1.0 };
    Transform::from_translation(position)
        .with_rotation(Quat::from_rotation_y(rotation_y_degrees.to_radians()))
        .with_scale(Vec3::new(1.0, height, 1.0))
}

/// Bars along the sides of an axis-aligned rectangle on the XZ plane, for a
/// unit cuboid mesh. Side `i` runs from corner `i` to corner `i + 1`.
pub fn outline_edges(corners: [Vec3; 4], thickness: f32) -> [Transform; 4] {
    std::array::from_fn(|i| {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let span = (b - a).abs();
        Transform::from_translation((a + b) / 2.0).with_scale(Vec3::new(
            span.x + thickness,
            thickness,
            span.z + thickness,
        ))
    })
}

// ── Sync ────────────────────────────────────────────────────────────

/// Tiles switch to the hidden-content material while their cell hides objects.
pub fn sync_bases(
    builder: Res<Builder>,
    assets: Res<SceneAssets>,
    mut tiles: Query<(&BaseTile, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    let grid = builder.0.grid();
    for (tile, mut material) in &mut tiles {
        let Some(base) = grid.support_base(tile.coords) else {
            continue;
        };
        material.set_if_neq(MeshMaterial3d(
            assets.base(base.material, base.objects_hidden),
        ));
    }
}

/// Shows active, visible pool slots at their placement; hides the rest.
/// Slots added by pool growth get a visual on the fly.
pub fn sync_slots(
    mut commands: Commands,
    builder: Res<Builder>,
    assets: Res<SceneAssets>,
    mut slots: ResMut<SlotEntities>,
    mut visuals: Query<
        (
            &mut Transform,
            &mut Visibility,
            &mut Mesh3d,
            &mut MeshMaterial3d<StandardMaterial>,
        ),
        With<SlotVisual>,
    >,
) {
    let placer = &builder.0;
    for (handle, obj, active) in placer.pool().iter() {
        let Some(&entity) = slots.0.get(&handle) else {
            let entity = commands.spawn(slot_bundle(handle, &assets)).id();
            slots.0.insert(handle, entity);
            debug!("Spawned visual for grown pool slot {}", handle.index());
            continue;
        };
        let Ok((mut transform, mut visibility, mut mesh, mut material)) = visuals.get_mut(entity)
        else {
            continue;
        };

        let descriptor = obj
            .mesh
            .and_then(|id| placer.catalog().get(id))
            .filter(|_| active && !obj.hidden);
        let Some(descriptor) = descriptor else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };
        visibility.set_if_neq(Visibility::Inherited);
        transform.set_if_neq(object_transform(
            obj.position,
            obj.rotation_y,
            descriptor.half_height,
        ));
        mesh.set_if_neq(Mesh3d(assets.shape(descriptor.shape)));
        material.set_if_neq(MeshMaterial3d(assets.structure(obj.structure)));
    }
}

/// Moves the ghost and level markers to the current preview. Hidden while
/// the cursor is off the grid.
pub fn sync_preview(
    builder: Res<Builder>,
    cursor: Res<CursorCell>,
    assets: Res<SceneAssets>,
    mut ghost_q: Query<
        (
            &mut Transform,
            &mut Visibility,
            &mut Mesh3d,
            &mut MeshMaterial3d<StandardMaterial>,
        ),
        (With<PreviewGhost>, Without<LevelMarker>),
    >,
    mut markers: Query<
        (
            &LevelMarker,
            &mut Transform,
            &mut Visibility,
            &mut MeshMaterial3d<StandardMaterial>,
        ),
        Without<PreviewGhost>,
    >,
) {
    let placer = &builder.0;
    let frame = placer
        .preview_frame()
        .filter(|_| cursor.current.is_some());
    let current = placer.current_mesh();

    if let Ok((mut transform, mut visibility, mut mesh, mut material)) = ghost_q.single_mut() {
        match (frame, current) {
            (Some(frame), Some((_, descriptor))) => {
                visibility.set_if_neq(Visibility::Inherited);
                transform.set_if_neq(object_transform(
                    frame.placement.position,
                    frame.placement.rotation_y,
                    descriptor.half_height,
                ));
                mesh.set_if_neq(Mesh3d(assets.shape(descriptor.shape)));
                let ghost = if frame.occupied {
                    &assets.ghost_occupied_material
                } else {
                    &assets.ghost_material
                };
                material.set_if_neq(MeshMaterial3d(ghost.clone()));
            }
            _ => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }

    let cell_size = placer.grid().layout().cell_size;
    let yaw = Quat::from_rotation_y(frame.map_or(0.0, |f| f.direction_yaw.to_radians()));
    for (marker, mut transform, mut visibility, mut material) in &mut markers {
        let Some(m) = frame.and_then(|f| f.markers.get(marker.index)) else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };
        visibility.set_if_neq(Visibility::Inherited);
        // Arrow-like bar from the cell centre toward the facing direction
        let offset = yaw * Vec3::X * cell_size * 0.25;
        transform.set_if_neq(
            Transform::from_translation(m.position + offset + Vec3::Y * 0.02)
                .with_rotation(yaw)
                .with_scale(Vec3::new(cell_size * 0.5, 0.04, cell_size * 0.12)),
        );
        let wanted = if m.top {
            &assets.top_marker_material
        } else {
            &assets.marker_material
        };
        material.set_if_neq(MeshMaterial3d(wanted.clone()));
    }
}

/// Draws the rectangle outline while a multi-selection is active.
pub fn sync_outline(
    builder: Res<Builder>,
    cursor: Res<CursorCell>,
    cfg: Res<VisualsConfig>,
    mut edges: Query<(&OutlineEdge, &mut Transform, &mut Visibility)>,
) {
    let corners = cursor
        .current
        .and_then(|cell| builder.0.multi_selection_corners(cell));
    let bars = corners.map(|c| outline_edges(c, cfg.outline_thickness));
    for (edge, mut transform, mut visibility) in &mut edges {
        match bars.as_ref().and_then(|b| b.get(edge.index)) {
            Some(bar) => {
                visibility.set_if_neq(Visibility::Inherited);
                transform.set_if_neq(*bar);
            }
            None => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_height_objects_are_squashed() {
        let t = object_transform(Vec3::new(1.0, 2.0, 3.0), 90.0, true);
        assert_eq!(t.scale, Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(t.translation, Vec3::new(1.0, 2.0, 3.0));
        let right = t.rotation * Vec3::X;
        assert!((right - Vec3::NEG_Z).length() < 1e-5, "90° turns +X toward -Z");
    }

    #[test]
    fn outline_bars_join_the_corners() {
        let corners = [
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::new(3.0, 0.1, 0.0),
            Vec3::new(3.0, 0.1, 2.0),
            Vec3::new(0.0, 0.1, 2.0),
        ];
        let bars = outline_edges(corners, 0.1);
        assert_eq!(bars[0].translation, Vec3::new(1.5, 0.1, 0.0));
        assert!((bars[0].scale - Vec3::new(3.1, 0.1, 0.1)).length() < 1e-5);
        assert_eq!(bars[1].translation, Vec3::new(3.0, 0.1, 1.0));
        assert!((bars[1].scale - Vec3::new(0.1, 0.1, 2.1)).length() < 1e-5);
        assert_eq!(bars[3].translation, Vec3::new(0.0, 0.1, 1.0));
    }
}
