use std::f32::consts::FRAC_PI_6;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use hexx::{HexLayout, HexOrientation, PlaneMeshBuilder};

use super::VisualsConfig;
use super::entities::{
    BaseTile, LevelMarker, OutlineEdge, PreviewGhost, SceneAssets, SlotEntities, SlotVisual,
};
use crate::builder::Builder;
use crate::grid::StructureType;
use crate::placement::MeshShape;
use crate::pool::PoolHandle;

// ── Meshes ──────────────────────────────────────────────────────────

/// Hexagonal prism standing on y = 0, pointy along Z like the grid tiles.
fn hex_prism(radius: f32, height: f32) -> Mesh {
    Cylinder::new(radius, height)
        .mesh()
        .resolution(6)
        .build()
        .rotated_by(Quat::from_rotation_y(FRAC_PI_6))
        .translated_by(Vec3::Y * height / 2.0)
}

/// Mesh for a catalog shape, sized to one cell and one level. Everything
/// rests on the level floor (y = 0) and extends toward +X where it has a
/// facing.
pub fn shape_mesh(shape: MeshShape, cell_size: f32, cell_height: f32) -> Mesh {
    let r = cell_size / 3f32.sqrt();
    match shape {
        MeshShape::Slab => hex_prism(r * 0.98, cell_height * 0.1),
        MeshShape::Block => hex_prism(r * 0.9, cell_height * 0.98),
        MeshShape::Panel => Mesh::from(Cuboid::new(cell_size * 0.08, cell_height * 0.98, r))
            .translated_by(Vec3::new(cell_size * 0.44, cell_height * 0.49, 0.0)),
        MeshShape::Pillar => Mesh::from(Cylinder::new(cell_size * 0.08, cell_height * 0.98))
            .translated_by(Vec3::Y * cell_height * 0.49),
        MeshShape::Spire => Cone {
            radius: r * 0.95,
            height: cell_height * 0.9,
        }
        .mesh()
        .resolution(6)
        .build()
        .rotated_by(Quat::from_rotation_y(FRAC_PI_6))
        .translated_by(Vec3::Y * cell_height * 0.45),
        MeshShape::Ledge => Mesh::from(Cuboid::new(cell_size * 0.5, cell_height * 0.12, r * 0.8))
            .translated_by(Vec3::new(cell_size * 0.6, cell_height * 0.3, 0.0)),
        MeshShape::Orb => {
            Mesh::from(Sphere::new(cell_size * 0.25)).translated_by(Vec3::Y * cell_size * 0.25)
        }
    }
}

/// Flat unit hexagon facing up.
fn tile_mesh() -> Mesh {
    let unit_layout = HexLayout {
        orientation: HexOrientation::Pointy,
        scale: Vec2::splat(1.0),
        ..default()
    };
    let info = PlaneMeshBuilder::new(&unit_layout).build();
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, info.vertices)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, info.normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, info.uvs)
    .with_inserted_indices(Indices::U16(info.indices))
}

fn structure_color(structure: StructureType) -> (Color, LinearRgba) {
    match structure {
        StructureType::Floor => (Color::srgb(0.55, 0.5, 0.45), LinearRgba::rgb(0.05, 0.04, 0.03)),
        StructureType::Wall => (Color::srgb(0.7, 0.35, 0.25), LinearRgba::rgb(0.08, 0.02, 0.01)),
        StructureType::Room => (Color::srgb(0.8, 0.75, 0.6), LinearRgba::rgb(0.06, 0.05, 0.03)),
        StructureType::Roof => (Color::srgb(0.45, 0.12, 0.1), LinearRgba::rgb(0.3, 0.02, 0.01)),
        StructureType::Support => (Color::srgb(0.45, 0.3, 0.15), LinearRgba::rgb(0.02, 0.01, 0.0)),
        StructureType::Protrusion => {
            (Color::srgb(0.35, 0.45, 0.55), LinearRgba::rgb(0.02, 0.04, 0.06))
        }
        StructureType::Object => (Color::srgb(0.6, 0.45, 0.2), LinearRgba::rgb(0.2, 0.12, 0.0)),
        StructureType::Undefined => (Color::srgb(0.5, 0.5, 0.5), LinearRgba::rgb(0.0, 0.0, 0.0)),
    }
}

// ── Startup ─────────────────────────────────────────────────────────

/// Creates [`SceneAssets`] and spawns tiles, pool slot visuals, the preview
/// ghost, level markers, selection outline and the light.
pub fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut slots: ResMut<SlotEntities>,
    builder: Res<Builder>,
    cfg: Res<VisualsConfig>,
) {
    let placer = &builder.0;
    let grid = placer.grid();
    let layout = grid.layout();

    let shape_meshes = MeshShape::ALL
        .iter()
        .map(|s| {
            let mesh = shape_mesh(*s, layout.cell_size, layout.cell_height);
            (*s, meshes.add(mesh))
        })
        .collect::<HashMap<_, _>>();
    let structure_materials = StructureType::SORT_PRIORITY
        .iter()
        .map(|t| {
            let (base_color, emissive) = structure_color(*t);
            let material = materials.add(StandardMaterial {
                base_color,
                emissive,
                perceptual_roughness: 0.8,
                ..default()
            });
            (*t, material)
        })
        .collect::<HashMap<_, _>>();
    let base_material = |materials: &mut Assets<StandardMaterial>, color: Color| {
        materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.95,
            ..default()
        })
    };
    let ghost = |materials: &mut Assets<StandardMaterial>, r: f32, g: f32, b: f32| {
        materials.add(StandardMaterial {
            base_color: Color::srgba(r, g, b, cfg.ghost_alpha),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        })
    };

    let assets = SceneAssets {
        tile_mesh: meshes.add(tile_mesh()),
        column_mesh: meshes.add(hex_prism(1.0, 1.0)),
        bar_mesh: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        shape_meshes,
        base_materials: [
            base_material(&mut *materials, Color::srgb(0.2, 0.28, 0.16)),
            base_material(&mut *materials, Color::srgb(0.25, 0.32, 0.19)),
            base_material(&mut *materials, Color::srgb(0.17, 0.24, 0.14)),
        ],
        hidden_base_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.1, 0.4),
            emissive: LinearRgba::rgb(0.6, 0.1, 1.0),
            ..default()
        }),
        structure_materials,
        ghost_material: ghost(&mut *materials, 0.6, 0.9, 1.0),
        ghost_occupied_material: ghost(&mut *materials, 1.0, 0.6, 0.3),
        marker_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.0, 0.5, 1.0),
            emissive: LinearRgba::rgb(0.0, 4.0, 8.0),
            unlit: true,
            ..default()
        }),
        top_marker_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.0, 1.0, 0.2),
            emissive: LinearRgba::rgb(0.0, 20.0, 4.0),
            unlit: true,
            ..default()
        }),
        outline_material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.8, 0.0),
            emissive: LinearRgba::rgb(20.0, 14.0, 0.0),
            unlit: true,
            ..default()
        }),
    };

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: cfg.light_illuminance,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Support-base tiles, with a column under raised ones
    let tile_radius = layout.hex_radius() * cfg.tile_scale;
    let bases_root = commands
        .spawn((
            Name::new("SupportBases"),
            Transform::default(),
            Visibility::default(),
        ))
        .id();
    for base in grid.support_bases() {
        let Some(center) = grid.cell_center(base.coords, false) else {
            continue;
        };
        let tile = commands
            .spawn((
                BaseTile {
                    coords: base.coords,
                },
                Name::new(format!("Base({},{})", base.coords.x, base.coords.y)),
                Mesh3d(assets.tile_mesh.clone()),
                MeshMaterial3d(assets.base(base.material, base.objects_hidden)),
                Transform::from_translation(center).with_scale(Vec3::new(
                    tile_radius,
                    1.0,
                    tile_radius,
                )),
            ))
            .id();
        commands.entity(bases_root).add_child(tile);

        let rise = base.y - layout.origin.y;
        if rise > 0.01 {
            let column = commands
                .spawn((
                    Name::new("Column"),
                    Mesh3d(assets.column_mesh.clone()),
                    MeshMaterial3d(assets.base(base.material, false)),
                    Transform::from_xyz(0.0, -rise, 0.0).with_scale(Vec3::new(1.0, rise, 1.0)),
                ))
                .id();
            commands.entity(tile).add_child(column);
        }
    }

    // One visual per pool slot
    for (handle, _, _) in placer.pool().iter() {
        let entity = commands.spawn(slot_bundle(handle, &assets)).id();
        slots.0.insert(handle, entity);
    }

    // Preview
    commands.spawn((
        PreviewGhost,
        Name::new("PreviewGhost"),
        Mesh3d(Handle::default()),
        MeshMaterial3d(assets.ghost_material.clone()),
        Transform::default(),
        Visibility::Hidden,
    ));
    for index in 0..layout.max_height_level as usize {
        commands.spawn((
            LevelMarker { index },
            Name::new(format!("LevelMarker({index})")),
            Mesh3d(assets.bar_mesh.clone()),
            MeshMaterial3d(assets.marker_material.clone()),
            Transform::default(),
            Visibility::Hidden,
        ));
    }
    for index in 0..4 {
        commands.spawn((
            OutlineEdge { index },
            Name::new(format!("OutlineEdge({index})")),
            Mesh3d(assets.bar_mesh.clone()),
            MeshMaterial3d(assets.outline_material.clone()),
            Transform::default(),
            Visibility::Hidden,
        ));
    }

    info!(
        "Spawned {} base tiles and {} object slots",
        layout.cell_count(),
        slots.0.len()
    );
    commands.insert_resource(assets);
}

/// Hidden scene entity for a pool slot; syncing fills in mesh and placement.
pub fn slot_bundle(handle: PoolHandle, assets: &SceneAssets) -> impl Bundle {
    (
        SlotVisual { handle },
        Name::new(format!("Object({})", handle.index())),
        Mesh3d(assets.shape(MeshShape::Block)),
        MeshMaterial3d(assets.structure(StructureType::Undefined)),
        Transform::default(),
        Visibility::Hidden,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::mesh::VertexAttributeValues;

    fn min_max_y(mesh: &Mesh) -> (f32, f32) {
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("mesh without float3 positions");
        };
        positions.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
            (lo.min(p[1]), hi.max(p[1]))
        })
    }

    #[test]
    fn shapes_fit_inside_one_level() {
        for shape in MeshShape::ALL {
            let (lo, hi) = min_max_y(&shape_mesh(shape, 1.0, 2.0));
            assert!(lo >= -1e-4, "{shape:?} reaches below the floor ({lo})");
            assert!(hi <= 2.0 + 1e-4, "{shape:?} reaches above the level ({hi})");
        }
    }

    #[test]
    fn prisms_rest_on_floor() {
        for shape in [MeshShape::Slab, MeshShape::Block, MeshShape::Spire] {
            let (lo, _) = min_max_y(&shape_mesh(shape, 1.0, 2.0));
            assert!(lo.abs() < 1e-4, "{shape:?} floats at {lo}");
        }
    }
}
