use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::grid::{HexCoord, StructureType};
use crate::placement::MeshShape;
use crate::pool::PoolHandle;

/// Tile drawn on a support base.
#[derive(Component, Reflect)]
pub struct BaseTile {
    /// Cell the tile sits under.
    pub coords: HexCoord,
}

/// Scene entity mirroring one pool slot.
#[derive(Component, Reflect)]
pub struct SlotVisual {
    /// The mirrored slot.
    pub handle: PoolHandle,
}

/// Translucent copy of the selected item at the preview placement.
#[derive(Component, Reflect)]
pub struct PreviewGhost;

/// One level indicator under the preview.
#[derive(Component, Reflect)]
pub struct LevelMarker {
    /// Position in the preview's marker list (0 is the top).
    pub index: usize,
}

/// One side of the rectangle-selection outline.
#[derive(Component, Reflect)]
pub struct OutlineEdge {
    /// Side index, clockwise from the start corner.
    pub index: usize,
}

/// Pool slot → scene entity.
#[derive(Resource, Default)]
pub struct SlotEntities(pub HashMap<PoolHandle, Entity>);

/// Shared mesh and material handles.
#[derive(Resource)]
pub struct SceneAssets {
    /// Flat hexagon for support-base tops.
    pub tile_mesh: Handle<Mesh>,
    /// Unit hex prism for the terrain columns under raised bases.
    pub column_mesh: Handle<Mesh>,
    /// Unit cuboid for outline bars and markers.
    pub bar_mesh: Handle<Mesh>,
    /// One mesh per catalog shape.
    pub shape_meshes: HashMap<MeshShape, Handle<Mesh>>,
    /// The three alternating base materials.
    pub base_materials: [Handle<StandardMaterial>; 3],
    /// Base material for cells holding hidden objects.
    pub hidden_base_material: Handle<StandardMaterial>,
    /// One material per structure type.
    pub structure_materials: HashMap<StructureType, Handle<StandardMaterial>>,
    /// Preview over a free cell.
    pub ghost_material: Handle<StandardMaterial>,
    /// Preview over an occupied cell.
    pub ghost_occupied_material: Handle<StandardMaterial>,
    /// Level markers below the active level.
    pub marker_material: Handle<StandardMaterial>,
    /// Marker on the active level.
    pub top_marker_material: Handle<StandardMaterial>,
    /// Selection outline.
    pub outline_material: Handle<StandardMaterial>,
}

impl SceneAssets {
    /// Mesh for a catalog shape.
    pub fn shape(&self, shape: MeshShape) -> Handle<Mesh> {
        self.shape_meshes.get(&shape).cloned().unwrap_or_default()
    }

    /// Material for a structure type.
    pub fn structure(&self, structure: StructureType) -> Handle<StandardMaterial> {
        self.structure_materials
            .get(&structure)
            .cloned()
            .unwrap_or_default()
    }

    /// Base material, or the hidden-content material.
    pub fn base(&self, material: usize, objects_hidden: bool) -> Handle<StandardMaterial> {
        if objects_hidden {
            self.hidden_base_material.clone()
        } else {
            self.base_materials[material % self.base_materials.len()].clone()
        }
    }
}
