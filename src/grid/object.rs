use bevy::prelude::*;

use super::coords::{HexCoord, HexDirection};
use crate::pool::Poolable;

/// Index of a mesh descriptor in the object catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct MeshId(pub u32);

/// Structural role of a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum StructureType {
    /// Horizontal slab.
    Floor,
    /// Vertical divider.
    Wall,
    /// Self-contained room occupying a whole level.
    Room,
    /// Top cover; nothing shares a level with it.
    Roof,
    /// Pillar or column.
    Support,
    /// Balcony, ledge, outcrop.
    Protrusion,
    /// Free-standing prop.
    Object,
    /// Unclassified mesh.
    #[default]
    Undefined,
}

/// Occupancy slot a structure claims on a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructureSlot {
    /// Claimed by floors.
    Floor,
    /// Claimed by walls.
    Wall,
    /// Claimed by rooms.
    Room,
    /// Claimed by supports, protrusions and props.
    Content,
    /// Claimed by roofs.
    Roof,
}

impl StructureType {
    /// Ordering used when sorting the catalog by type.
    pub const SORT_PRIORITY: [StructureType; 8] = [
        StructureType::Room,
        StructureType::Floor,
        StructureType::Object,
        StructureType::Support,
        StructureType::Wall,
        StructureType::Protrusion,
        StructureType::Roof,
        StructureType::Undefined,
    ];

    /// The slot this structure occupies; `None` for [`StructureType::Undefined`].
    pub fn slot(self) -> Option<StructureSlot> {
        match self {
            StructureType::Floor => Some(StructureSlot::Floor),
            StructureType::Wall => Some(StructureSlot::Wall),
            StructureType::Room => Some(StructureSlot::Room),
            StructureType::Roof => Some(StructureSlot::Roof),
            StructureType::Support | StructureType::Protrusion | StructureType::Object => {
                Some(StructureSlot::Content)
            }
            StructureType::Undefined => None,
        }
    }

    /// Position in [`Self::SORT_PRIORITY`].
    pub fn sort_rank(self) -> usize {
        Self::SORT_PRIORITY
            .iter()
            .position(|t| *t == self)
            .unwrap_or(Self::SORT_PRIORITY.len())
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            StructureType::Floor => "Floor",
            StructureType::Wall => "Wall",
            StructureType::Room => "Room",
            StructureType::Roof => "Roof",
            StructureType::Support => "Support",
            StructureType::Protrusion => "Protrusion",
            StructureType::Object => "Object",
            StructureType::Undefined => "Undefined",
        }
    }
}

impl StructureSlot {
    /// Whether a structure claiming `self` may join a level that already holds
    /// a structure claiming `existing`.
    pub fn compatible_with(self, existing: StructureSlot) -> bool {
        use StructureSlot::*;
        !matches!(
            (self, existing),
            (_, Roof)
                | (Roof, _)
                | (Floor, Floor | Room)
                | (Wall, Wall | Room)
                | (Room, Room | Floor | Wall)
                | (Content, Content)
        )
    }
}

/// A placed (or pooled) building piece.
///
/// Lives inside the engine's pool; a cell slot only stores its handle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HexObject {
    /// Cell the object is placed in.
    pub coords: HexCoord,
    /// Level it occupies; `x.5` means it starts half a level up.
    pub height_level: f32,
    /// Facing.
    pub direction: HexDirection,
    /// Catalog mesh, `None` while pooled.
    pub mesh: Option<MeshId>,
    /// Structural role copied from the mesh.
    pub structure: StructureType,
    /// Hidden objects stay in the grid but are not drawn.
    pub hidden: bool,
    /// World position for the presentation layer.
    pub position: Vec3,
    /// World yaw in degrees.
    pub rotation_y: f32,
}

impl HexObject {
    /// Whole level the object is stored on (half levels round down).
    pub fn slot_level(&self) -> u32 {
        crate::math::round_down(self.height_level)
    }
}

impl Poolable for HexObject {
    fn reset(&mut self) {
        *self = HexObject::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_but_undefined_has_a_slot() {
        for ty in StructureType::SORT_PRIORITY {
            assert_eq!(ty.slot().is_none(), ty == StructureType::Undefined, "{ty:?}");
        }
    }

    #[test]
    fn content_types_share_one_slot() {
        assert_eq!(StructureType::Support.slot(), Some(StructureSlot::Content));
        assert_eq!(StructureType::Protrusion.slot(), Some(StructureSlot::Content));
        assert_eq!(StructureType::Object.slot(), Some(StructureSlot::Content));
    }

    #[test]
    fn roof_excludes_everything() {
        use StructureSlot::*;
        for slot in [Floor, Wall, Room, Content, Roof] {
            assert!(!slot.compatible_with(Roof), "{slot:?} joined a roof");
            assert!(!Roof.compatible_with(slot), "roof joined {slot:?}");
        }
    }

    #[test]
    fn floor_and_wall_can_share_a_level() {
        assert!(StructureSlot::Floor.compatible_with(StructureSlot::Wall));
        assert!(StructureSlot::Wall.compatible_with(StructureSlot::Floor));
        assert!(StructureSlot::Content.compatible_with(StructureSlot::Floor));
        assert!(!StructureSlot::Room.compatible_with(StructureSlot::Wall));
    }

    #[test]
    fn reset_clears_placement() {
        let mut obj = HexObject {
            coords: HexCoord::new(2, 2),
            height_level: 3.5,
            mesh: Some(MeshId(4)),
            hidden: true,
            ..default()
        };
        obj.reset();
        assert_eq!(obj, HexObject::default());
    }
}
