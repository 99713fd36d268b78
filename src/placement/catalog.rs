use bevy::prelude::*;

use crate::grid::{HexDirection, MeshId, StructureType};

/// Number of favourite slots (one per number key).
pub const FAVORITE_COUNT: usize = 10;

/// Primitive used to draw a catalog item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum MeshShape {
    /// Thin hexagonal plate covering the cell.
    Slab,
    /// Hexagonal prism filling a whole level.
    Block,
    /// Thin panel along one cell edge.
    Panel,
    /// Narrow column.
    Pillar,
    /// Pointed cap.
    Spire,
    /// Small box sticking out of the cell.
    Ledge,
    /// Round prop.
    Orb,
}

impl MeshShape {
    /// Every shape.
    pub const ALL: [MeshShape; 7] = [
        MeshShape::Slab,
        MeshShape::Block,
        MeshShape::Panel,
        MeshShape::Pillar,
        MeshShape::Spire,
        MeshShape::Ledge,
        MeshShape::Orb,
    ];
}

/// Everything the engine needs to know about a placeable mesh.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct MeshDescriptor {
    /// Display name.
    pub name: String,
    /// Structural role.
    pub structure: StructureType,
    /// The direction the mesh faces when unrotated.
    pub main_direction: HexDirection,
    /// Extra yaw applied to every placement, in degrees.
    pub default_rotation_y: f32,
    /// Vertical offset from the level floor.
    pub default_position_y: f32,
    /// Whether the mesh is half a level tall (towers step by 0.5).
    pub half_height: bool,
    /// How the presentation layer draws it.
    pub shape: MeshShape,
}

impl MeshDescriptor {
    /// Descriptor with neutral orientation and offsets.
    pub fn new(name: impl Into<String>, structure: StructureType, shape: MeshShape) -> Self {
        Self {
            name: name.into(),
            structure,
            main_direction: HexDirection::Right,
            default_rotation_y: 0.0,
            default_position_y: 0.0,
            half_height: false,
            shape,
        }
    }

    /// Marks the mesh as half a level tall.
    pub fn half_height(mut self) -> Self {
        self.half_height = true;
        self
    }

    /// Sets the unrotated facing of the mesh.
    pub fn facing(mut self, direction: HexDirection) -> Self {
        self.main_direction = direction;
        self
    }
}

/// Ordered list of placeable meshes, the current selection and favourites.
///
/// Meshes are addressed by a stable [`MeshId`]; the order can be re-sorted
/// without invalidating ids or favourites.
pub struct ObjectCatalog {
    meshes: Vec<MeshDescriptor>,
    order: Vec<MeshId>,
    favorites: [Option<MeshId>; FAVORITE_COUNT],
    current: usize,
}

impl ObjectCatalog {
    /// Catalog over `meshes` in the given order.
    ///
    /// Favourites start out like the number row: slot 1 holds the first
    /// item, slot 9 the ninth and slot 0 the tenth.
    pub fn new(meshes: Vec<MeshDescriptor>) -> Self {
        let order: Vec<MeshId> = (0..meshes.len() as u32).map(MeshId).collect();
        let mut favorites = [None; FAVORITE_COUNT];
        for (i, id) in order.iter().take(FAVORITE_COUNT).enumerate() {
            let slot = if i < FAVORITE_COUNT - 1 { i + 1 } else { 0 };
            favorites[slot] = Some(*id);
        }
        Self {
            meshes,
            order,
            favorites,
            current: 0,
        }
    }

    /// Default building kit.
    pub fn builtin() -> Self {
        use StructureType as S;
        Self::new(vec![
            MeshDescriptor::new("Stone floor", S::Floor, MeshShape::Slab),
            MeshDescriptor::new("Brick wall", S::Wall, MeshShape::Panel),
            MeshDescriptor::new("Tower room", S::Room, MeshShape::Block),
            MeshDescriptor::new("Half room", S::Room, MeshShape::Block).half_height(),
            MeshDescriptor::new("Pointed roof", S::Roof, MeshShape::Spire),
            MeshDescriptor::new("Wooden pillar", S::Support, MeshShape::Pillar),
            MeshDescriptor::new("Balcony", S::Protrusion, MeshShape::Ledge)
                .facing(HexDirection::DownRight),
            MeshDescriptor::new("Barrel", S::Object, MeshShape::Orb).half_height(),
            MeshDescriptor::new("Wood floor", S::Floor, MeshShape::Slab),
            MeshDescriptor::new("Window wall", S::Wall, MeshShape::Panel)
                .facing(HexDirection::Left),
            MeshDescriptor::new("Stair block", S::Undefined, MeshShape::Block).half_height(),
        ])
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Descriptor by id.
    pub fn get(&self, id: MeshId) -> Option<&MeshDescriptor> {
        self.meshes.get(id.0 as usize)
    }

    /// Id at a catalog position.
    pub fn at(&self, index: usize) -> Option<MeshId> {
        self.order.get(index).copied()
    }

    /// Catalog position of an id.
    pub fn index_of(&self, id: MeshId) -> Option<usize> {
        self.order.iter().position(|m| *m == id)
    }

    /// Catalog position of the selected item.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The selected item.
    pub fn current(&self) -> Option<(MeshId, &MeshDescriptor)> {
        let id = self.at(self.current)?;
        self.get(id).map(|d| (id, d))
    }

    /// Moves the selection one item forward or back, wrapping around.
    /// Returns false when there is nothing to cycle through.
    pub fn cycle(&mut self, next: bool) -> bool {
        let len = self.len();
        if len <= 1 {
            return false;
        }
        self.current = if next {
            (self.current + 1) % len
        } else {
            (self.current + len - 1) % len
        };
        true
    }

    /// Selects an item by id. False if the id is unknown.
    pub fn select(&mut self, id: MeshId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// Groups items by structure type (rooms, floors, objects, supports,
    /// walls, protrusions, roofs, then undefined), keeping the relative order
    /// inside a group. The selection follows its item.
    pub fn sort_by_type(&mut self) {
        let selected = self.at(self.current);
        let meshes = &self.meshes;
        self.order
            .sort_by_key(|id| meshes[id.0 as usize].structure.sort_rank());
        if let Some(id) = selected {
            self.select(id);
        }
    }

    // ── Favourites ─────────────────────────────────────────────────

    /// Item stored in a favourite slot.
    pub fn favorite(&self, slot: usize) -> Option<MeshId> {
        self.favorites.get(slot).copied().flatten()
    }

    /// Catalog position of the item in a favourite slot.
    pub fn favorite_catalog_index(&self, slot: usize) -> Option<usize> {
        self.index_of(self.favorite(slot)?)
    }

    /// Stores the selected item in a favourite slot.
    pub fn save_current_to_favorites(&mut self, slot: usize) -> bool {
        let Some(id) = self.at(self.current) else {
            return false;
        };
        match self.favorites.get_mut(slot) {
            Some(fav) => {
                *fav = Some(id);
                true
            }
            None => false,
        }
    }

    /// Selects the item in a favourite slot.
    pub fn select_favorite(&mut self, slot: usize) -> bool {
        match self.favorite(slot) {
            Some(id) => self.select(id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(types: &[StructureType]) -> ObjectCatalog {
        ObjectCatalog::new(
            types
                .iter()
                .enumerate()
                .map(|(i, t)| MeshDescriptor::new(format!("m{i}"), *t, MeshShape::Block))
                .collect(),
        )
    }

    #[test]
    fn favorites_follow_number_row() {
        let cat = ObjectCatalog::builtin();
        assert!(cat.len() >= FAVORITE_COUNT);
        assert_eq!(cat.favorite(1), Some(MeshId(0)));
        assert_eq!(cat.favorite(9), Some(MeshId(8)));
        assert_eq!(cat.favorite(0), Some(MeshId(9)));
        assert_eq!(cat.favorite(10), None);
    }

    #[test]
    fn small_catalog_leaves_slots_empty() {
        let cat = catalog(&[StructureType::Floor, StructureType::Wall]);
        assert_eq!(cat.favorite(2), Some(MeshId(1)));
        assert_eq!(cat.favorite(3), None);
        assert_eq!(cat.favorite(0), None);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let mut cat = catalog(&[StructureType::Floor; 3]);
        assert!(cat.cycle(false));
        assert_eq!(cat.current_index(), 2);
        assert!(cat.cycle(true));
        assert_eq!(cat.current_index(), 0);

        let mut single = catalog(&[StructureType::Floor]);
        assert!(!single.cycle(true));
    }

    #[test]
    fn sort_groups_by_priority_and_keeps_selection() {
        use StructureType as S;
        let mut cat = catalog(&[S::Roof, S::Floor, S::Undefined, S::Room, S::Floor]);
        cat.select(MeshId(4));
        cat.sort_by_type();

        let types: Vec<_> = (0..cat.len())
            .map(|i| cat.get(cat.at(i).unwrap()).unwrap().structure)
            .collect();
        assert_eq!(types, vec![S::Room, S::Floor, S::Floor, S::Roof, S::Undefined]);
        assert_eq!(cat.at(1), Some(MeshId(1)), "sort must be stable");
        assert_eq!(cat.current().map(|(id, _)| id), Some(MeshId(4)));
    }

    #[test]
    fn favorites_survive_sorting() {
        use StructureType as S;
        let mut cat = catalog(&[S::Roof, S::Room]);
        assert_eq!(cat.favorite_catalog_index(1), Some(0));
        cat.sort_by_type();
        assert_eq!(cat.favorite(1), Some(MeshId(0)));
        assert_eq!(cat.favorite_catalog_index(1), Some(1));
    }

    #[test]
    fn saving_and_selecting_favorites() {
        let mut cat = catalog(&[StructureType::Floor; 4]);
        cat.cycle(true);
        cat.cycle(true);
        assert!(cat.save_current_to_favorites(7));
        assert!(!cat.save_current_to_favorites(FAVORITE_COUNT));
        cat.cycle(true);
        assert!(cat.select_favorite(7));
        assert_eq!(cat.current_index(), 2);
        assert!(!cat.select_favorite(8));
    }
}
