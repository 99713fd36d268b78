use std::fmt;

use super::coords::HexCoord;
use super::object::{HexObject, StructureType};
use crate::pool::{ObjectPool, PoolHandle};

/// A height level outside `[1, max]` was used on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelOutOfRange {
    /// Level that was requested.
    pub level: u32,
    /// Highest level the cell holds.
    pub max: u32,
}

impl fmt::Display for LevelOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "height level {} is outside the cell's range 1..={}",
            self.level, self.max
        )
    }
}

impl std::error::Error for LevelOutOfRange {}

/// Occupancy of one grid cell: an ordered handle list per height level.
///
/// `total` always equals the sum of all level lengths.
#[derive(Clone, Debug)]
pub struct HexCell {
    coords: HexCoord,
    levels: Vec<Vec<PoolHandle>>,
    total: usize,
}

impl HexCell {
    /// Empty cell holding levels `1..=max_height_level`.
    pub fn new(coords: HexCoord, max_height_level: u32) -> Self {
        Self {
            coords,
            levels: vec![Vec::new(); max_height_level as usize],
            total: 0,
        }
    }

    /// Coordinates of the cell.
    pub fn coords(&self) -> HexCoord {
        self.coords
    }

    /// Highest storable level.
    pub fn max_height_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// True when no level holds anything.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn slot_index(&self, level: u32) -> Result<usize, LevelOutOfRange> {
        if level == 0 || level as usize > self.levels.len() {
            return Err(LevelOutOfRange {
                level,
                max: self.max_height_level(),
            });
        }
        Ok(level as usize - 1)
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Appends a handle to a level. No exclusivity is checked here.
    pub fn place_object(&mut self, handle: PoolHandle, level: u32) -> Result<(), LevelOutOfRange> {
        let index = self.slot_index(level)?;
        self.levels[index].push(handle);
        self.total += 1;
        Ok(())
    }

    /// Removes one handle wherever it is stored and returns it to the pool.
    ///
    /// False if the cell does not hold it.
    pub fn remove_object(&mut self, handle: PoolHandle, pool: &mut ObjectPool<HexObject>) -> bool {
        if self.is_empty() {
            return false;
        }
        for level in &mut self.levels {
            if let Some(pos) = level.iter().position(|h| *h == handle) {
                level.remove(pos);
                self.total -= 1;
                pool.release(handle);
                return true;
            }
        }
        false
    }

    /// Clears one level, releasing its objects. Returns how many were removed.
    pub fn remove_objects(
        &mut self,
        level: u32,
        pool: &mut ObjectPool<HexObject>,
    ) -> Result<usize, LevelOutOfRange> {
        let index = self.slot_index(level)?;
        let removed: Vec<PoolHandle> = self.levels[index].drain(..).collect();
        for handle in &removed {
            pool.release(*handle);
        }
        self.total -= removed.len();
        Ok(removed.len())
    }

    /// Clears every level. Returns how many objects were removed.
    pub fn remove_all_objects(&mut self, pool: &mut ObjectPool<HexObject>) -> usize {
        let removed = self.total;
        for level in &mut self.levels {
            for handle in level.drain(..) {
                pool.release(handle);
            }
        }
        self.total = 0;
        removed
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Object count on a level, or in the whole cell when `level` is 0.
    ///
    /// # Panics
    /// If `level` is above the cell's maximum. Use [`HexCell::try_object_count`]
    /// for a checked variant.
    pub fn object_count(&self, level: u32) -> usize {
        match self.try_object_count(level) {
            Ok(count) => count,
            Err(err) => panic!("{err}"),
        }
    }

    /// Checked [`HexCell::object_count`].
    pub fn try_object_count(&self, level: u32) -> Result<usize, LevelOutOfRange> {
        if level == 0 {
            return Ok(self.total);
        }
        let index = self.slot_index(level)?;
        Ok(self.levels[index].len())
    }

    /// Whether a level holds at least one object.
    ///
    /// # Panics
    /// If `level` is outside `[1, max]`.
    pub fn has_something_on_level(&self, level: u32) -> bool {
        match self.slot_index(level) {
            Ok(index) => !self.levels[index].is_empty(),
            Err(err) => panic!("{err}"),
        }
    }

    /// All handles, lowest level first.
    pub fn iter(&self) -> impl Iterator<Item = PoolHandle> + '_ {
        self.levels.iter().flatten().copied()
    }

    /// Handles stored on one level; empty for levels out of range.
    pub fn level(&self, level: u32) -> &[PoolHandle] {
        match self.slot_index(level) {
            Ok(index) => &self.levels[index],
            Err(_) => &[],
        }
    }

    /// First object found from the bottom up, skipping hidden ones unless accepted.
    pub fn get_any(&self, pool: &ObjectPool<HexObject>, accept_hidden: bool) -> Option<PoolHandle> {
        self.iter()
            .find(|h| pool.get(*h).is_some_and(|o| accept_hidden || !o.hidden))
    }

    /// Every object, skipping hidden ones unless accepted.
    pub fn get_all(&self, pool: &ObjectPool<HexObject>, accept_hidden: bool) -> Vec<PoolHandle> {
        self.iter()
            .filter(|h| pool.get(*h).is_some_and(|o| accept_hidden || !o.hidden))
            .collect()
    }

    /// Highest height level recorded by any object; 0 for an empty cell.
    ///
    /// Scans from the top level down and stops at the first level that lifts
    /// the result above the baseline of 1.
    pub fn highest_occupied_level(&self, pool: &ObjectPool<HexObject>) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let mut result = 1.0_f32;
        for level in self.levels.iter().rev() {
            for obj in level.iter().filter_map(|h| pool.get(*h)) {
                result = result.max(obj.height_level);
            }
            if result > 1.0 {
                break;
            }
        }
        result
    }

    /// Whether a structure of type `ty` may join `level` without breaking
    /// the slot exclusivity rules.
    pub fn is_available_for(
        &self,
        level: u32,
        ty: StructureType,
        pool: &ObjectPool<HexObject>,
    ) -> bool {
        let Some(slot) = ty.slot() else {
            return false;
        };
        self.level(level)
            .iter()
            .filter_map(|h| pool.get(*h))
            .filter_map(|o| o.structure.slot())
            .all(|existing| slot.compatible_with(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(size: usize) -> ObjectPool<HexObject> {
        ObjectPool::new(size, false)
    }

    fn spawn(pool: &mut ObjectPool<HexObject>, level: f32, ty: StructureType) -> PoolHandle {
        let h = pool.acquire(true).unwrap();
        let obj = pool.get_mut(h).unwrap();
        obj.height_level = level;
        obj.structure = ty;
        h
    }

    fn assert_consistent(cell: &HexCell) {
        let sum: usize = (1..=cell.max_height_level())
            .map(|l| cell.object_count(l))
            .sum();
        assert_eq!(cell.object_count(0), sum, "total must equal the level sum");
        assert_eq!(cell.is_empty(), sum == 0);
    }

    // ── place_object ────────────────────────────────────────────────

    #[test]
    fn place_single_object_marks_cell_occupied() {
        let mut pool = pool(4);
        let mut cell = HexCell::new(HexCoord::new(3, 4), 5);
        let h = spawn(&mut pool, 1.0, StructureType::Floor);

        assert!(cell.place_object(h, 1).is_ok());
        assert_eq!(cell.object_count(0), 1);
        assert_eq!(cell.object_count(1), 1);
        assert!(!cell.is_empty());
        assert!(cell.has_something_on_level(1));
        assert_consistent(&cell);
    }

    #[test]
    fn place_rejects_levels_out_of_range() {
        let mut pool = pool(2);
        let mut cell = HexCell::new(HexCoord::new(0, 0), 5);
        let h = spawn(&mut pool, 1.0, StructureType::Floor);

        assert_eq!(cell.place_object(h, 0), Err(LevelOutOfRange { level: 0, max: 5 }));
        assert!(cell.place_object(h, 6).is_err());
        assert!(cell.is_empty());
    }

    // ── queries ─────────────────────────────────────────────────────

    #[test]
    #[should_panic(expected = "outside the cell's range")]
    fn counting_above_max_level_panics() {
        let cell = HexCell::new(HexCoord::new(0, 0), 5);
        cell.object_count(6);
    }

    #[test]
    fn try_count_reports_range_error() {
        let cell = HexCell::new(HexCoord::new(0, 0), 5);
        assert_eq!(cell.try_object_count(6), Err(LevelOutOfRange { level: 6, max: 5 }));
        assert_eq!(cell.try_object_count(5), Ok(0));
    }

    #[test]
    fn highest_level_of_empty_cell_is_zero() {
        let pool = pool(1);
        let cell = HexCell::new(HexCoord::new(0, 0), 5);
        assert_eq!(cell.highest_occupied_level(&pool), 0.0);
    }

    #[test]
    fn highest_level_reports_half_levels() {
        let mut pool = pool(4);
        let mut cell = HexCell::new(HexCoord::new(0, 0), 5);
        let low = spawn(&mut pool, 1.0, StructureType::Floor);
        let high = spawn(&mut pool, 2.5, StructureType::Floor);
        cell.place_object(low, 1).unwrap();
        cell.place_object(high, 3).unwrap();
        assert_eq!(cell.highest_occupied_level(&pool), 2.5);
    }

    #[test]
    fn get_any_skips_hidden_unless_accepted() {
        let mut pool = pool(2);
        let mut cell = HexCell::new(HexCoord::new(0, 0), 5);
        let h = spawn(&mut pool, 1.0, StructureType::Object);
        pool.get_mut(h).unwrap().hidden = true;
        cell.place_object(h, 1).unwrap();

        assert_eq!(cell.get_any(&pool, false), None);
        assert_eq!(cell.get_any(&pool, true), Some(h));
        assert_eq!(cell.get_all(&pool, true), vec![h]);
        assert!(cell.get_all(&pool, false).is_empty());
    }

    // ── removal ─────────────────────────────────────────────────────

    #[test]
    fn place_then_remove_restores_state() {
        let mut pool = pool(3);
        let mut cell = HexCell::new(HexCoord::new(1, 1), 5);
        let keep = spawn(&mut pool, 2.0, StructureType::Wall);
        cell.place_object(keep, 2).unwrap();
        let before: Vec<_> = cell.iter().collect();

        let extra = spawn(&mut pool, 2.0, StructureType::Floor);
        cell.place_object(extra, 2).unwrap();
        assert!(cell.remove_object(extra, &mut pool));

        assert_eq!(cell.iter().collect::<Vec<_>>(), before);
        assert!(!pool.is_active(extra), "removed object must return to the pool");
        assert!(!cell.remove_object(extra, &mut pool));
        assert_consistent(&cell);
    }

    #[test]
    fn clearing_twice_is_idempotent() {
        let mut pool = pool(5);
        let mut cell = HexCell::new(HexCoord::new(0, 0), 5);
        for level in 1..=3 {
            let h = spawn(&mut pool, level as f32, StructureType::Floor);
            cell.place_object(h, level).unwrap();
        }

        assert_eq!(cell.remove_all_objects(&mut pool), 3);
        assert_eq!(cell.remove_all_objects(&mut pool), 0);
        assert!(cell.is_empty());
        assert_eq!(pool.count_active(), 0);
        assert_consistent(&cell);
    }

    #[test]
    fn remove_objects_clears_only_one_level() {
        let mut pool = pool(5);
        let mut cell = HexCell::new(HexCoord::new(0, 0), 5);
        for level in [1, 2, 2] {
            let h = spawn(&mut pool, level as f32, StructureType::Object);
            cell.place_object(h, level).unwrap();
        }

        assert_eq!(cell.remove_objects(2, &mut pool), Ok(2));
        assert_eq!(cell.object_count(0), 1);
        assert_eq!(pool.count_active(), 1);
        assert!(cell.remove_objects(9, &mut pool).is_err());
        assert_consistent(&cell);
    }

    // ── exclusivity ─────────────────────────────────────────────────

    #[test]
    fn availability_follows_slot_rules() {
        let mut pool = pool(4);
        let mut cell = HexCell::new(HexCoord::new(0, 0), 5);
        assert!(cell.is_available_for(1, StructureType::Roof, &pool));
        assert!(!cell.is_available_for(1, StructureType::Undefined, &pool));

        let floor = spawn(&mut pool, 1.0, StructureType::Floor);
        cell.place_object(floor, 1).unwrap();
        assert!(cell.is_available_for(1, StructureType::Wall, &pool));
        assert!(cell.is_available_for(1, StructureType::Object, &pool));
        assert!(!cell.is_available_for(1, StructureType::Floor, &pool));
        assert!(!cell.is_available_for(1, StructureType::Room, &pool));
        assert!(!cell.is_available_for(1, StructureType::Roof, &pool));
        assert!(cell.is_available_for(2, StructureType::Room, &pool));
    }
}
