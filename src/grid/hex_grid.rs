use std::fmt;

use bevy::prelude::*;

use super::GridSettings;
use super::cell::{HexCell, LevelOutOfRange};
use super::coords::HexCoord;
use super::layout::GridLayout;
use super::object::HexObject;
use super::terrain_probe::TerrainProbe;
use crate::math;
use crate::pool::{ObjectPool, PoolHandle};

/// Why a grid edit was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    OutOfBounds(HexCoord),
    /// The level is outside `[1, max]`.
    LevelOutOfRange(LevelOutOfRange),
    /// The cell contains hidden objects and hidden removal was not requested.
    HiddenContent(HexCoord),
    /// There was nothing to remove.
    NothingToRemove(HexCoord),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds(c) => write!(f, "cell {c} is outside the grid"),
            GridError::LevelOutOfRange(e) => write!(f, "{e}"),
            GridError::HiddenContent(c) => write!(f, "cell {c} contains hidden objects"),
            GridError::NothingToRemove(c) => write!(f, "nothing to remove in cell {c}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::LevelOutOfRange(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LevelOutOfRange> for GridError {
    fn from(e: LevelOutOfRange) -> Self {
        GridError::LevelOutOfRange(e)
    }
}

/// Terrain tile under a cell.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct SupportBase {
    /// Cell the base belongs to.
    pub coords: HexCoord,
    /// Level the terrain surface reaches (`x.5` on half levels).
    pub height_level: f32,
    /// World Y of the terrain surface.
    pub y: f32,
    /// Set while the cell holds hidden objects; blocks plain removal.
    pub objects_hidden: bool,
    /// Frozen bases are skipped by terrain shaping.
    pub frozen: bool,
    /// Which of the three alternating tile materials to use.
    pub material: usize,
}

impl SupportBase {
    fn new(coords: HexCoord, y: f32) -> Self {
        Self {
            coords,
            height_level: 1.0,
            y,
            objects_hidden: false,
            frozen: false,
            material: base_material_index(coords),
        }
    }
}

/// Alternating tile pattern: columns cycle through three materials and odd
/// rows are offset by one so no two neighbours match.
pub fn base_material_index(coords: HexCoord) -> usize {
    let column = coords.x.rem_euclid(3) as usize;
    if coords.is_odd_row() {
        (column + 2) % 3
    } else {
        column
    }
}

/// Cell storage plus support bases, addressed by [`HexCoord`].
pub struct HexGrid {
    layout: GridLayout,
    cells: Vec<HexCell>,
    bases: Vec<SupportBase>,
    half_level_threshold: f32,
    probe_max_distance: f32,
}

impl HexGrid {
    /// Allocates every cell and a ground-level support base per cell.
    pub fn new(layout: GridLayout, settings: &GridSettings) -> Self {
        let cells = layout
            .coords()
            .map(|c| HexCell::new(c, layout.max_height_level))
            .collect();
        let bases = layout
            .coords()
            .map(|c| SupportBase::new(c, layout.origin.y))
            .collect();
        info!(
            "Created {}x{} hex grid (cell size {}, cell height {}, max level {})",
            layout.size_x,
            layout.size_y,
            layout.cell_size,
            layout.cell_height,
            layout.max_height_level
        );
        Self {
            layout,
            cells,
            bases,
            half_level_threshold: settings.half_level_threshold,
            probe_max_distance: settings.probe_max_distance,
        }
    }

    /// Grid geometry.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Bounds check only.
    pub fn cell_exists(&self, coord: HexCoord) -> bool {
        self.layout.cell_exists(coord)
    }

    /// The cell at `coord`.
    pub fn cell(&self, coord: HexCoord) -> Option<&HexCell> {
        self.layout.index_of(coord).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, coord: HexCoord) -> Result<&mut HexCell, GridError> {
        let index = self
            .layout
            .index_of(coord)
            .ok_or(GridError::OutOfBounds(coord))?;
        Ok(&mut self.cells[index])
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.iter()
    }

    /// The support base under `coord`.
    pub fn support_base(&self, coord: HexCoord) -> Option<&SupportBase> {
        self.layout.index_of(coord).map(|i| &self.bases[i])
    }

    fn support_base_mut(&mut self, coord: HexCoord) -> Option<&mut SupportBase> {
        self.layout.index_of(coord).map(|i| &mut self.bases[i])
    }

    /// Every support base, row by row.
    pub fn support_bases(&self) -> impl Iterator<Item = &SupportBase> {
        self.bases.iter()
    }

    /// Whether the cell (or one of its levels) is empty.
    ///
    /// `level` 0 checks the whole cell. Cells outside the grid are never empty.
    ///
    /// # Panics
    /// If `level` is above the grid's maximum.
    pub fn cell_is_empty(&self, coord: HexCoord, level: u32) -> bool {
        let Some(cell) = self.cell(coord) else {
            return false;
        };
        if level >= 1 {
            !cell.has_something_on_level(level)
        } else {
            cell.is_empty()
        }
    }

    // ── Editing ────────────────────────────────────────────────────

    /// Single mutation entry point.
    ///
    /// `Some(handle)` stores the object on `level`; `None` removes the
    /// objects of `level`, or of the whole cell when `level` is 0. Removal is
    /// refused while the cell holds hidden objects. Returns how many objects
    /// were placed or removed.
    pub fn edit_cell(
        &mut self,
        coord: HexCoord,
        object: Option<PoolHandle>,
        level: u32,
        pool: &mut ObjectPool<HexObject>,
    ) -> Result<usize, GridError> {
        match object {
            Some(handle) => {
                self.cell_mut(coord)?.place_object(handle, level)?;
                debug!("Cell {coord}: placed object on level {level}");
                Ok(1)
            }
            None if self.cell_is_empty(coord, 0) => Err(GridError::NothingToRemove(coord)),
            None => self.remove_objects(coord, false, level, pool),
        }
    }

    /// Removes the objects of one level, or of the whole cell when `level` is 0.
    ///
    /// Clearing the whole cell also clears the hidden flag of its base.
    pub fn remove_objects(
        &mut self,
        coord: HexCoord,
        remove_hidden: bool,
        level: u32,
        pool: &mut ObjectPool<HexObject>,
    ) -> Result<usize, GridError> {
        let hidden = self
            .support_base(coord)
            .ok_or(GridError::OutOfBounds(coord))?
            .objects_hidden;
        if hidden && !remove_hidden {
            warn!("Cell {coord} contains hidden objects; not removing");
            return Err(GridError::HiddenContent(coord));
        }

        if level == 0 {
            let removed = self.cell_mut(coord)?.remove_all_objects(pool);
            if let Some(base) = self.support_base_mut(coord) {
                base.objects_hidden = false;
            }
            debug!("Cell {coord} is now empty");
            return Ok(removed);
        }

        match self.cell_mut(coord)?.remove_objects(level, pool)? {
            0 => Err(GridError::NothingToRemove(coord)),
            removed => {
                debug!("Cell {coord}: cleared level {level}");
                Ok(removed)
            }
        }
    }

    /// Sets the hidden flag of a cell's objects (`level` 0 = every level)
    /// and mirrors it on the support base. Returns how many objects were
    /// touched; with none (empty level, level out of range, missing cell)
    /// the base keeps its flag.
    pub fn hide_objects_in_cell(
        &mut self,
        coord: HexCoord,
        hide: bool,
        level: u32,
        pool: &mut ObjectPool<HexObject>,
    ) -> usize {
        let Some(cell) = self.cell(coord) else {
            return 0;
        };
        let handles: Vec<PoolHandle> = if level < 1 {
            cell.iter().collect()
        } else {
            cell.level(level).to_vec()
        };
        let mut touched = 0;
        for handle in handles {
            if let Some(obj) = pool.get_mut(handle) {
                obj.hidden = hide;
                touched += 1;
            }
        }
        if touched > 0
            && let Some(base) = self.support_base_mut(coord)
        {
            base.objects_hidden = hide;
        }
        touched
    }

    /// Hides or shows every object on the grid.
    pub fn hide_all_objects(&mut self, hide: bool, pool: &mut ObjectPool<HexObject>) {
        for (cell, base) in self.cells.iter().zip(self.bases.iter_mut()) {
            if cell.is_empty() {
                continue;
            }
            for handle in cell.iter() {
                if let Some(obj) = pool.get_mut(handle) {
                    obj.hidden = hide;
                }
            }
            base.objects_hidden = hide;
        }
    }

    /// Empties every cell and clears every hidden flag.
    pub fn reset_grid(&mut self, pool: &mut ObjectPool<HexObject>) -> usize {
        let mut removed = 0;
        for (cell, base) in self.cells.iter_mut().zip(self.bases.iter_mut()) {
            removed += cell.remove_all_objects(pool);
            base.objects_hidden = false;
        }
        info!("Grid reset, {removed} objects removed");
        removed
    }

    // ── Heights ────────────────────────────────────────────────────

    /// Height level a world Y falls on: `1 + trunc(y / cell_height)`, plus
    /// `0.5` when the remainder reaches the half-level threshold.
    pub fn height_level_from_pos_y(&self, y: f32) -> f32 {
        let raw = (y - self.layout.origin.y) / self.layout.cell_height;
        let half = if math::can_be_rounded_up(raw, self.half_level_threshold) {
            0.5
        } else {
            0.0
        };
        1.0 + raw.trunc() + half
    }

    /// Probes upward from `origin` and rounds the hit (or the origin itself
    /// when nothing is hit) to the nearest whole unit.
    pub fn y_where_hit_above_rounded_up(&self, origin: Vec3, probe: &dyn TerrainProbe) -> i32 {
        let y = probe
            .probe_up(origin, self.probe_max_distance)
            .unwrap_or(origin.y);
        (y + 0.5) as i32
    }

    fn rest_on_terrain(&mut self, index: usize, probe: &dyn TerrainProbe) {
        let coord = self.layout.coord_at(index);
        let Some(center) = self.layout.cell_center(coord, self.layout.origin.y) else {
            return;
        };
        let y = self.y_where_hit_above_rounded_up(center, probe) as f32;
        let height_level = self.height_level_from_pos_y(y);
        let base = &mut self.bases[index];
        base.y = y;
        base.height_level = height_level;
    }

    /// Rests every support base on the terrain under it.
    pub fn populate_support_bases(&mut self, probe: &dyn TerrainProbe) {
        for index in 0..self.bases.len() {
            self.rest_on_terrain(index, probe);
        }
        let highest = self
            .bases
            .iter()
            .map(|b| b.height_level)
            .fold(1.0_f32, f32::max);
        info!(
            "Populated {} support bases (highest level {highest})",
            self.bases.len()
        );
    }

    /// Re-probes the given cells, skipping frozen bases and unknown cells.
    /// Returns how many bases moved.
    pub fn shape_terrain(&mut self, coords: &[HexCoord], probe: &dyn TerrainProbe) -> usize {
        let mut shaped = 0;
        for coord in coords {
            let Some(index) = self.layout.index_of(*coord) else {
                continue;
            };
            if self.bases[index].frozen {
                continue;
            }
            self.rest_on_terrain(index, probe);
            shaped += 1;
        }
        shaped
    }

    /// Freezes or unfreezes a support base. False for unknown cells.
    pub fn set_support_base_frozen(&mut self, coord: HexCoord, frozen: bool) -> bool {
        match self.support_base_mut(coord) {
            Some(base) => {
                base.frozen = frozen;
                true
            }
            None => false,
        }
    }

    // ── Lookup ─────────────────────────────────────────────────────

    /// World Y of the support base under a cell.
    pub fn cell_y(&self, coord: HexCoord) -> Option<f32> {
        self.support_base(coord).map(|b| b.y)
    }

    /// Centre of a cell; on the grid plane when `default_y_axis` is set,
    /// otherwise on its support base.
    pub fn cell_center(&self, coord: HexCoord, default_y_axis: bool) -> Option<Vec3> {
        let y = if default_y_axis {
            self.layout.origin.y
        } else {
            self.cell_y(coord)?
        };
        self.layout.cell_center(coord, y)
    }

    /// Any object in the cell.
    pub fn object_in_cell(
        &self,
        coord: HexCoord,
        accept_hidden: bool,
        pool: &ObjectPool<HexObject>,
    ) -> Option<PoolHandle> {
        self.cell(coord)?.get_any(pool, accept_hidden)
    }

    /// Every object in the cell.
    pub fn objects_in_cell(
        &self,
        coord: HexCoord,
        accept_hidden: bool,
        pool: &ObjectPool<HexObject>,
    ) -> Vec<PoolHandle> {
        self.cell(coord)
            .map(|c| c.get_all(pool, accept_hidden))
            .unwrap_or_default()
    }

    /// Minimal grid for tests.
    #[cfg(test)]
    pub fn square(size: i32, max_height_level: u32) -> Self {
        Self::new(GridLayout::square(size, max_height_level), &GridSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::terrain_probe::{FixedTerrain, FlatTerrain};

    fn place(
        grid: &mut HexGrid,
        pool: &mut ObjectPool<HexObject>,
        c: HexCoord,
        level: u32,
    ) -> PoolHandle {
        let h = pool.acquire(true).unwrap();
        pool.get_mut(h).unwrap().height_level = level as f32;
        grid.edit_cell(c, Some(h), level, pool).unwrap();
        h
    }

    // ── edit_cell ───────────────────────────────────────────────────

    #[test]
    fn placing_in_ten_by_ten_grid() {
        let mut grid = HexGrid::square(10, 5);
        let mut pool = ObjectPool::<HexObject>::new(5, false);
        let c = HexCoord::new(3, 4);
        place(&mut grid, &mut pool, c, 1);

        assert_eq!(grid.cell(c).unwrap().object_count(0), 1);
        assert!(!grid.cell_is_empty(c, 0));
        assert!(!grid.cell_is_empty(c, 1));
        assert!(grid.cell_is_empty(c, 2));
    }

    #[test]
    fn clearing_cell_returns_objects_to_pool() {
        let mut grid = HexGrid::square(10, 5);
        let mut pool = ObjectPool::<HexObject>::new(5, false);
        let c = HexCoord::new(2, 2);
        let h = place(&mut grid, &mut pool, c, 1);

        assert_eq!(grid.edit_cell(c, None, 0, &mut pool), Ok(1));
        assert!(grid.cell_is_empty(c, 0));
        assert!(!pool.is_active(h));
        assert_eq!(pool.count_inactive(), 5);
    }

    #[test]
    fn edit_outside_grid_is_refused() {
        let mut grid = HexGrid::square(4, 5);
        let mut pool = ObjectPool::<HexObject>::new(2, false);
        let h = pool.acquire(true).unwrap();
        let c = HexCoord::new(4, 0);
        assert_eq!(grid.edit_cell(c, Some(h), 1, &mut pool), Err(GridError::OutOfBounds(c)));
        assert_eq!(grid.edit_cell(c, None, 0, &mut pool), Err(GridError::OutOfBounds(c)));
        assert!(!grid.cell_is_empty(c, 0));
    }

    #[test]
    fn removing_from_empty_cell_reports_nothing() {
        let mut grid = HexGrid::square(4, 5);
        let mut pool = ObjectPool::<HexObject>::new(2, false);
        let c = HexCoord::new(1, 1);
        assert_eq!(grid.edit_cell(c, None, 0, &mut pool), Err(GridError::NothingToRemove(c)));

        place(&mut grid, &mut pool, c, 2);
        assert_eq!(grid.edit_cell(c, None, 1, &mut pool), Err(GridError::NothingToRemove(c)));
        assert_eq!(grid.edit_cell(c, None, 2, &mut pool), Ok(1));
    }

    #[test]
    fn placing_above_max_level_fails() {
        let mut grid = HexGrid::square(4, 3);
        let mut pool = ObjectPool::<HexObject>::new(2, false);
        let h = pool.acquire(true).unwrap();
        let result = grid.edit_cell(HexCoord::new(0, 0), Some(h), 4, &mut pool);
        assert!(matches!(result, Err(GridError::LevelOutOfRange(_))));
    }

    // ── hiding ──────────────────────────────────────────────────────

    #[test]
    fn hidden_cells_refuse_plain_removal() {
        let mut grid = HexGrid::square(4, 5);
        let mut pool = ObjectPool::<HexObject>::new(3, false);
        let c = HexCoord::new(1, 2);
        let h = place(&mut grid, &mut pool, c, 1);

        assert_eq!(grid.hide_objects_in_cell(c, true, 0, &mut pool), 1);
        assert!(pool.get(h).unwrap().hidden);
        assert!(grid.support_base(c).unwrap().objects_hidden);
        assert_eq!(grid.edit_cell(c, None, 0, &mut pool), Err(GridError::HiddenContent(c)));
        assert!(pool.is_active(h));

        assert_eq!(grid.remove_objects(c, true, 0, &mut pool), Ok(1));
        assert!(!grid.support_base(c).unwrap().objects_hidden);
    }

    #[test]
    fn hiding_empty_cell_does_nothing() {
        let mut grid = HexGrid::square(4, 5);
        let mut pool = ObjectPool::<HexObject>::new(1, false);
        assert_eq!(grid.hide_objects_in_cell(HexCoord::new(0, 0), true, 0, &mut pool), 0);
        assert!(!grid.support_base(HexCoord::new(0, 0)).unwrap().objects_hidden);
    }

    #[test]
    fn hiding_a_level_without_objects_keeps_cell_removable() {
        let mut grid = HexGrid::square(4, 5);
        let mut pool = ObjectPool::<HexObject>::new(2, false);
        let c = HexCoord::new(2, 2);
        place(&mut grid, &mut pool, c, 1);

        assert_eq!(grid.hide_objects_in_cell(c, true, 3, &mut pool), 0);
        assert_eq!(grid.hide_objects_in_cell(c, true, 9, &mut pool), 0);
        assert!(!grid.support_base(c).unwrap().objects_hidden);
        assert_eq!(grid.edit_cell(c, None, 0, &mut pool), Ok(1));
    }

    #[test]
    fn hide_all_then_reset_clears_everything() {
        let mut grid = HexGrid::square(4, 5);
        let mut pool = ObjectPool::<HexObject>::new(4, false);
        let a = place(&mut grid, &mut pool, HexCoord::new(0, 0), 1);
        place(&mut grid, &mut pool, HexCoord::new(3, 3), 2);

        grid.hide_all_objects(true, &mut pool);
        assert!(pool.get(a).unwrap().hidden);
        assert_eq!(grid.support_bases().filter(|b| b.objects_hidden).count(), 2);

        assert_eq!(grid.reset_grid(&mut pool), 2);
        assert!(grid.cells().all(|c| c.is_empty()));
        assert!(grid.support_bases().all(|b| !b.objects_hidden));
        assert_eq!(pool.count_active(), 0);
    }

    // ── heights ─────────────────────────────────────────────────────

    #[test]
    fn height_level_from_y_uses_half_levels() {
        let grid = HexGrid::square(2, 5);
        assert_eq!(grid.height_level_from_pos_y(0.0), 1.0);
        assert_eq!(grid.height_level_from_pos_y(1.0), 1.5);
        assert_eq!(grid.height_level_from_pos_y(2.0), 2.0);
        assert_eq!(grid.height_level_from_pos_y(4.9), 3.0);
        assert_eq!(grid.height_level_from_pos_y(5.0), 3.5);
    }

    #[test]
    fn probe_hit_is_rounded_and_miss_keeps_origin() {
        let grid = HexGrid::square(2, 5);
        let terrain = FixedTerrain(vec![(Vec2::ZERO, 3.6)]);
        assert_eq!(grid.y_where_hit_above_rounded_up(Vec3::ZERO, &terrain), 4);
        assert_eq!(grid.y_where_hit_above_rounded_up(Vec3::new(9.0, 1.2, 9.0), &terrain), 1);
    }

    #[test]
    fn populate_rests_bases_on_terrain() {
        let mut grid = HexGrid::square(2, 5);
        let center = grid.cell_center(HexCoord::new(1, 0), true).unwrap();
        let terrain = FixedTerrain(vec![(Vec2::new(center.x, center.z), 2.2)]);

        grid.populate_support_bases(&terrain);
        let raised = grid.support_base(HexCoord::new(1, 0)).unwrap();
        assert_eq!(raised.y, 2.0);
        assert_eq!(raised.height_level, 2.0);
        assert_eq!(grid.cell_y(HexCoord::new(0, 0)), Some(0.0));
        assert_eq!(grid.cell_center(HexCoord::new(1, 0), false).unwrap().y, 2.0);
    }

    #[test]
    fn shaping_skips_frozen_bases() {
        let mut grid = HexGrid::square(2, 5);
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(1, 1);
        let ca = grid.cell_center(a, true).unwrap();
        let cb = grid.cell_center(b, true).unwrap();
        let terrain = FixedTerrain(vec![
            (Vec2::new(ca.x, ca.z), 4.0),
            (Vec2::new(cb.x, cb.z), 4.0),
        ]);

        assert!(grid.set_support_base_frozen(a, true));
        assert_eq!(grid.shape_terrain(&[a, b, HexCoord::new(9, 9)], &terrain), 1);
        assert_eq!(grid.cell_y(a), Some(0.0));
        assert_eq!(grid.cell_y(b), Some(4.0));

        grid.populate_support_bases(&FlatTerrain);
        assert_eq!(grid.cell_y(b), Some(0.0));
    }

    #[test]
    fn base_materials_alternate() {
        assert_eq!(base_material_index(HexCoord::new(0, 0)), 0);
        assert_eq!(base_material_index(HexCoord::new(1, 0)), 1);
        assert_eq!(base_material_index(HexCoord::new(0, 1)), 2);
        assert_eq!(base_material_index(HexCoord::new(1, 1)), 0);
        assert_eq!(base_material_index(HexCoord::new(2, 1)), 1);
    }
}
