use bevy::prelude::*;

use super::catalog::{MeshDescriptor, ObjectCatalog};
use super::error::{EditMode, EditOutcome, PlacementError, PlacementNotice};
use super::instruction::BuildInstruction;
use super::preview::{self, PreviewFrame, PreviewState};
use super::{PlacementSettings, TowerFill};
use crate::grid::{
    GridError, HexCoord, HexDirection, HexGrid, HexObject, LevelOutOfRange, MeshId, Turn,
};
use crate::math;
use crate::pool::{ObjectPool, PoolHandle};

/// Two-corner rectangle selection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MultiSelection {
    start: Option<HexCoord>,
    active: bool,
}

/// The placement engine: selection state, preview and every edit on the grid.
///
/// Owns the grid, the catalog and the object pool; nothing else mutates them.
pub struct ObjectPlacer {
    grid: HexGrid,
    catalog: ObjectCatalog,
    pool: ObjectPool<HexObject>,
    settings: PlacementSettings,
    direction: HexDirection,
    height_level: f32,
    preferred_height_level: f32,
    preferred_support_level: f32,
    preview: PreviewState,
    frame: Option<PreviewFrame>,
    support_level: Option<f32>,
    multi_selection: MultiSelection,
    notices: Vec<PlacementNotice>,
}

impl ObjectPlacer {
    /// Engine over an existing grid, catalog and pool.
    pub fn new(
        grid: HexGrid,
        catalog: ObjectCatalog,
        pool: ObjectPool<HexObject>,
        settings: PlacementSettings,
    ) -> Self {
        let direction = settings.initial_direction;
        Self {
            grid,
            catalog,
            pool,
            settings,
            direction,
            height_level: 1.0,
            preferred_height_level: 1.0,
            preferred_support_level: 1.0,
            preview: PreviewState::Idle,
            frame: None,
            support_level: None,
            multi_selection: MultiSelection::default(),
            notices: Vec::new(),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The grid being edited.
    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Mutable grid access for terrain shaping.
    pub fn grid_mut(&mut self) -> &mut HexGrid {
        &mut self.grid
    }

    /// The placeable meshes.
    pub fn catalog(&self) -> &ObjectCatalog {
        &self.catalog
    }

    /// Pooled objects, placed or not.
    pub fn pool(&self) -> &ObjectPool<HexObject> {
        &self.pool
    }

    /// Current policies.
    pub fn settings(&self) -> &PlacementSettings {
        &self.settings
    }

    /// Mutable policies.
    pub fn settings_mut(&mut self) -> &mut PlacementSettings {
        &mut self.settings
    }

    /// Facing of the next object.
    pub fn direction(&self) -> HexDirection {
        self.direction
    }

    /// Active level, always within `[1, max]`.
    pub fn height_level(&self) -> f32 {
        self.height_level
    }

    /// Active level rounded half-up.
    pub fn height_level_rounded_up(&self) -> u32 {
        math::round_half_up(self.height_level)
    }

    /// Active level rounded down.
    pub fn height_level_rounded_down(&self) -> u32 {
        math::round_down(self.height_level)
    }

    /// Preview lifecycle state.
    pub fn preview_state(&self) -> PreviewState {
        self.preview
    }

    /// Latest preview, if a cell has been previewed.
    pub fn preview_frame(&self) -> Option<&PreviewFrame> {
        self.frame.as_ref()
    }

    /// Selected catalog item.
    pub fn current_mesh(&self) -> Option<(MeshId, &MeshDescriptor)> {
        self.catalog.current()
    }

    /// `(free, total)` pooled objects.
    pub fn objects_remaining(&self) -> (usize, usize) {
        (self.pool.count_inactive(), self.pool.len())
    }

    /// Hands out and clears the pending notifications.
    pub fn drain_notices(&mut self) -> Vec<PlacementNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Human-readable summary of the next placement.
    pub fn placement_info(&self) -> String {
        match self.catalog.current() {
            Some((_, mesh)) => format!(
                "Selected item: {} ({})\nDirection: {}\nHeight level: {}",
                mesh.name,
                mesh.structure.label(),
                self.direction.label(),
                self.height_level
            ),
            None => "Can't access object catalog or it is empty.".to_string(),
        }
    }

    fn notify_remaining(&mut self) {
        let (remaining, total) = self.objects_remaining();
        self.notices
            .push(PlacementNotice::ObjectsRemaining { remaining, total });
    }

    fn notify_failure(&mut self, cell: HexCoord, error: PlacementError) {
        warn!("Cell {cell}: {error}");
        self.notices
            .push(PlacementNotice::PlacementFailed { cell, error });
    }

    // ── Editing ────────────────────────────────────────────────────

    /// Adds to or removes from a cell.
    ///
    /// - Add with an instruction places exactly what it describes (its own
    ///   cell wins over `cell`).
    /// - Add with `full_height` builds a tower (see [`TowerFill`]).
    /// - Otherwise one object goes on the active level.
    /// - Remove clears the whole cell with `full_height`, else the active
    ///   level rounded down.
    ///
    /// Failures leave the grid and pool untouched, except a tower keeps the
    /// objects placed before it ran out.
    pub fn add_or_remove_object(
        &mut self,
        cell: HexCoord,
        full_height: bool,
        remove: bool,
        instruction: Option<&BuildInstruction>,
    ) -> Result<EditOutcome, PlacementError> {
        let cell = instruction.map_or(cell, |i| i.cell);
        let result = self.apply_edit(cell, full_height, remove, instruction);
        match result {
            Ok(outcome) => {
                self.notices.push(PlacementNotice::CellChanged { cell });
                self.notify_remaining();
                if self.preview.cell() == Some(cell) {
                    self.preview = PreviewState::Committed { cell };
                }
                self.refresh_preview();
                debug!("Cell {cell}: {outcome:?}");
            }
            Err(error) => self.notify_failure(cell, error),
        }
        result
    }

    fn apply_edit(
        &mut self,
        cell: HexCoord,
        full_height: bool,
        remove: bool,
        instruction: Option<&BuildInstruction>,
    ) -> Result<EditOutcome, PlacementError> {
        if !self.grid.cell_exists(cell) {
            return Err(PlacementError::CellOutOfBounds(cell));
        }

        if remove {
            let level = if full_height {
                0
            } else {
                self.height_level_rounded_down()
            };
            let count = self.grid.edit_cell(cell, None, level, &mut self.pool)?;
            return Ok(EditOutcome::Removed { count });
        }

        let count = match instruction {
            Some(i) => {
                debug!("{}", i.info());
                self.add_object(i.mesh, i.cell, i.direction, i.height_level)
                    .map(|_| 1)?
            }
            None if full_height => self.build_tower(cell)?,
            None => {
                let (mesh, _) = self.catalog.current().ok_or(PlacementError::EmptyCatalog)?;
                self.add_object(mesh, cell, self.direction, self.height_level)
                    .map(|_| 1)?
            }
        };
        Ok(EditOutcome::Added { count })
    }

    /// Places one object. Checks every precondition before touching the pool.
    fn add_object(
        &mut self,
        mesh_id: MeshId,
        cell: HexCoord,
        direction: HexDirection,
        height_level: f32,
    ) -> Result<PoolHandle, PlacementError> {
        let mesh = self
            .catalog
            .get(mesh_id)
            .ok_or(PlacementError::EmptyCatalog)?;
        let placement = preview::placement_for(&self.grid, cell, height_level, mesh, direction)
            .ok_or(PlacementError::CellOutOfBounds(cell))?;
        let object = HexObject {
            coords: cell,
            height_level,
            direction,
            mesh: Some(mesh_id),
            structure: mesh.structure,
            hidden: false,
            position: placement.position,
            rotation_y: placement.rotation_y,
        };
        let slot = object.slot_level();

        let grid_cell = self
            .grid
            .cell(cell)
            .ok_or(PlacementError::CellOutOfBounds(cell))?;
        let max = grid_cell.max_height_level();
        if !(1..=max).contains(&slot) {
            return Err(GridError::from(LevelOutOfRange { level: slot, max }).into());
        }
        if !self.settings.add_to_occupied && grid_cell.has_something_on_level(slot) {
            return Err(PlacementError::LevelOccupied { cell, level: slot });
        }
        if self.settings.enforce_structure_rules
            && !grid_cell.is_available_for(slot, object.structure, &self.pool)
        {
            return Err(PlacementError::StructureConflict {
                cell,
                level: slot,
                structure: object.structure,
            });
        }

        let Some(handle) = self.pool.acquire(false) else {
            warn!("No more objects to add");
            return Err(PlacementError::PoolExhausted);
        };
        if let Some(obj) = self.pool.get_mut(handle) {
            *obj = object;
        }
        self.pool.activate(handle);
        if let Err(e) = self.grid.edit_cell(cell, Some(handle), slot, &mut self.pool) {
            self.pool.release(handle);
            return Err(e.into());
        }
        Ok(handle)
    }

    /// Levels a tower on the active level visits, in placement order.
    fn tower_levels(&self, half_height: bool) -> Vec<f32> {
        let step = if half_height { 0.5 } else { 1.0 };
        let max = self.grid.layout().max_height_level as f32;
        let start = self.height_level;
        let mut levels = Vec::new();
        match self.settings.tower_fill {
            TowerFill::Downward if start <= 1.0 => {
                let mut level = 1.0;
                while level <= max {
                    levels.push(level);
                    level += step;
                }
            }
            TowerFill::Upward => {
                let mut level = start;
                while level <= max {
                    levels.push(level);
                    level += step;
                }
            }
            TowerFill::Downward => {
                let floor = if start.fract() != 0.0 && !half_height {
                    1.5
                } else {
                    1.0
                };
                let mut level = start;
                while level >= floor {
                    levels.push(level);
                    level -= step;
                }
            }
        }
        levels
    }

    /// Fills the cell level by level with the selected item. Stops at the first
    /// failure and keeps what was already placed.
    fn build_tower(&mut self, cell: HexCoord) -> Result<usize, PlacementError> {
        let (mesh, desc) = self.catalog.current().ok_or(PlacementError::EmptyCatalog)?;
        let levels = self.tower_levels(desc.half_height);
        let mut placed = 0;
        for level in levels {
            match self.add_object(mesh, cell, self.direction, level) {
                Ok(_) => placed += 1,
                Err(e) if placed == 0 => return Err(e),
                Err(e) => {
                    warn!("Tower in {cell} stopped at level {level} after {placed} objects: {e}");
                    break;
                }
            }
        }
        Ok(placed)
    }

    /// Applies `mode` to every cell of the rectangle spanned by two corners.
    ///
    /// Adding uses one [`BuildInstruction`] per cell; removal clears whole
    /// cells; hiding hides whole cells. Refused cells are skipped, but running
    /// out of pooled objects aborts the rest. Returns how many cells changed.
    pub fn apply_to_rectangle(
        &mut self,
        a: HexCoord,
        b: HexCoord,
        mode: EditMode,
    ) -> Result<usize, PlacementError> {
        let mesh = match mode {
            EditMode::Add => Some(self.catalog.current().ok_or(PlacementError::EmptyCatalog)?.0),
            _ => None,
        };
        let mut changed = 0;
        for cell in HexCoord::rectangle(a, b) {
            let result = match (mode, mesh) {
                (EditMode::Add, Some(mesh)) => {
                    let instruction = BuildInstruction {
                        mesh,
                        cell,
                        direction: self.direction,
                        height_level: self.height_level,
                    };
                    self.add_or_remove_object(cell, false, false, Some(&instruction))
                }
                (EditMode::Hide, _) => self.hide_cell(cell, true),
                _ if self.grid.cell_is_empty(cell, 0) => {
                    debug!("Rectangle edit: {cell} is already empty");
                    continue;
                }
                _ => self.add_or_remove_object(cell, true, true, None),
            };
            match result {
                Ok(_) => changed += 1,
                Err(PlacementError::PoolExhausted) => {
                    warn!("Rectangle edit aborted after {changed} cells: pool exhausted");
                    return Err(PlacementError::PoolExhausted);
                }
                Err(e) => debug!("Rectangle edit skipped {cell}: {e}"),
            }
        }
        Ok(changed)
    }

    /// Hides or shows every object in a cell. Hidden cells refuse removal
    /// until shown again.
    pub fn hide_cell(&mut self, cell: HexCoord, hide: bool) -> Result<EditOutcome, PlacementError> {
        if !self.grid.cell_exists(cell) {
            return Err(PlacementError::CellOutOfBounds(cell));
        }
        let count = self
            .grid
            .hide_objects_in_cell(cell, hide, 0, &mut self.pool);
        if count == 0 {
            return Err(PlacementError::NothingToHide(cell));
        }
        self.notices.push(PlacementNotice::CellChanged { cell });
        self.refresh_preview();
        Ok(if hide {
            EditOutcome::Hidden { count }
        } else {
            EditOutcome::Shown { count }
        })
    }

    /// Shows every hidden object.
    pub fn show_all(&mut self) {
        self.grid.hide_all_objects(false, &mut self.pool);
        self.refresh_preview();
    }

    /// Empties the grid and returns every object to the pool.
    pub fn reset(&mut self) {
        self.grid.reset_grid(&mut self.pool);
        self.pool.release_all();
        self.reset_multi_selection();
        self.notify_remaining();
        self.refresh_preview();
    }

    // ── Rotation ───────────────────────────────────────────────────

    /// Turns the next object's facing one sixth to the left or right.
    pub fn change_rotation_for_next_object(&mut self, turn: Turn) {
        self.direction = self.direction.turned(turn);
        self.refresh_preview();
    }

    /// Copies the facing of a placed object. False if the handle is unknown.
    pub fn match_rotation(&mut self, handle: PoolHandle) -> bool {
        let Some(obj) = self.pool.get(handle).filter(|_| self.pool.is_active(handle)) else {
            warn!("Cannot match rotation; the selected object is not a placed object");
            return false;
        };
        self.direction = obj.direction;
        self.refresh_preview();
        true
    }

    /// Copies the facing of any visible object in a cell.
    pub fn match_rotation_in_cell(&mut self, cell: HexCoord) -> bool {
        match self.grid.object_in_cell(cell, false, &self.pool) {
            Some(handle) => self.match_rotation(handle),
            None => false,
        }
    }

    // ── Catalog selection ──────────────────────────────────────────

    /// Selects the next or previous catalog item, wrapping around.
    pub fn change_object(&mut self, next: bool) {
        if self.catalog.cycle(next) {
            self.refresh_preview();
        }
    }

    /// Selects the mesh of a placed object.
    pub fn pick_object(&mut self, handle: PoolHandle) -> bool {
        let mesh = self
            .pool
            .get(handle)
            .filter(|_| self.pool.is_active(handle))
            .and_then(|o| o.mesh);
        let Some(mesh) = mesh else {
            warn!("Cannot pick; the selected object is not a placed object");
            return false;
        };
        let picked = self.catalog.select(mesh);
        if picked {
            self.refresh_preview();
        }
        picked
    }

    /// Selects the mesh of any visible object in a cell.
    pub fn pick_object_in_cell(&mut self, cell: HexCoord) -> bool {
        match self.grid.object_in_cell(cell, false, &self.pool) {
            Some(handle) => self.pick_object(handle),
            None => {
                warn!("Cannot pick; cell {cell} holds no visible object");
                false
            }
        }
    }

    /// Groups the catalog by structure type.
    pub fn sort_catalog(&mut self) {
        self.catalog.sort_by_type();
    }

    /// Selects the item in a favourite slot.
    pub fn select_favorite(&mut self, slot: usize) -> bool {
        let selected = self.catalog.select_favorite(slot);
        if selected {
            self.refresh_preview();
        }
        selected
    }

    /// Stores the selected item in a favourite slot.
    pub fn save_current_to_favorites(&mut self, slot: usize) -> bool {
        self.catalog.save_current_to_favorites(slot)
    }

    // ── Height ─────────────────────────────────────────────────────

    /// Sets the active level, clamped to `[1, max]`, and remembers it as the
    /// preferred level for the terrain under the preview.
    pub fn set_height_level(&mut self, level: f32) {
        self.height_level = self.grid.layout().clamp_level(level);
        self.preferred_height_level = self.height_level;
        self.preferred_support_level = self.support_level.unwrap_or(1.0);
        self.refresh_preview();
    }

    /// Raises or lowers the active level.
    pub fn change_height_level(&mut self, delta: f32) {
        self.set_height_level(self.height_level + delta);
    }

    /// Level the preview should jump to on a cell whose terrain sits at
    /// `support`.
    fn seek_height_level(&self, cell: HexCoord, support: f32) -> f32 {
        let mut target = if self.settings.keep_height_on_uneven_terrain {
            self.preferred_height_level
        } else {
            self.preferred_height_level + (support - self.preferred_support_level)
        };
        target = target.max(support);
        if self.settings.select_above_highest_occupied
            && let Some(c) = self.grid.cell(cell)
            && !c.is_empty()
        {
            target = target.max(c.highest_occupied_level(&self.pool) + 1.0);
        }
        self.grid.layout().clamp_level(target)
    }

    // ── Preview ────────────────────────────────────────────────────

    /// Moves the preview to the cell under the cursor.
    ///
    /// Cursors off the grid leave the preview where it was. Entering a cell
    /// whose terrain level differs from the previous one re-seeks the active
    /// level from the preferred one.
    pub fn update_preview(&mut self, cursor: Option<HexCoord>) -> Option<&PreviewFrame> {
        let Some(cell) = cursor.filter(|c| self.grid.cell_exists(*c)) else {
            return self.frame.as_ref();
        };
        let support = self
            .grid
            .support_base(cell)
            .map_or(1.0, |b| b.height_level);

        let moved = self.preview.cell() != Some(cell);
        let support_changed = self.support_level != Some(support);
        if moved && (support_changed || self.settings.select_above_highest_occupied) {
            self.height_level = self.seek_height_level(cell, support);
        }
        self.support_level = Some(support);

        if moved || !matches!(self.preview, PreviewState::Previewing { .. }) {
            self.preview = PreviewState::Previewing {
                cell,
                height_level: self.height_level,
            };
        }
        self.refresh_preview();
        self.frame.as_ref()
    }

    /// Recomputes the preview for its current cell.
    fn refresh_preview(&mut self) {
        let Some(cell) = self.preview.cell() else {
            return;
        };
        if let PreviewState::Previewing { height_level, .. } = &mut self.preview {
            *height_level = self.height_level;
        }
        let Some((_, mesh)) = self.catalog.current() else {
            self.frame = None;
            return;
        };
        let Some(placement) =
            preview::placement_for(&self.grid, cell, self.height_level, mesh, self.direction)
        else {
            self.frame = None;
            return;
        };
        let support = self.support_level.unwrap_or(1.0);
        self.frame = Some(PreviewFrame {
            placement,
            occupied: !self.grid.cell_is_empty(cell, 0),
            markers: preview::stack_markers(&self.grid, cell, self.height_level, support),
            direction_yaw: self.direction.angle_degrees(),
        });
    }

    // ── Multi-selection ────────────────────────────────────────────

    /// Whether a rectangle selection is in progress.
    pub fn multi_selection_active(&self) -> bool {
        self.multi_selection.active
    }

    /// First call records the start corner; a later call on another cell
    /// activates the selection.
    pub fn start_multi_selection(&mut self, cell: HexCoord) {
        if self.multi_selection.active {
            return;
        }
        match self.multi_selection.start {
            Some(start) if start != cell => self.multi_selection.active = true,
            _ => self.multi_selection.start = Some(cell),
        }
    }

    /// Applies `mode` to the selected rectangle and clears the selection.
    /// Does nothing (returns `Ok(0)`) while no selection is active.
    pub fn finish_multi_selection(
        &mut self,
        end: HexCoord,
        mode: EditMode,
    ) -> Result<usize, PlacementError> {
        let selection = self.multi_selection;
        let Some(start) = selection.start.filter(|_| selection.active) else {
            return Ok(0);
        };
        let result = self.apply_to_rectangle(start, end, mode);
        self.reset_multi_selection();
        result
    }

    /// Drops the selection and its start corner.
    pub fn reset_multi_selection(&mut self) {
        self.multi_selection = MultiSelection::default();
    }

    /// Outline of the active selection on the grid plane: start corner,
    /// `(end.x, start.z)`, end corner, `(start.x, end.z)`.
    pub fn multi_selection_corners(&self, cursor: HexCoord) -> Option<[Vec3; 4]> {
        if !self.multi_selection.active {
            return None;
        }
        let lift = self.grid.layout().origin.y + 0.1;
        let mut start = self.grid.cell_center(self.multi_selection.start?, true)?;
        let mut end = self.grid.cell_center(cursor, true)?;
        start.y = lift;
        end.y = lift;
        Some([
            start,
            Vec3::new(end.x, lift, start.z),
            end,
            Vec3::new(start.x, lift, end.z),
        ])
    }
}
