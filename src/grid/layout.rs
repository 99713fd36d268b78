use bevy::prelude::*;
use hexx::{Hex, HexLayout, HexOrientation, OffsetHexMode};

use super::GridSettings;
use super::coords::HexCoord;
use crate::math;

/// Geometry of an offset hex grid: cell ↔ world conversion.
///
/// Columns run along +X, rows along +Z. Odd rows are shifted by half a cell
/// and rows are [`math::hex_gap`] apart, which is a pointy-top hexx layout
/// addressed with odd-row offset coordinates. Vertical levels are `cell_height`
/// apart, level 1 resting on `origin.y`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    /// Number of columns.
    pub size_x: i32,
    /// Number of rows.
    pub size_y: i32,
    /// Flat-to-flat width of a cell.
    pub cell_size: f32,
    /// Vertical distance between two height levels.
    pub cell_height: f32,
    /// Highest level a cell can hold (levels are `1..=max_height_level`).
    pub max_height_level: u32,
    /// World position of cell `(0, 0)` at ground level.
    pub origin: Vec3,
}

impl GridLayout {
    /// Layout from configuration, anchored at the world origin.
    pub fn from_settings(g: &GridSettings) -> Self {
        Self {
            size_x: g.size_x as i32,
            size_y: g.size_y as i32,
            cell_size: g.cell_size,
            cell_height: g.cell_height,
            max_height_level: g.max_height_level,
            origin: Vec3::ZERO,
        }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.size_x.max(0) * self.size_y.max(0)) as usize
    }

    /// Distance between two rows along Z.
    pub fn cell_gap_z(&self) -> f32 {
        math::hex_gap(self.cell_size)
    }

    /// Centre-to-corner radius of one hexagon.
    pub fn hex_radius(&self) -> f32 {
        self.cell_size / 3f32.sqrt()
    }

    /// Pointy-top hexx layout on the XZ plane (hexx `y` is world Z).
    pub fn hex_layout(&self) -> HexLayout {
        HexLayout {
            orientation: HexOrientation::Pointy,
            origin: Vec2::new(self.origin.x, self.origin.z),
            scale: Vec2::splat(self.hex_radius()),
        }
    }

    /// Axial hex of an offset cell coordinate.
    pub fn hex(coord: HexCoord) -> Hex {
        Hex::from_offset_coordinates(
            [coord.x, coord.y],
            OffsetHexMode::Odd,
            HexOrientation::Pointy,
        )
    }

    /// Bounds check only.
    pub fn cell_exists(&self, coord: HexCoord) -> bool {
        (0..self.size_x).contains(&coord.x) && (0..self.size_y).contains(&coord.y)
    }

    /// Row-major storage index of an existing cell.
    pub fn index_of(&self, coord: HexCoord) -> Option<usize> {
        self.cell_exists(coord)
            .then(|| (coord.y * self.size_x + coord.x) as usize)
    }

    /// Coordinate stored at a row-major index.
    pub fn coord_at(&self, index: usize) -> HexCoord {
        let index = index as i32;
        HexCoord::new(index % self.size_x, index / self.size_x)
    }

    /// Every cell, row by row.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + use<> {
        let size_x = self.size_x;
        (0..self.size_y).flat_map(move |y| (0..size_x).map(move |x| HexCoord::new(x, y)))
    }

    /// World-space centre of a cell with its Y set to `y`.
    ///
    /// `None` if the cell is outside the grid or the cell size is not positive.
    pub fn cell_center(&self, coord: HexCoord, y: f32) -> Option<Vec3> {
        if self.cell_size <= 0.0 || !self.cell_exists(coord) {
            return None;
        }
        let center = self.hex_layout().hex_to_world_pos(Self::hex(coord));
        Some(Vec3::new(center.x, y, center.y))
    }

    /// Cell containing a world position (Y is ignored).
    ///
    /// The row is found first with a half-gap offset; odd rows then re-derive
    /// the column without the half-cell offset. This is a rectangular pick,
    /// not the hexagonal [`HexLayout::world_pos_to_hex`]: corners of a cell's
    /// rectangle belong to the cell even where the hexagon does not reach.
    /// `None` outside the grid.
    pub fn cell_from_position(&self, position: Vec3) -> Option<HexCoord> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let gap = self.cell_gap_z();
        let local_x = position.x - self.origin.x;
        let mut x = (local_x + 0.5 * self.cell_size) / self.cell_size;
        let y = (position.z - self.origin.z + 0.5 * gap) / gap;
        if x < 0.0 || y < 0.0 {
            return None;
        }

        let row = y as i32;
        if row % 2 != 0 {
            x = local_x / self.cell_size;
            if x < 0.0 {
                return None;
            }
        }

        let coord = HexCoord::new(x as i32, row);
        self.cell_exists(coord).then_some(coord)
    }

    /// World Y at which a level starts (level 1 = `origin.y`).
    pub fn level_y(&self, height_level: f32) -> f32 {
        self.origin.y + (height_level - 1.0) * self.cell_height
    }

    /// Clamps a level into `[1, max_height_level]`.
    pub fn clamp_level(&self, height_level: f32) -> f32 {
        height_level.clamp(1.0, self.max_height_level.max(1) as f32)
    }

    /// Minimal layout for tests.
    #[cfg(test)]
    pub fn square(size: i32, max_height_level: u32) -> Self {
        Self {
            size_x: size,
            size_y: size,
            cell_size: 1.0,
            cell_height: 2.0,
            max_height_level,
            origin: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── cell_center ─────────────────────────────────────────────────

    #[test]
    fn even_row_center_has_no_offset() {
        let layout = GridLayout::square(10, 5);
        let c = layout.cell_center(HexCoord::new(3, 2), 0.0).unwrap();
        assert!((c.x - 3.0).abs() < 1e-6);
        assert!((c.z - 2.0 * layout.cell_gap_z()).abs() < 1e-6);
    }

    #[test]
    fn odd_row_center_is_shifted_half_a_cell() {
        let layout = GridLayout::square(10, 5);
        let c = layout.cell_center(HexCoord::new(3, 1), 0.0).unwrap();
        assert!((c.x - 3.5).abs() < 1e-6, "x was {}", c.x);
    }

    #[test]
    fn center_fails_outside_grid_or_with_bad_size() {
        let mut layout = GridLayout::square(10, 5);
        assert!(layout.cell_center(HexCoord::new(10, 0), 0.0).is_none());
        assert!(layout.cell_center(HexCoord::new(0, -1), 0.0).is_none());
        layout.cell_size = 0.0;
        assert!(layout.cell_center(HexCoord::new(0, 0), 0.0).is_none());
    }

    #[test]
    fn center_matches_offset_row_geometry() {
        let mut layout = GridLayout::square(6, 5);
        layout.cell_size = 2.0;
        layout.origin = Vec3::new(1.0, 0.0, -2.0);
        for coord in layout.coords() {
            let c = layout.cell_center(coord, 0.0).unwrap();
            let shift = if coord.is_odd_row() { 1.0 } else { 0.0 };
            let x = 1.0 + coord.x as f32 * 2.0 + shift;
            let z = -2.0 + coord.y as f32 * math::hex_gap(2.0);
            assert!((c.x - x).abs() < 1e-4, "{coord}: x {} vs {x}", c.x);
            assert!((c.z - z).abs() < 1e-4, "{coord}: z {} vs {z}", c.z);
        }
    }

    // ── cell_from_position ──────────────────────────────────────────

    #[test]
    fn center_round_trips_for_every_cell() {
        let mut layout = GridLayout::square(10, 5);
        layout.size_x = 7;
        layout.cell_size = 1.7;
        layout.origin = Vec3::new(-3.0, 1.0, 4.5);
        for coord in layout.coords() {
            let center = layout.cell_center(coord, 0.0).unwrap();
            assert_eq!(layout.cell_from_position(center), Some(coord), "{coord}");
        }
    }

    #[test]
    fn positions_off_grid_yield_none() {
        let layout = GridLayout::square(4, 5);
        assert!(layout.cell_from_position(Vec3::new(-1.0, 0.0, 0.0)).is_none());
        assert!(layout.cell_from_position(Vec3::new(0.0, 0.0, -1.0)).is_none());
        assert!(layout.cell_from_position(Vec3::new(50.0, 0.0, 0.0)).is_none());
        assert!(layout.cell_from_position(Vec3::new(0.0, 0.0, 50.0)).is_none());
    }

    #[test]
    fn odd_row_left_edge_is_outside() {
        let layout = GridLayout::square(4, 5);
        let z = layout.cell_gap_z();
        assert!(layout.cell_from_position(Vec3::new(-0.2, 0.0, z)).is_none());
    }

    // ── indexing ────────────────────────────────────────────────────

    #[test]
    fn index_and_coord_are_inverse() {
        let layout = GridLayout::square(5, 5);
        for (i, coord) in layout.coords().enumerate() {
            assert_eq!(layout.index_of(coord), Some(i));
            assert_eq!(layout.coord_at(i), coord);
        }
        assert_eq!(layout.cell_count(), 25);
    }

    #[test]
    fn level_clamp_keeps_bounds() {
        let layout = GridLayout::square(5, 5);
        assert_eq!(layout.clamp_level(0.0), 1.0);
        assert_eq!(layout.clamp_level(7.5), 5.0);
        assert_eq!(layout.clamp_level(2.5), 2.5);
    }
}
