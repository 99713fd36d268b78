use bevy::prelude::*;

use super::catalog::MeshDescriptor;
use crate::grid::{HexCoord, HexDirection, HexGrid};
use crate::math;

/// World transform of an object on a cell and level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Target cell.
    pub cell: HexCoord,
    /// Level, possibly a half level.
    pub height_level: f32,
    /// World position.
    pub position: Vec3,
    /// World yaw in degrees.
    pub rotation_y: f32,
}

/// Yaw of a mesh facing `direction`: direction angle, plus the mesh's own
/// offset, plus the turn from the grid's reference direction to the mesh's
/// main direction.
pub fn rotation_for(mesh: &MeshDescriptor, direction: HexDirection) -> f32 {
    math::wrap_degrees(
        direction.angle_degrees()
            + mesh.default_rotation_y
            + HexDirection::Right.angle_to(mesh.main_direction),
    )
}

/// Placement math shared by commits and the preview.
///
/// Levels are absolute: level 1 rests on the grid plane and every level adds
/// one cell height, so an object on a support base's level sits on the base.
pub fn placement_for(
    grid: &HexGrid,
    cell: HexCoord,
    height_level: f32,
    mesh: &MeshDescriptor,
    direction: HexDirection,
) -> Option<Placement> {
    let mut position = grid.cell_center(cell, true)?;
    position.y = grid.layout().level_y(height_level) + mesh.default_position_y;
    Some(Placement {
        cell,
        height_level,
        position,
        rotation_y: rotation_for(mesh, direction),
    })
}

/// One level indicator under the preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackMarker {
    /// World position of the indicator.
    pub position: Vec3,
    /// Level it marks.
    pub height_level: f32,
    /// The topmost marker sits at the active level.
    pub top: bool,
}

/// Everything the presentation layer needs to draw the preview.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewFrame {
    /// Where the next object would go.
    pub placement: Placement,
    /// Whether the cell already holds anything, hidden objects included.
    pub occupied: bool,
    /// Indicators from the active level down to the support level.
    pub markers: Vec<StackMarker>,
    /// Plain yaw of the active direction, for the markers.
    pub direction_yaw: f32,
}

/// Level indicators from `height_level` down to the terrain under the cell.
///
/// The top marker sits exactly on the active level; the others snap to the
/// whole levels below it and stop at the support level.
pub fn stack_markers(
    grid: &HexGrid,
    cell: HexCoord,
    height_level: f32,
    support_level: f32,
) -> Vec<StackMarker> {
    let Some(center) = grid.cell_center(cell, true) else {
        return Vec::new();
    };
    let layout = grid.layout();
    let rounded = math::round_half_up(height_level);
    (0..rounded)
        .map(|i| {
            if i == 0 {
                height_level
            } else {
                (rounded - i) as f32
            }
        })
        .enumerate()
        .take_while(|(i, level)| *i == 0 || *level >= support_level)
        .map(|(i, level)| StackMarker {
            position: Vec3::new(center.x, layout.level_y(level), center.z),
            height_level: level,
            top: i == 0,
        })
        .collect()
}

/// Preview lifecycle: idle until the cursor first enters the grid, then
/// previewing a cell, briefly committed after an edit lands on it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PreviewState {
    /// No cell has been previewed yet.
    #[default]
    Idle,
    /// Showing where the next object would go.
    Previewing {
        /// Previewed cell.
        cell: HexCoord,
        /// Active level.
        height_level: f32,
    },
    /// An edit just changed this cell; the next update re-previews it.
    Committed {
        /// Edited cell.
        cell: HexCoord,
    },
}

impl PreviewState {
    /// Cell the state refers to.
    pub fn cell(&self) -> Option<HexCoord> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Previewing { cell, .. } | PreviewState::Committed { cell } => {
                Some(*cell)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::StructureType;
    use crate::placement::MeshShape;

    fn mesh() -> MeshDescriptor {
        MeshDescriptor::new("test", StructureType::Floor, MeshShape::Slab)
    }

    #[test]
    fn rotation_combines_direction_and_mesh_offsets() {
        let mut m = mesh();
        assert_eq!(rotation_for(&m, HexDirection::Left), 180.0);
        m.default_rotation_y = 90.0;
        m.main_direction = HexDirection::UpRight;
        // 180 + 90 + 300
        assert_eq!(rotation_for(&m, HexDirection::Left), 210.0);
    }

    #[test]
    fn placement_height_follows_level() {
        let grid = HexGrid::square(4, 5);
        let mut m = mesh();
        m.default_position_y = 0.25;
        let p = placement_for(&grid, HexCoord::new(1, 1), 2.5, &m, HexDirection::Right).unwrap();
        // (2.5 - 1) * cell height 2 + offset
        assert!((p.position.y - 3.25).abs() < 1e-6, "y was {}", p.position.y);
        assert!((p.position.x - 1.5).abs() < 1e-6);
        assert!(placement_for(&grid, HexCoord::new(4, 0), 1.0, &m, HexDirection::Right).is_none());
    }

    #[test]
    fn markers_run_from_active_level_to_ground() {
        let grid = HexGrid::square(4, 5);
        let markers = stack_markers(&grid, HexCoord::new(0, 0), 2.5, 1.0);
        let levels: Vec<f32> = markers.iter().map(|m| m.height_level).collect();
        assert_eq!(levels, vec![2.5, 2.0, 1.0]);
        assert!(markers[0].top);
        assert!(markers[1..].iter().all(|m| !m.top));
        assert_eq!(markers[2].position.y, 0.0);
    }

    #[test]
    fn markers_stop_at_support_level() {
        let grid = HexGrid::square(4, 5);
        let levels: Vec<f32> = stack_markers(&grid, HexCoord::new(0, 0), 4.0, 3.0)
            .iter()
            .map(|m| m.height_level)
            .collect();
        assert_eq!(levels, vec![4.0, 3.0]);
    }

    #[test]
    fn top_marker_is_kept_below_support() {
        let grid = HexGrid::square(4, 5);
        let markers = stack_markers(&grid, HexCoord::new(0, 0), 1.0, 3.0);
        assert_eq!(markers.len(), 1);
        assert!(markers[0].top);
    }
}
