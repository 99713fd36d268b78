use crate::grid::{HexCoord, HexDirection, MeshId};

/// A fully resolved request to place one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildInstruction {
    /// Catalog mesh to place.
    pub mesh: MeshId,
    /// Target cell.
    pub cell: HexCoord,
    /// Facing of the placed object.
    pub direction: HexDirection,
    /// Level to place on (`x.5` for half levels).
    pub height_level: f32,
}

impl BuildInstruction {
    /// One-line description for logs and the HUD.
    pub fn info(&self) -> String {
        format!(
            "Object {} at {} looking {} on level {}",
            self.mesh.0,
            self.cell,
            self.direction.label(),
            self.height_level
        )
    }
}
