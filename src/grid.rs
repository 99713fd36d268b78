//! Hex grid occupancy: coordinates, cells, support bases and terrain probing.
//!
//! Pure data and algorithms; the Bevy side lives in [`crate::builder`] and
//! [`crate::visuals`].

mod cell;
mod coords;
mod hex_grid;
mod layout;
mod object;
mod terrain_probe;

pub use cell::{HexCell, LevelOutOfRange};
pub use coords::{HexCoord, HexDirection, Turn};
pub use hex_grid::{GridError, HexGrid, SupportBase, base_material_index};
pub use layout::GridLayout;
pub use object::{HexObject, MeshId, StructureSlot, StructureType};
pub use terrain_probe::{FlatTerrain, NoiseTerrain, TerrainProbe};
#[cfg(test)]
pub use terrain_probe::FixedTerrain;

use bevy::prelude::*;

/// Grid geometry and height rules.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Number of columns.
    pub size_x: u32,
    /// Number of rows.
    pub size_y: u32,
    /// Flat-to-flat width of a cell in world units.
    pub cell_size: f32,
    /// Vertical distance between height levels.
    pub cell_height: f32,
    /// Highest level a cell can hold.
    pub max_height_level: u32,
    /// Fraction of a level at which a terrain height counts as a half level.
    pub half_level_threshold: f32,
    /// How far above a support base the terrain probe looks.
    pub probe_max_distance: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size_x: 10,
            size_y: 10,
            cell_size: 1.0,
            cell_height: 2.0,
            max_height_level: 5,
            half_level_threshold: 0.5,
            probe_max_distance: 20.0,
        }
    }
}

/// Noise heightfield the support bases rest on.
#[derive(Clone, Debug, Reflect)]
pub struct TerrainSettings {
    /// Seed for the height noise generator.
    pub seed: u32,
    /// Number of fBm octaves.
    pub octaves: usize,
    /// Spatial scale divisor for noise sampling.
    pub scale: f64,
    /// Highest terrain surface produced by the noise.
    pub max_height: f32,
    /// Skip the noise and keep every base at ground level.
    pub flat: bool,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            octaves: 4,
            scale: 8.0,
            max_height: 5.0,
            flat: false,
        }
    }
}

impl TerrainSettings {
    /// The probe these settings describe.
    pub fn probe(&self) -> Box<dyn TerrainProbe> {
        if self.flat {
            Box::new(FlatTerrain)
        } else {
            Box::new(NoiseTerrain::from_settings(self))
        }
    }
}
