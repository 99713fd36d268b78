use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::TerrainSettings;
use crate::math;

/// Upward height probe used to rest support bases on the terrain.
pub trait TerrainProbe {
    /// World Y of the first terrain surface above `origin`, if one lies
    /// within `max_distance`.
    fn probe_up(&self, origin: Vec3, max_distance: f32) -> Option<f32>;
}

/// Terrain without relief: nothing is ever hit.
pub struct FlatTerrain;

impl TerrainProbe for FlatTerrain {
    fn probe_up(&self, _origin: Vec3, _max_distance: f32) -> Option<f32> {
        None
    }
}

/// fBm Perlin heightfield sampled on the XZ plane.
pub struct NoiseTerrain {
    fbm: Fbm<Perlin>,
    scale: f64,
    max_height: f32,
}

impl NoiseTerrain {
    /// Builds the heightfield from terrain settings.
    pub fn from_settings(t: &TerrainSettings) -> Self {
        Self {
            fbm: Fbm::new(t.seed).set_octaves(t.octaves),
            scale: t.scale,
            max_height: t.max_height,
        }
    }

    /// Surface height in `[0, max_height]` at a world XZ position.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let noise_val = self
            .fbm
            .get([x as f64 / self.scale, z as f64 / self.scale]);
        math::map_noise_to_range(noise_val, 0.0, self.max_height)
    }
}

impl TerrainProbe for NoiseTerrain {
    fn probe_up(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let surface = self.height_at(origin.x, origin.z);
        let distance = surface - origin.y;
        (distance > 0.0 && distance <= max_distance).then_some(surface)
    }
}

/// Probe returning fixed heights per XZ position, for tests.
#[cfg(test)]
pub struct FixedTerrain(pub Vec<(Vec2, f32)>);

#[cfg(test)]
impl TerrainProbe for FixedTerrain {
    fn probe_up(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        self.0
            .iter()
            .find(|(pos, _)| pos.distance(Vec2::new(origin.x, origin.z)) < 1e-3)
            .map(|(_, y)| *y)
            .filter(|y| *y > origin.y && *y - origin.y <= max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TerrainSettings {
        TerrainSettings {
            max_height: 6.0,
            ..default()
        }
    }

    #[test]
    fn flat_terrain_never_hits() {
        assert_eq!(FlatTerrain.probe_up(Vec3::ZERO, 100.0), None);
    }

    #[test]
    fn noise_heights_stay_in_range() {
        let terrain = NoiseTerrain::from_settings(&settings());
        for i in 0..50 {
            let h = terrain.height_at(i as f32 * 3.7, i as f32 * -1.3);
            assert!((0.0..=6.0).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn probe_misses_when_origin_is_above_surface() {
        let terrain = NoiseTerrain::from_settings(&settings());
        assert_eq!(terrain.probe_up(Vec3::new(1.0, 10.0, 1.0), 20.0), None);
    }

    #[test]
    fn probe_respects_max_distance() {
        let terrain = NoiseTerrain::from_settings(&settings());
        let origin = Vec3::new(2.0, -5.0, 3.0);
        let surface = terrain.height_at(origin.x, origin.z);
        assert_eq!(terrain.probe_up(origin, 20.0), Some(surface));
        assert_eq!(terrain.probe_up(origin, 1.0), None);
    }
}
