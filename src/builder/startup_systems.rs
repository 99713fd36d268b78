use bevy::prelude::*;

use super::BuilderConfig;
use super::entities::Builder;
use crate::grid::{GridLayout, HexGrid, HexObject};
use crate::placement::{ObjectCatalog, ObjectPlacer};
use crate::pool::ObjectPool;

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the grid, rests its support bases on the terrain and inserts the
/// [`Builder`] engine with an empty pool and the built-in catalog.
pub fn build_engine(mut commands: Commands, cfg: Res<BuilderConfig>) {
    let layout = GridLayout::from_settings(&cfg.grid);
    let mut grid = HexGrid::new(layout, &cfg.grid);
    let probe = cfg.terrain.probe();
    grid.populate_support_bases(probe.as_ref());

    let pool = ObjectPool::<HexObject>::new(cfg.pool.size, cfg.pool.grow);
    let catalog = ObjectCatalog::builtin();
    info!(
        "Object pool holds {} objects (growth {}), catalog holds {} items",
        pool.len(),
        if pool.should_grow() { "on" } else { "off" },
        catalog.len()
    );

    commands.insert_resource(Builder(ObjectPlacer::new(
        grid,
        catalog,
        pool,
        cfg.placement.clone(),
    )));
}
