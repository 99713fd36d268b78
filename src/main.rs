use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_builder::GameState;
use hex_builder::builder::{BuilderConfig, BuilderPlugin};
use hex_builder::camera::{CameraConfig, CameraPlugin};
use hex_builder::hud::{HudConfig, HudPlugin};
use hex_builder::visuals::{VisualsConfig, VisualsPlugin};

/// Launch-time overrides for the grid, pool and terrain.
#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(name = "hex-builder", about = "Hex grid building editor")]
struct Cli {
    /// Number of grid columns.
    #[arg(long)]
    size_x: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    size_y: Option<u32>,
    /// Highest level a cell can hold.
    #[arg(long)]
    max_height: Option<u32>,
    /// Objects allocated up front.
    #[arg(long)]
    pool_size: Option<usize>,
    /// Allocate more objects when the pool runs dry.
    #[arg(long)]
    grow_pool: bool,
    /// Terrain noise seed.
    #[arg(long)]
    seed: Option<u32>,
    /// Keep every support base at ground level.
    #[arg(long)]
    flat: bool,
}

#[cfg(feature = "native")]
impl Cli {
    fn apply(self, cfg: &mut BuilderConfig) {
        if let Some(x) = self.size_x {
            cfg.grid.size_x = x;
        }
        if let Some(y) = self.size_y {
            cfg.grid.size_y = y;
        }
        if let Some(max) = self.max_height {
            cfg.grid.max_height_level = max.max(1);
        }
        if let Some(size) = self.pool_size {
            cfg.pool.size = size;
        }
        cfg.pool.grow |= self.grow_pool;
        if let Some(seed) = self.seed {
            cfg.terrain.seed = seed;
        }
        cfg.terrain.flat |= self.flat;
    }
}

fn builder_config() -> BuilderConfig {
    #[allow(unused_mut)]
    let mut cfg = BuilderConfig::default();
    #[cfg(feature = "native")]
    {
        use clap::Parser;
        Cli::parse().apply(&mut cfg);
    }
    cfg
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Builder".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(BuilderPlugin(builder_config()))
    .add_plugins(CameraPlugin(CameraConfig::default()))
    .add_plugins(VisualsPlugin(VisualsConfig::default()))
    .add_plugins(HudPlugin(HudConfig::default()))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Editing => GameState::Debugging,
            GameState::Debugging => GameState::Editing,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
