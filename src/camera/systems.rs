use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::CameraConfig;
use super::entities::{BuilderCamera, OrbitRig};
use crate::builder::BuilderConfig;
use crate::grid::{GridLayout, HexCoord};
use crate::math;

/// Spawns the Camera3d entity with HDR and bloom, focused on the grid centre.
pub fn spawn_camera(
    mut commands: Commands,
    cfg: Res<CameraConfig>,
    builder_cfg: Option<Res<BuilderConfig>>,
) {
    let focus = builder_cfg
        .and_then(|b| {
            let layout = GridLayout::from_settings(&b.grid);
            let middle = HexCoord::new(layout.size_x / 2, layout.size_y / 2);
            layout.cell_center(middle, layout.origin.y)
        })
        .unwrap_or(Vec3::ZERO);
    let rig = OrbitRig {
        focus,
        distance: cfg.start_distance,
        yaw: 0.0,
        pitch: cfg.start_pitch,
    };

    commands.spawn((
        Name::new("BuilderCamera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: cfg.bloom_intensity,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        rig.transform(),
        rig,
        BuilderCamera,
    ));
}

/// WASD pans the focus, arrow keys orbit, scroll zooms.
pub fn orbit_camera(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut scroll: MessageReader<MouseWheel>,
    cfg: Res<CameraConfig>,
    mut query: Query<(&mut Transform, &mut OrbitRig), With<BuilderCamera>>,
) {
    let Ok((mut transform, mut rig)) = query.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    // Orbit
    if keys.pressed(KeyCode::ArrowLeft) {
        rig.yaw += cfg.orbit_speed * dt;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        rig.yaw -= cfg.orbit_speed * dt;
    }
    let mut pitch = 0.0;
    if keys.pressed(KeyCode::ArrowUp) {
        pitch -= cfg.orbit_speed * dt;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        pitch += cfg.orbit_speed * dt;
    }
    if pitch != 0.0 {
        let delta = math::clamp_pitch(rig.pitch, pitch, cfg.pitch_margin);
        rig.pitch = (rig.pitch + delta).min(-cfg.pitch_margin);
    }

    // WASD pan in the camera's forward/right plane (XZ only)
    let rotation = rig.rotation();
    let forward = rotation * Vec3::NEG_Z;
    let forward_xz = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right = rotation * Vec3::X;
    let right_xz = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction += forward_xz;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction -= forward_xz;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction += right_xz;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction -= right_xz;
    }
    if direction != Vec3::ZERO {
        rig.focus += direction.normalize() * cfg.pan_speed * dt;
    }

    // Zoom
    for ev in scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        rig.distance =
            (rig.distance - lines * cfg.zoom_speed).clamp(cfg.min_distance, cfg.max_distance);
    }

    *transform = rig.transform();
}
