//! On-screen text: remaining objects, placement info, edit mode and the
//! latest engine notice. Cell labels while debugging.

use bevy::prelude::*;
use bevy_egui::egui;

use crate::GameState;
use crate::builder::{ActiveEditMode, Builder, BuilderSet};
use crate::camera::BuilderCamera;
use crate::placement::PlacementNotice;

/// HUD layout.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct HudConfig {
    /// Text size of the status lines.
    pub font_size: f32,
    /// Distance of the status block from the window corner.
    pub margin: f32,
    /// Cells farther than this from the camera get no debug label.
    pub label_distance: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            margin: 12.0,
            label_distance: 25.0,
        }
    }
}

/// Text of the most recent notice worth showing.
#[derive(Resource, Default)]
pub struct LatestNotice(pub Option<String>);

/// Status text over the scene.
pub struct HudPlugin(pub HudConfig);

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HudConfig>()
            .insert_resource(self.0.clone())
            .init_resource::<LatestNotice>()
            .add_systems(
                Update,
                (record_notices, draw_status)
                    .chain()
                    .after(BuilderSet::Preview)
                    .run_if(resource_exists::<Builder>),
            )
            .add_systems(
                Update,
                draw_cell_labels
                    .run_if(resource_exists::<Builder>)
                    .run_if(in_state(GameState::Debugging)),
            );
    }
}

/// Keeps the last failure or cell change for the status block.
pub fn record_notices(mut notices: MessageReader<PlacementNotice>, mut latest: ResMut<LatestNotice>) {
    for notice in notices.read() {
        if !matches!(notice, PlacementNotice::ObjectsRemaining { .. }) {
            latest.0 = Some(notice.to_string());
        }
    }
}

/// Paints the status block in the top-left corner.
pub fn draw_status(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    builder: Res<Builder>,
    mode: Res<ActiveEditMode>,
    latest: Res<LatestNotice>,
    cfg: Res<HudConfig>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let placer = &builder.0;
    let (remaining, total) = placer.objects_remaining();

    let mut lines = vec![
        format!("Objects remaining {remaining}/{total}"),
        format!("Mode: {}", mode.0.label()),
    ];
    lines.extend(placer.placement_info().lines().map(str::to_owned));
    if placer.multi_selection_active() {
        lines.push("Selecting rectangle".to_owned());
    }
    if let Some(notice) = &latest.0 {
        lines.push(notice.clone());
    }

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());
    let line_height = cfg.font_size * 1.4;
    for (i, line) in lines.iter().enumerate() {
        painter.text(
            egui::pos2(cfg.margin, cfg.margin + i as f32 * line_height),
            egui::Align2::LEFT_TOP,
            line,
            egui::FontId::proportional(cfg.font_size),
            egui::Color32::WHITE,
        );
    }
}

/// Labels nearby cells with their coordinates and object count.
pub fn draw_cell_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<BuilderCamera>>,
    builder: Res<Builder>,
    cfg: Res<HudConfig>,
) {
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let cam_pos = cam_gt.translation();
    let grid = builder.0.grid();
    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for cell in grid.cells() {
        let Some(world_pos) = grid.cell_center(cell.coords(), false) else {
            continue;
        };
        if cam_pos.distance(world_pos) > cfg.label_distance {
            continue;
        }
        if let Ok(viewport) = camera.world_to_viewport(cam_gt, world_pos) {
            painter.text(
                egui::pos2(viewport.x, viewport.y),
                egui::Align2::CENTER_CENTER,
                format!("{} [{}]", cell.coords(), cell.object_count(0)),
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }
    }
}
