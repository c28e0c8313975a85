use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::measure::{ActiveMeasurement, HostCommand, MeasureController, MeasureLink, Reticle};
use crate::units::Unit;

const RETICLE_RADIUS: f32 = 14.0;
const RETICLE_STROKE: f32 = 2.0;
const RETICLE_IDLE: egui::Color32 = egui::Color32::WHITE;
const RETICLE_ACTIVE: egui::Color32 = egui::Color32::from_rgb(52, 199, 89);

/// Snapshot of the measuring view for one HUD frame.
#[derive(Debug, Clone, Default)]
pub struct HudState {
    pub status: String,
    pub world_detected: bool,
    pub reticle: Reticle,
    pub unit: Unit,
    pub measures: Vec<String>,
    /// Button pressed this frame, if any
    pub command: Option<HostCommand>,
}

impl HudState {
    pub fn from_controller(controller: &MeasureController) -> Self {
        let status = controller.status();
        Self {
            status: status.message.clone(),
            world_detected: status.world_detected,
            reticle: status.reticle,
            unit: controller.session().active_unit(),
            measures: controller.measures(),
            command: None,
        }
    }
}

fn reticle_color(reticle: Reticle) -> Option<egui::Color32> {
    match reticle {
        Reticle::Hidden => None,
        Reticle::Idle => Some(RETICLE_IDLE),
        Reticle::Active => Some(RETICLE_ACTIVE),
    }
}

/// Draw the HUD. Button presses land in `hud.command`.
pub fn render_hud_ui(ctx: &egui::Context, hud: &mut HudState) {
    egui::TopBottomPanel::top("measure_status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if !hud.world_detected {
                ui.spinner();
            }
            ui.heading(hud.status.as_str());
        });

        if hud.world_detected {
            ui.horizontal(|ui| {
                for unit in Unit::ALL {
                    if ui.selectable_label(hud.unit == unit, unit.title()).clicked() {
                        hud.command = Some(HostCommand::SetUnit(unit));
                    }
                }
            });
        }
    });

    egui::TopBottomPanel::bottom("measure_controls").show(ctx, |ui| {
        if !hud.measures.is_empty() {
            ui.label("Measures:");
            for measure in &hud.measures {
                ui.label(measure.as_str());
            }
            ui.separator();
        }

        ui.horizontal(|ui| {
            if ui.button("Reset").clicked() {
                hud.command = Some(HostCommand::Reset);
            }
            if ui.button("Capture").clicked() {
                hud.command = Some(HostCommand::Capture);
            }
            if ui.button("Close").clicked() {
                hud.command = Some(HostCommand::Close);
            }
        });
    });

    if let Some(color) = reticle_color(hud.reticle) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("measure_reticle"),
        ));
        let center = ctx.content_rect().center();
        painter.circle_stroke(center, RETICLE_RADIUS, egui::Stroke::new(RETICLE_STROKE, color));
        painter.circle_filled(center, RETICLE_STROKE, color);
    }
}

/// HUD for the open measuring view. Buttons loop back into the command queue.
pub fn render_measure_hud(
    mut contexts: EguiContexts,
    active: Option<Res<ActiveMeasurement>>,
    link: Res<MeasureLink>,
) {
    let Some(active) = active else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut hud = HudState::from_controller(&active.0);
    render_hud_ui(ctx, &mut hud);

    if let Some(command) = hud.command {
        debug!("HUD command: {:?}", command);
        if link.command_sender().send(command).is_err() {
            warn!("Command queue closed, HUD command dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::DETECTING_MESSAGE;
    use egui_kittest::{kittest::Queryable, Harness};

    fn detected() -> HudState {
        HudState {
            status: "Hold screen & move your phone…".to_string(),
            world_detected: true,
            reticle: Reticle::Idle,
            ..HudState::default()
        }
    }

    #[test]
    fn test_hud_shows_detecting_status() {
        let harness = Harness::new_state(
            |ctx, hud: &mut HudState| render_hud_ui(ctx, hud),
            HudState {
                status: DETECTING_MESSAGE.to_string(),
                ..HudState::default()
            },
        );

        harness.get_by_label(DETECTING_MESSAGE);
        assert!(harness.query_by_label("Centimeter").is_none());
    }

    #[test]
    fn test_hud_shows_unit_menu_once_detected() {
        let harness = Harness::new_state(|ctx, hud: &mut HudState| render_hud_ui(ctx, hud), detected());

        harness.get_by_label("Centimeter");
        harness.get_by_label("Inch");
        harness.get_by_label("Meter");
    }

    #[test]
    fn test_hud_lists_measures() {
        let mut hud = detected();
        hud.measures = vec!["1.00 m".to_string(), "100.00 cm".to_string()];
        let harness = Harness::new_state(|ctx, hud: &mut HudState| render_hud_ui(ctx, hud), hud);

        harness.get_by_label("Measures:");
        harness.get_by_label("1.00 m");
        harness.get_by_label("100.00 cm");
    }

    #[test]
    fn test_hud_buttons_queue_commands() {
        let mut harness =
            Harness::new_state(|ctx, hud: &mut HudState| render_hud_ui(ctx, hud), detected());

        harness.get_by_label("Capture").click();
        harness.run();
        assert_eq!(harness.state().command, Some(HostCommand::Capture));
    }

    #[test]
    fn test_reticle_colors() {
        assert_eq!(reticle_color(Reticle::Hidden), None);
        assert_eq!(reticle_color(Reticle::Idle), Some(RETICLE_IDLE));
        assert_eq!(reticle_color(Reticle::Active), Some(RETICLE_ACTIVE));
    }
}
