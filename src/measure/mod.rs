mod controller;
mod host;
mod line;
mod session;
mod status;
mod systems;

pub use controller::MeasureController;
pub use host::{host_link, HostCommand, HostEvent, HostLink, MeasureLink, StartOptions};
pub use line::{Line, LineId};
pub use session::{MeasurementSession, SessionState};
pub use status::*;
pub use systems::{
    ActiveMeasurement, CaptureInbox, MeasureSettings, ALREADY_RUNNING_MESSAGE, NO_SESSION_MESSAGE,
};

use bevy::prelude::*;
use std::path::PathBuf;

use crate::config::TrackingConfig;
use crate::hud::render_measure_hud;
use crate::scene::{apply_line_ops, setup_line_assets, LineRenderQueue};
use crate::tracking::TrackingWarmup;
use systems::*;

/// Measuring view: session, tracking feed, line visuals and HUD.
pub struct MeasurePlugin {
    pub link: MeasureLink,
    pub tracking: TrackingConfig,
    pub capture_dir: PathBuf,
}

impl Plugin for MeasurePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.link.clone())
            .insert_resource(MeasureSettings {
                tracking: self.tracking.clone(),
                capture_dir: self.capture_dir.clone(),
            })
            .init_resource::<LineRenderQueue>()
            .init_resource::<TrackingWarmup>()
            .init_resource::<CaptureInbox>()
            .add_systems(Startup, setup_line_assets)
            .add_systems(
                Update,
                (
                    finish_session_setup.run_if(resource_exists::<PendingSetup>),
                    drain_host_commands.run_if(not(resource_exists::<PendingSetup>)),
                    forward_tracking_interruptions,
                    tick_measurement.run_if(resource_exists::<ActiveMeasurement>),
                    handle_touch_input.run_if(resource_exists::<ActiveMeasurement>),
                    deliver_capture_results,
                    apply_line_ops,
                )
                    .chain(),
            )
            .add_systems(bevy_egui::EguiPrimaryContextPass, render_measure_hud);
    }
}
