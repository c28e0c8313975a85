use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use bevy::window::WindowFocused;
use bevy_egui::EguiContexts;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::path::PathBuf;

use super::controller::MeasureController;
use super::host::{HostCommand, HostEvent, MeasureLink, StartOptions};
use crate::capture::{self, CaptureResult};
use crate::config::TrackingConfig;
use crate::paths;
use crate::scene::{snapshot_from_image, LineRenderQueue};
use crate::tracking::{GroundPlaneTracker, MeasureCamera, TrackingEvent, TrackingWarmup};

pub const NO_SESSION_MESSAGE: &str = "No active measurement session";
pub const ALREADY_RUNNING_MESSAGE: &str = "Measurement session already running";

/// The open measuring view. Present only between a successful start and close.
#[derive(Resource)]
pub struct ActiveMeasurement(pub MeasureController);

/// Background start in progress.
#[derive(Resource)]
pub struct PendingSetup {
    rx: Receiver<Result<MeasureController, String>>,
}

/// Plugin-wide settings fixed at build time.
#[derive(Resource, Clone, Debug)]
pub struct MeasureSettings {
    pub tracking: TrackingConfig,
    pub capture_dir: PathBuf,
}

/// A finished capture on its way back to the update thread.
#[derive(Debug)]
pub struct CaptureDelivery {
    pub result: CaptureResult,
    pub close_after: bool,
}

/// Results from capture worker threads.
#[derive(Resource)]
pub struct CaptureInbox {
    tx: Sender<CaptureDelivery>,
    rx: Receiver<CaptureDelivery>,
}

impl Default for CaptureInbox {
    fn default() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }
}

impl CaptureInbox {
    pub fn sender(&self) -> Sender<CaptureDelivery> {
        self.tx.clone()
    }
}

/// Build a controller off the update thread.
fn spawn_session_setup(
    options: serde_json::Value,
    capture_dir: PathBuf,
    events: Sender<HostEvent>,
) -> PendingSetup {
    let (tx, rx) = bounded(1);
    std::thread::spawn(move || {
        let result = StartOptions::from_json(&options).map(|options| {
            paths::ensure_dir(&capture_dir);
            MeasureController::new(options, capture_dir, events)
        });
        if tx.send(result).is_err() {
            debug!("Session setup finished after the plugin went away");
        }
    });
    PendingSetup { rx }
}

/// Request a window screenshot and hand it to a worker that writes it out.
fn request_capture(
    commands: &mut Commands,
    controller: &MeasureController,
    inbox: Sender<CaptureDelivery>,
) {
    let dir = controller.capture_dir().clone();
    let measures = controller.measures();
    let close_after = controller.close_on_capture();
    info!("Capture requested ({} measures)", measures.len());

    commands
        .spawn(Screenshot::primary_window())
        .observe(move |captured: On<ScreenshotCaptured>| {
            let mut snapshot = snapshot_from_image(captured.image.clone());
            let dir = dir.clone();
            let measures = measures.clone();
            let inbox = inbox.clone();
            std::thread::spawn(move || {
                let result = capture::capture(&mut snapshot, &dir, measures);
                if inbox.send(CaptureDelivery { result, close_after }).is_err() {
                    warn!("Capture finished but nobody is listening");
                }
            });
        });
}

/// Apply queued host and HUD commands.
///
/// Does not run while a start is pending, so commands sent right after
/// `Start` wait for the controller instead of being dropped.
pub fn drain_host_commands(
    mut commands: Commands,
    link: Res<MeasureLink>,
    settings: Res<MeasureSettings>,
    inbox: Res<CaptureInbox>,
    mut active: Option<ResMut<ActiveMeasurement>>,
    mut queue: ResMut<LineRenderQueue>,
) {
    let mut pending = link.drain_commands().into_iter();
    while let Some(command) = pending.next() {
        match command {
            HostCommand::Start(options) => {
                if active.is_some() {
                    warn!("Start ignored: {}", ALREADY_RUNNING_MESSAGE);
                    link.emit(HostEvent::StartFailed(ALREADY_RUNNING_MESSAGE.to_string()));
                    continue;
                }
                info!("Starting measure session");
                commands.insert_resource(spawn_session_setup(
                    options,
                    settings.capture_dir.clone(),
                    link.event_sender(),
                ));
                // Later commands are for the new session, requeue them
                let requeue = link.command_sender();
                for later in pending.by_ref() {
                    if requeue.send(later).is_err() {
                        warn!("Command queue closed while requeueing");
                    }
                }
                return;
            }
            HostCommand::SetUnit(unit) => match active.as_deref_mut() {
                Some(ActiveMeasurement(controller)) => controller.set_unit(unit),
                None => debug!("SetUnit ignored, no session"),
            },
            HostCommand::Reset => match active.as_deref_mut() {
                Some(ActiveMeasurement(controller)) => controller.reset(&mut *queue),
                None => debug!("Reset ignored, no session"),
            },
            HostCommand::Capture => match active.as_deref() {
                Some(ActiveMeasurement(controller)) => {
                    request_capture(&mut commands, controller, inbox.sender());
                }
                None => {
                    warn!("Capture requested without a session");
                    link.emit(HostEvent::CaptureComplete(CaptureResult::failed(
                        NO_SESSION_MESSAGE,
                    )));
                }
            },
            HostCommand::Close => {
                match active.take() {
                    Some(mut active) => active.0.close(&mut *queue),
                    None => {
                        debug!("Close without a session");
                        link.emit(HostEvent::Closed);
                    }
                }
                commands.remove_resource::<ActiveMeasurement>();
            }
        }
    }
}

/// Pick up the controller built by the setup thread.
pub fn finish_session_setup(
    mut commands: Commands,
    pending: Res<PendingSetup>,
    link: Res<MeasureLink>,
    mut warmup: ResMut<TrackingWarmup>,
) {
    let outcome = match pending.rx.try_recv() {
        Ok(outcome) => outcome,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => Err("Session setup ended unexpectedly".to_string()),
    };
    commands.remove_resource::<PendingSetup>();

    match outcome {
        Ok(controller) => {
            warmup.reset();
            commands.insert_resource(ActiveMeasurement(controller));
        }
        Err(message) => {
            warn!("Failed to start measure session: {}", message);
            link.emit(HostEvent::StartFailed(message));
        }
    }
}

/// Window focus stands in for AR session interruptions.
pub fn forward_tracking_interruptions(
    mut focus_events: MessageReader<WindowFocused>,
    mut active: Option<ResMut<ActiveMeasurement>>,
) {
    for event in focus_events.read() {
        let Some(active) = active.as_deref_mut() else {
            continue;
        };
        let tracking_event = if event.focused {
            TrackingEvent::InterruptionEnded
        } else {
            TrackingEvent::Interrupted
        };
        active.0.on_tracking_event(tracking_event);
    }
}

/// Per-frame tick at the measuring camera's view center.
pub fn tick_measurement(
    time: Res<Time>,
    settings: Res<MeasureSettings>,
    mut warmup: ResMut<TrackingWarmup>,
    mut active: ResMut<ActiveMeasurement>,
    mut queue: ResMut<LineRenderQueue>,
    cameras: Query<(&Camera, &GlobalTransform), With<MeasureCamera>>,
    mut camera_missing: Local<bool>,
) {
    let Ok((camera, camera_transform)) = cameras.single() else {
        if !*camera_missing {
            warn!("No measure camera, tracking unavailable");
            active.0.on_tracking_event(TrackingEvent::Failed);
            *camera_missing = true;
        }
        return;
    };
    *camera_missing = false;

    let Some(viewport) = camera.logical_viewport_size() else {
        return;
    };

    let mut tracker = GroundPlaneTracker {
        camera,
        camera_transform,
        plane_height: settings.tracking.plane_height,
        max_range: settings.tracking.max_range,
        ready: warmup.advance(settings.tracking.warmup_frames),
    };
    active.0.tick(
        time.elapsed_secs_f64(),
        &mut tracker,
        viewport / 2.0,
        &mut *queue,
    );
}

/// Left mouse or any touch drives the gesture.
pub fn handle_touch_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut contexts: EguiContexts,
    mut active: ResMut<ActiveMeasurement>,
    mut queue: ResMut<LineRenderQueue>,
) {
    let pressed = mouse_button.just_pressed(MouseButton::Left) || touches.any_just_pressed();
    let released = mouse_button.just_released(MouseButton::Left) || touches.any_just_released();

    if pressed {
        let over_ui = contexts
            .ctx_mut()
            .map(|ctx| ctx.wants_pointer_input())
            .unwrap_or(false);
        if over_ui {
            debug!("Press over HUD, not a measurement");
        } else if !active.0.touch_down(&mut *queue) {
            debug!("Touch-down ignored, no surface under the reticle");
        }
    }

    if released && active.0.session().is_measuring() {
        active.0.touch_up();
    }
}

/// Report finished captures and close the view when asked to.
pub fn deliver_capture_results(
    mut commands: Commands,
    link: Res<MeasureLink>,
    inbox: Res<CaptureInbox>,
    mut active: Option<ResMut<ActiveMeasurement>>,
    mut queue: ResMut<LineRenderQueue>,
) {
    for CaptureDelivery { result, close_after } in inbox.rx.try_iter() {
        info!("Capture complete: {}", result.message());
        link.emit(HostEvent::CaptureComplete(result));

        if close_after {
            if let Some(mut active) = active.take() {
                active.0.close(&mut *queue);
                commands.remove_resource::<ActiveMeasurement>();
            }
        }
    }
}
