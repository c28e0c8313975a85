use bevy::log::{debug, info};
use bevy::prelude::Vec2;
use crossbeam_channel::Sender;
use std::path::PathBuf;

use super::host::{HostEvent, StartOptions};
use super::session::MeasurementSession;
use super::status::StatusBoard;
use crate::capture::{self, CaptureResult};
use crate::scene::{LineRenderer, SnapshotSource};
use crate::tracking::{TrackingEvent, WorldTracker};
use crate::units::Unit;
use crate::world::WorldPoint;

/// One open measuring view: session, status and the outbound event channel.
///
/// Driven by the host at its own cadence through [`MeasureController::tick`]
/// and the gesture entry points. Collaborators are passed in per call.
pub struct MeasureController {
    session: MeasurementSession,
    status: StatusBoard,
    events: Sender<HostEvent>,
    capture_dir: PathBuf,
    close_on_capture: bool,
    /// Most recent tracking result, used to anchor touch-downs
    last_sample: Option<WorldPoint>,
    last_tick: Option<f64>,
}

impl MeasureController {
    pub fn new(options: StartOptions, capture_dir: PathBuf, events: Sender<HostEvent>) -> Self {
        info!(
            "Measure session started (multiple points: {}, unit: {})",
            options.allow_multiple_points, options.unit
        );
        Self {
            session: MeasurementSession::new(options.allow_multiple_points, options.unit),
            status: StatusBoard::default(),
            events,
            capture_dir,
            close_on_capture: options.close_on_capture,
            last_sample: None,
            last_tick: None,
        }
    }

    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn capture_dir(&self) -> &PathBuf {
        &self.capture_dir
    }

    pub fn close_on_capture(&self) -> bool {
        self.close_on_capture
    }

    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }

    pub fn last_sample(&self) -> Option<WorldPoint> {
        self.last_sample
    }

    /// Per-frame update: sample tracking at `screen_center` and feed the session.
    pub fn tick(
        &mut self,
        timestamp: f64,
        tracker: &mut dyn WorldTracker,
        screen_center: Vec2,
        renderer: &mut dyn LineRenderer,
    ) {
        self.last_tick = Some(timestamp);
        let sample = tracker.sample_world_point(screen_center);
        self.last_sample = sample;

        let live = self.session.on_frame_sample(sample, renderer);
        if sample.is_none() && self.session.is_measuring() {
            debug!("Tracking lost at t={:.3}, holding current line", timestamp);
        }

        self.status.on_frame(
            sample.is_some(),
            !self.session.lines().is_empty(),
            self.session.is_measuring(),
            live.or_else(|| self.session.current_line().map(|l| l.distance())),
        );
    }

    /// Touch began: anchor at the latest sample.
    pub fn touch_down(&mut self, renderer: &mut dyn LineRenderer) -> bool {
        let started = self.session.on_touch_down(self.last_sample, renderer);
        self.status.on_measuring_changed(self.session.is_measuring());
        started
    }

    /// Touch ended: commit and report the value to the host.
    pub fn touch_up(&mut self) -> Option<String> {
        let committed = self.session.on_touch_up();
        self.status.on_measuring_changed(false);
        if let Some(value) = &committed {
            self.emit(HostEvent::MeasurementCommitted(value.clone()));
        }
        committed
    }

    pub fn set_unit(&mut self, unit: Unit) {
        info!("Measure unit set to {}", unit);
        self.session.on_unit_changed(unit);
    }

    pub fn reset(&mut self, renderer: &mut dyn LineRenderer) {
        info!("Measurements reset ({} removed)", self.session.lines().len());
        self.session.on_reset(renderer);
    }

    pub fn on_tracking_event(&mut self, event: TrackingEvent) {
        info!("Tracking event: {:?}", event);
        self.status.on_tracking_event(event);
    }

    /// Summary of committed measurements.
    pub fn measures(&self) -> Vec<String> {
        self.session.summary()
    }

    /// Synchronous capture; emits the result. Session state is not touched.
    pub fn capture(&self, source: &mut dyn SnapshotSource) -> CaptureResult {
        let result = capture::capture(source, &self.capture_dir, self.measures());
        self.emit(HostEvent::CaptureComplete(result.clone()));
        result
    }

    /// Release every visual and tell the host the view is gone.
    ///
    /// The controller should be dropped afterwards.
    pub fn close(&mut self, renderer: &mut dyn LineRenderer) {
        self.session.teardown(renderer);
        info!("Measure session closed");
        self.emit(HostEvent::Closed);
    }

    fn emit(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            debug!("Host event dropped, receiver gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedSnapshot, RecordingRenderer, ScriptedTracker};
    use crossbeam_channel::{unbounded, Receiver};

    fn p(x: f32, y: f32, z: f32) -> Option<WorldPoint> {
        Some(WorldPoint::new(x, y, z))
    }

    fn controller(options: StartOptions) -> (MeasureController, Receiver<HostEvent>) {
        let (tx, rx) = unbounded();
        let dir = std::env::temp_dir().join("ar-measure-controller-tests");
        (MeasureController::new(options, dir, tx), rx)
    }

    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    #[test]
    fn test_tick_samples_view_center() {
        let (mut ctl, _rx) = controller(StartOptions::new(true));
        let mut tracker = ScriptedTracker::new([None]);
        let mut renderer = RecordingRenderer::default();

        ctl.tick(0.016, &mut tracker, CENTER, &mut renderer);
        assert_eq!(tracker.queried, vec![CENTER]);
        assert_eq!(ctl.last_tick(), Some(0.016));
        assert!(ctl.status().is_loading());
    }

    #[test]
    fn test_touch_down_before_detection_does_not_start() {
        let (mut ctl, rx) = controller(StartOptions::new(true));
        let mut tracker = ScriptedTracker::new([None]);
        let mut renderer = RecordingRenderer::default();

        ctl.tick(0.0, &mut tracker, CENTER, &mut renderer);
        assert!(!ctl.touch_down(&mut renderer));
        assert!(!ctl.session().is_measuring());
        assert!(ctl.touch_up().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_gesture_emits_committed_value() {
        let (mut ctl, rx) = controller(StartOptions::new(true));
        let mut tracker = ScriptedTracker::new([p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.25)]);
        let mut renderer = RecordingRenderer::default();

        ctl.tick(0.0, &mut tracker, CENTER, &mut renderer);
        assert!(ctl.touch_down(&mut renderer));
        ctl.tick(0.016, &mut tracker, CENTER, &mut renderer);
        assert_eq!(ctl.status().message, "25.00 cm");

        let committed = ctl.touch_up();
        assert_eq!(committed.as_deref(), Some("25.00 cm"));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostEvent::MeasurementCommitted(ctl.session().lines()[0].distance())
        );
    }

    #[test]
    fn test_lost_tracking_mid_gesture_commits_last_position() {
        let (mut ctl, _rx) = controller(StartOptions::new(true));
        let mut tracker = ScriptedTracker::new([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), None]);
        let mut renderer = RecordingRenderer::default();

        ctl.set_unit(Unit::Meter);
        ctl.tick(0.0, &mut tracker, CENTER, &mut renderer);
        ctl.touch_down(&mut renderer);
        ctl.tick(0.016, &mut tracker, CENTER, &mut renderer);
        ctl.tick(0.033, &mut tracker, CENTER, &mut renderer);
        assert_eq!(ctl.status().message, "1.00 m");
        assert_eq!(ctl.touch_up().as_deref(), Some("1.00 m"));
    }

    #[test]
    fn test_unit_scenario_keeps_committed_unit() {
        let (mut ctl, _rx) = controller(StartOptions {
            unit: Unit::Meter,
            ..StartOptions::new(true)
        });
        let mut tracker = ScriptedTracker::new([
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
        ]);
        let mut renderer = RecordingRenderer::default();

        ctl.tick(0.0, &mut tracker, CENTER, &mut renderer);
        ctl.touch_down(&mut renderer);
        ctl.tick(0.1, &mut tracker, CENTER, &mut renderer);
        ctl.touch_up();

        ctl.set_unit(Unit::Centimeter);
        ctl.tick(0.2, &mut tracker, CENTER, &mut renderer);
        ctl.touch_down(&mut renderer);
        ctl.tick(0.3, &mut tracker, CENTER, &mut renderer);
        ctl.touch_up();

        assert_eq!(ctl.measures(), vec!["1.00 m", "100.00 cm"]);
    }

    #[test]
    fn test_capture_emits_result_without_touching_session() {
        let (mut ctl, rx) = controller(StartOptions::new(true));
        let mut tracker = ScriptedTracker::new([p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.1)]);
        let mut renderer = RecordingRenderer::default();
        ctl.tick(0.0, &mut tracker, CENTER, &mut renderer);
        ctl.touch_down(&mut renderer);
        ctl.tick(0.1, &mut tracker, CENTER, &mut renderer);
        ctl.touch_up();
        let _ = rx.try_recv();

        let dir = tempfile::tempdir().unwrap();
        ctl.capture_dir = dir.path().to_path_buf();
        let result = ctl.capture(&mut FixedSnapshot { width: 2, height: 2 });

        assert!(result.is_saved());
        assert_eq!(rx.try_recv().unwrap(), HostEvent::CaptureComplete(result));
        assert_eq!(ctl.session().lines().len(), 1);
    }

    #[test]
    fn test_close_releases_visuals_and_notifies_host() {
        let (mut ctl, rx) = controller(StartOptions::new(true));
        let mut tracker = ScriptedTracker::new([p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.1), p(0.5, 0.0, 0.0)]);
        let mut renderer = RecordingRenderer::default();
        ctl.tick(0.0, &mut tracker, CENTER, &mut renderer);
        ctl.touch_down(&mut renderer);
        ctl.tick(0.1, &mut tracker, CENTER, &mut renderer);
        ctl.touch_up();
        ctl.tick(0.2, &mut tracker, CENTER, &mut renderer);
        ctl.touch_down(&mut renderer);
        let _ = rx.try_recv();

        ctl.close(&mut renderer);
        assert!(renderer.attached().is_empty());
        assert_eq!(rx.try_recv().unwrap(), HostEvent::Closed);
    }

    #[test]
    fn test_tracking_event_updates_status() {
        let (mut ctl, _rx) = controller(StartOptions::new(true));
        ctl.on_tracking_event(TrackingEvent::Interrupted);
        assert_eq!(ctl.status().message, super::super::status::INTERRUPTED_MESSAGE);
    }
}
