//! What the measuring view shows, decided frame by frame.

use crate::tracking::TrackingEvent;

pub const DETECTING_MESSAGE: &str = "Detecting the world…";
pub const HOLD_AND_MOVE_MESSAGE: &str = "Hold screen & move your phone…";
pub const CALCULATING_MESSAGE: &str = "Calculating…";
pub const TRACKING_FAILED_MESSAGE: &str = "Error occurred";
pub const INTERRUPTED_MESSAGE: &str = "Interrupted";
pub const INTERRUPTION_ENDED_MESSAGE: &str = "Interruption ended";

/// Center target appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reticle {
    /// World not detected yet
    #[default]
    Hidden,
    /// Ready to measure (white)
    Idle,
    /// Touch held, measuring (green)
    Active,
}

/// Status text and indicator state for the measuring view.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBoard {
    pub message: String,
    pub world_detected: bool,
    pub reticle: Reticle,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            message: DETECTING_MESSAGE.to_string(),
            world_detected: false,
            reticle: Reticle::Hidden,
        }
    }
}

impl StatusBoard {
    /// Loading indicator stays up until the first confident sample.
    pub fn is_loading(&self) -> bool {
        !self.world_detected
    }

    /// Update from one frame's tracking result.
    ///
    /// `live_distance` is the in-progress line's value when measuring, or
    /// `None` when idle. A frame without a sample changes nothing.
    pub fn on_frame(
        &mut self,
        has_sample: bool,
        has_committed_lines: bool,
        measuring: bool,
        live_distance: Option<String>,
    ) {
        if !has_sample {
            return;
        }

        if !self.world_detected {
            self.world_detected = true;
            self.reticle = Reticle::Idle;
        }

        if !has_committed_lines {
            self.message = HOLD_AND_MOVE_MESSAGE.to_string();
        }

        if measuring {
            self.message = live_distance.unwrap_or_else(|| CALCULATING_MESSAGE.to_string());
        }
    }

    pub fn on_measuring_changed(&mut self, measuring: bool) {
        if !self.world_detected {
            return;
        }
        self.reticle = if measuring { Reticle::Active } else { Reticle::Idle };
    }

    pub fn on_tracking_event(&mut self, event: TrackingEvent) {
        let message = match event {
            TrackingEvent::Failed => TRACKING_FAILED_MESSAGE,
            TrackingEvent::Interrupted => INTERRUPTED_MESSAGE,
            TrackingEvent::InterruptionEnded => INTERRUPTION_ENDED_MESSAGE,
        };
        self.message = message.to_string();
    }
}
