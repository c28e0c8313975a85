use bevy::log::{debug, info};

use super::line::{Line, LineId};
use crate::scene::LineRenderer;
use crate::units::Unit;
use crate::world::WorldPoint;

/// Whether a measurement is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Measuring,
}

/// Committed lines plus the one being dragged, for a single interactive run.
///
/// `current_line` is `Some` exactly while a touch is held after a successful
/// anchor, so the measuring flag is derived from it rather than stored.
#[derive(Debug)]
pub struct MeasurementSession {
    lines: Vec<Line>,
    current_line: Option<Line>,
    active_unit: Unit,
    allow_multiple_points: bool,
    next_id: u64,
}

impl MeasurementSession {
    pub fn new(allow_multiple_points: bool, unit: Unit) -> Self {
        Self {
            lines: Vec::new(),
            current_line: None,
            active_unit: unit,
            allow_multiple_points,
            next_id: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.current_line.is_some() {
            SessionState::Measuring
        } else {
            SessionState::Idle
        }
    }

    pub fn is_measuring(&self) -> bool {
        self.current_line.is_some()
    }

    /// Committed lines in commit order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn current_line(&self) -> Option<&Line> {
        self.current_line.as_ref()
    }

    pub fn active_unit(&self) -> Unit {
        self.active_unit
    }

    pub fn allow_multiple_points(&self) -> bool {
        self.allow_multiple_points
    }

    /// Start a measurement anchored at `sample`.
    ///
    /// Returns false when nothing started: no anchor, or a measurement is
    /// already in progress.
    pub fn on_touch_down(
        &mut self,
        sample: Option<WorldPoint>,
        renderer: &mut dyn LineRenderer,
    ) -> bool {
        if self.current_line.is_some() {
            debug!("Touch down while measuring, ignored");
            return false;
        }
        let Some(anchor) = sample else {
            debug!("Touch down without a world anchor, no measurement started");
            return false;
        };

        if !self.allow_multiple_points {
            self.remove_committed(renderer);
        }

        let id = LineId(self.next_id);
        self.next_id += 1;

        let mut line = Line::new(id, anchor, self.active_unit);
        line.attach(renderer);
        debug!("Measurement {} started at {}", id, anchor);
        self.current_line = Some(line);
        true
    }

    /// Feed this frame's sample to the in-progress line.
    ///
    /// Returns the live distance when the line moved. An absent sample
    /// leaves the line where it was.
    pub fn on_frame_sample(
        &mut self,
        sample: Option<WorldPoint>,
        renderer: &mut dyn LineRenderer,
    ) -> Option<String> {
        let line = self.current_line.as_mut()?;
        let point = sample?;
        line.update(point, renderer);
        Some(line.distance())
    }

    /// Commit the in-progress line, returning its formatted value.
    pub fn on_touch_up(&mut self) -> Option<String> {
        let mut line = self.current_line.take()?;
        line.commit();
        let value = line.distance();
        info!("Measurement {} committed: {}", line.id(), value);
        self.lines.push(line);
        Some(value)
    }

    /// Remove all committed lines. An in-progress line is kept.
    pub fn on_reset(&mut self, renderer: &mut dyn LineRenderer) {
        self.remove_committed(renderer);
    }

    /// Applies to lines created from now on.
    pub fn on_unit_changed(&mut self, unit: Unit) {
        self.active_unit = unit;
    }

    /// Formatted value of every committed line, in commit order.
    pub fn summary(&self) -> Vec<String> {
        self.lines.iter().map(Line::distance).collect()
    }

    /// Detach every visual, in-progress line included.
    pub fn teardown(&mut self, renderer: &mut dyn LineRenderer) {
        if let Some(mut line) = self.current_line.take() {
            line.remove(renderer);
        }
        self.remove_committed(renderer);
    }

    fn remove_committed(&mut self, renderer: &mut dyn LineRenderer) {
        for line in self.lines.iter_mut() {
            line.remove(renderer);
        }
        self.lines.clear();
    }
}
