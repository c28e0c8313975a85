use crate::scene::LineRenderer;
use crate::units::{Meters, Unit};
use crate::world::WorldPoint;

/// Handle shared between a line and its visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u64);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One measurement segment.
///
/// `start` is fixed at creation. `end` follows the tracked point until the
/// line is committed, after which the line is frozen. The display unit is
/// captured at creation and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    start: WorldPoint,
    end: WorldPoint,
    unit: Unit,
    committed: bool,
    attached: bool,
}

impl Line {
    /// New zero-length line anchored at `start`.
    pub fn new(id: LineId, start: WorldPoint, unit: Unit) -> Self {
        Self {
            id,
            start,
            end: start,
            unit,
            committed: false,
            attached: false,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn start(&self) -> WorldPoint {
        self.start
    }

    pub fn end(&self) -> WorldPoint {
        self.end
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Hand the line to the renderer.
    pub fn attach(&mut self, renderer: &mut dyn LineRenderer) {
        if self.attached {
            return;
        }
        renderer.attach_line(self.id, self.start, self.end);
        self.attached = true;
    }

    /// Move the free end and redraw. Committed lines ignore this.
    pub fn update(&mut self, to: WorldPoint, renderer: &mut dyn LineRenderer) {
        if self.committed {
            return;
        }
        self.end = to;
        if self.attached {
            renderer.update_line(self.id, to);
        }
    }

    pub fn commit(&mut self) {
        self.committed = true;
    }

    pub fn length(&self) -> Meters {
        self.start.distance(self.end)
    }

    /// Formatted length in this line's unit, e.g. `"12.30 cm"`.
    pub fn distance(&self) -> String {
        self.length().format(self.unit)
    }

    /// Detach the visual. Safe to call more than once.
    pub fn remove(&mut self, renderer: &mut dyn LineRenderer) {
        if !self.attached {
            return;
        }
        renderer.detach_line(self.id);
        self.attached = false;
    }
}
