//! Collaborator doubles shared by unit tests.

use std::collections::{BTreeSet, VecDeque};

use bevy::prelude::Vec2;

use crate::measure::LineId;
use crate::scene::{LineOp, LineRenderer, SnapshotImage, SnapshotSource};
use crate::tracking::WorldTracker;
use crate::world::WorldPoint;

/// Records every renderer call.
#[derive(Default, Debug)]
pub struct RecordingRenderer {
    pub ops: Vec<LineOp>,
}

impl RecordingRenderer {
    /// Ids whose visuals are currently attached.
    pub fn attached(&self) -> BTreeSet<LineId> {
        let mut live = BTreeSet::new();
        for op in &self.ops {
            match op {
                LineOp::Attach { id, .. } => {
                    live.insert(*id);
                }
                LineOp::Detach { id } => {
                    live.remove(id);
                }
                LineOp::Update { .. } => {}
            }
        }
        live
    }
}

impl LineRenderer for RecordingRenderer {
    fn attach_line(&mut self, id: LineId, start: WorldPoint, end: WorldPoint) {
        self.ops.push(LineOp::Attach { id, start, end });
    }

    fn update_line(&mut self, id: LineId, end: WorldPoint) {
        self.ops.push(LineOp::Update { id, end });
    }

    fn detach_line(&mut self, id: LineId) {
        self.ops.push(LineOp::Detach { id });
    }
}

/// Plays back a fixed list of samples, then reports tracking lost.
#[derive(Default, Debug)]
pub struct ScriptedTracker {
    pub samples: VecDeque<Option<WorldPoint>>,
    pub queried: Vec<Vec2>,
}

impl ScriptedTracker {
    pub fn new(samples: impl IntoIterator<Item = Option<WorldPoint>>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            queried: Vec::new(),
        }
    }
}

impl WorldTracker for ScriptedTracker {
    fn sample_world_point(&mut self, screen_point: Vec2) -> Option<WorldPoint> {
        self.queried.push(screen_point);
        self.samples.pop_front().flatten()
    }
}

/// Solid-color snapshot of the given size.
pub struct FixedSnapshot {
    pub width: u32,
    pub height: u32,
}

impl SnapshotSource for FixedSnapshot {
    fn snapshot_image(&mut self) -> Option<SnapshotImage> {
        Some(SnapshotImage {
            width: self.width,
            height: self.height,
            rgba: [40u8, 90, 200, 255].repeat((self.width * self.height) as usize),
        })
    }
}
