//! Tracking collaborator: turns a screen point into a world point.
//!
//! On a device this is the AR session's raycast against detected surfaces.
//! The desktop build stands in a camera ray against a horizontal ground
//! plane, with a short warm-up so the "detecting" phase is visible.

use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;

use crate::world::WorldPoint;

/// Source of world points for a screen location.
pub trait WorldTracker {
    /// `None` means no confident surface under the point this frame.
    fn sample_world_point(&mut self, screen_point: Vec2) -> Option<WorldPoint>;
}

/// Health changes reported by the tracking session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingEvent {
    Failed,
    Interrupted,
    InterruptionEnded,
}

/// Marker for the camera whose view center is measured from.
#[derive(Component)]
pub struct MeasureCamera;

/// Intersect a ray with the horizontal plane at `plane_height`.
///
/// Hits farther than `max_range` are treated as not confident.
pub fn sample_ground_plane(ray: Ray3d, plane_height: f32, max_range: f32) -> Option<WorldPoint> {
    let distance = ray.intersect_plane(
        Vec3::new(0.0, plane_height, 0.0),
        InfinitePlane3d::new(Vec3::Y),
    )?;
    if distance > max_range {
        return None;
    }
    Some(ray.get_point(distance).into())
}

/// Ground-plane tracker bound to one camera for the current frame.
pub struct GroundPlaneTracker<'a> {
    pub camera: &'a Camera,
    pub camera_transform: &'a GlobalTransform,
    pub plane_height: f32,
    pub max_range: f32,
    /// False while the warm-up is still running
    pub ready: bool,
}

impl WorldTracker for GroundPlaneTracker<'_> {
    fn sample_world_point(&mut self, screen_point: Vec2) -> Option<WorldPoint> {
        if !self.ready {
            return None;
        }
        let ray = self
            .camera
            .viewport_to_world(self.camera_transform, screen_point)
            .ok()?;
        sample_ground_plane(ray, self.plane_height, self.max_range)
    }
}

/// Counts frames since the measuring view opened.
#[derive(Resource, Default, Debug)]
pub struct TrackingWarmup {
    frames_seen: u32,
}

impl TrackingWarmup {
    /// Count one frame; returns true once `required` frames have passed.
    pub fn advance(&mut self, required: u32) -> bool {
        self.frames_seen = self.frames_seen.saturating_add(1);
        self.frames_seen > required
    }

    pub fn reset(&mut self) {
        self.frames_seen = 0;
    }
}
