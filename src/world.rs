//! World-space points and shared conversion constants.
//!
//! Tracking produces positions in its own right-handed frame with meters as
//! the unit. Everything downstream (lines, units, status text) works from
//! [`WorldPoint`] values and never touches the tracker's raw vectors.

use bevy::prelude::*;

use crate::units::Meters;

// =============================================================================
// Conversion Constants
// =============================================================================

/// Conversion factor: meters to centimeters
pub const METERS_TO_CENTIMETERS: f64 = 100.0;

/// Conversion factor: meters to inches
pub const METERS_TO_INCHES: f64 = 39.3701;

// =============================================================================
// World Points
// =============================================================================

/// A sampled position in the tracking frame, in meters.
///
/// Immutable once sampled. Absence of a sample (tracking lost) is modeled as
/// `Option<WorldPoint>` by the callers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint(Vec3);

impl WorldPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn position(self) -> Vec3 {
        self.0
    }

    /// Euclidean distance to another point.
    ///
    /// Computed in `f64` from the component deltas so that swapping the
    /// operands yields the exact same value.
    pub fn distance(self, other: WorldPoint) -> Meters {
        let delta = (other.0 - self.0).as_dvec3();
        Meters(delta.length())
    }

    pub fn midpoint(self, other: WorldPoint) -> Vec3 {
        (self.0 + other.0) * 0.5
    }
}

impl From<Vec3> for WorldPoint {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl From<WorldPoint> for Vec3 {
    fn from(p: WorldPoint) -> Self {
        p.0
    }
}

impl std::fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.0.x, self.0.y, self.0.z)
    }
}
