//! Rendering collaborator: line visuals and render-surface snapshots.
//!
//! The measurement core only talks to [`LineRenderer`] and
//! [`SnapshotSource`]. In the Bevy app, [`LineRenderQueue`] records the
//! calls and [`apply_line_ops`] turns them into mesh entities once per frame.

use bevy::prelude::*;

use crate::measure::LineId;
use crate::world::WorldPoint;

/// Cross-section of a rendered measurement line, in meters.
const LINE_THICKNESS: f32 = 0.005;
/// Smallest length a line visual is scaled to, keeps the transform invertible.
const MIN_VISUAL_LENGTH: f32 = 1.0e-4;

// =============================================================================
// Collaborator Interfaces
// =============================================================================

/// Fire-and-forget drawing calls for measurement lines.
pub trait LineRenderer {
    fn attach_line(&mut self, id: LineId, start: WorldPoint, end: WorldPoint);
    fn update_line(&mut self, id: LineId, end: WorldPoint);
    fn detach_line(&mut self, id: LineId);
}

/// Raw RGBA8 still of the render surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Something that can hand out a still image of what is on screen.
pub trait SnapshotSource {
    fn snapshot_image(&mut self) -> Option<SnapshotImage>;
}

/// A frame that was already grabbed; yields it once.
impl SnapshotSource for Option<SnapshotImage> {
    fn snapshot_image(&mut self) -> Option<SnapshotImage> {
        self.take()
    }
}

/// Convert a captured Bevy image into raw RGBA bytes.
pub fn snapshot_from_image(image: Image) -> Option<SnapshotImage> {
    match image.try_into_dynamic() {
        Ok(dynamic) => {
            let rgba = dynamic.to_rgba8();
            Some(SnapshotImage {
                width: rgba.width(),
                height: rgba.height(),
                rgba: rgba.into_raw(),
            })
        }
        Err(e) => {
            warn!("Failed to convert screenshot to RGBA: {:?}", e);
            None
        }
    }
}

// =============================================================================
// Bevy Line Visuals
// =============================================================================

/// A recorded renderer call, applied to the ECS later in the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOp {
    Attach { id: LineId, start: WorldPoint, end: WorldPoint },
    Update { id: LineId, end: WorldPoint },
    Detach { id: LineId },
}

/// Renderer handed to the measurement core inside Bevy systems.
#[derive(Resource, Default, Debug)]
pub struct LineRenderQueue {
    ops: Vec<LineOp>,
}

impl LineRenderQueue {
    pub fn drain(&mut self) -> Vec<LineOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl LineRenderer for LineRenderQueue {
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

/// Component for a measurement line entity
#[derive(Component, Debug)]
pub struct MeasureLineVisual {
    pub id: LineId,
    /// Anchor point, fixed for the life of the line
    pub start: Vec3,
}

/// Shared mesh and material for all line visuals
#[derive(Resource)]
pub struct LineAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

pub fn setup_line_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 1.0, 1.0),
        unlit: true,
        ..default()
    });
    commands.insert_resource(LineAssets { mesh, material });
}

/// Pose a unit cube so it spans `start..end`.
pub fn segment_transform(start: Vec3, end: Vec3) -> Transform {
    let delta = end - start;
    let length = delta.length();
    let rotation = if length > f32::EPSILON {
        Quat::from_rotation_arc(Vec3::Y, delta / length)
    } else {
        Quat::IDENTITY
    };

    Transform {
        translation: (start + end) * 0.5,
        rotation,
        scale: Vec3::new(LINE_THICKNESS, length.max(MIN_VISUAL_LENGTH), LINE_THICKNESS),
    }
}

/// Apply queued renderer calls to line entities.
///
/// Spawns are deferred, so an attach followed by updates in the same frame
/// is folded into a single spawn at the latest end point.
pub fn apply_line_ops(
    mut commands: Commands,
    mut queue: ResMut<LineRenderQueue>,
    assets: Option<Res<LineAssets>>,
    mut visuals: Query<(Entity, &MeasureLineVisual, &mut Transform)>,
) {
    if queue.is_empty() {
        return;
    }

    let mut pending: Vec<(LineId, Vec3, Vec3)> = Vec::new();

    for op in queue.drain() {
        match op {
            LineOp::Attach { id, start, end } => {
                pending.push((id, start.into(), end.into()));
            }
            LineOp::Update { id, end } => {
                if let Some(spawn) = pending.iter_mut().find(|p| p.0 == id) {
                    spawn.2 = end.into();
                } else if let Some((_, visual, mut transform)) =
                    visuals.iter_mut().find(|(_, v, _)| v.id == id)
                {
                    *transform = segment_transform(visual.start, end.into());
                }
            }
            LineOp::Detach { id } => {
                pending.retain(|p| p.0 != id);
                for (entity, visual, _) in visuals.iter() {
                    if visual.id == id {
                        commands.entity(entity).despawn();
                    }
                }
            }
        }
    }

    let Some(assets) = assets else {
        if !pending.is_empty() {
            warn!("Line assets missing, dropping {} line visuals", pending.len());
        }
        return;
    };

    for (id, start, end) in pending {
        commands.spawn((
            Name::new(format!("Measure Line {}", id)),
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.material.clone()),
            segment_transform(start, end),
            MeasureLineVisual { id, start },
        ));
    }
}
