use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::tracking::MeasureCamera;

/// Walking speed, meters per second.
const MOVE_SPEED: f32 = 1.2;
/// Turn rate, radians per second.
const TURN_SPEED: f32 = 1.2;
/// Eye height the camera starts at, meters.
const EYE_HEIGHT: f32 = 1.4;
/// Pitch limit so the view never flips.
const MAX_PITCH: f32 = 1.45;

// =============================================================================
// Components
// =============================================================================

/// Handheld-device stand-in: position plus yaw/pitch.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        // Looking forward and down at the floor
        Self { yaw: 0.0, pitch: -0.6 }
    }
}

impl CameraRig {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Keyboard intent for one frame, in rig-local terms.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RigInput {
    /// x = strafe right, y = up, z = forward
    pub movement: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl RigInput {
    pub fn from_keys(keyboard: &ButtonInput<KeyCode>) -> Self {
        let axis = |pos: KeyCode, neg: KeyCode| {
            keyboard.pressed(pos) as i32 as f32 - keyboard.pressed(neg) as i32 as f32
        };
        Self {
            movement: Vec3::new(
                axis(KeyCode::KeyD, KeyCode::KeyA),
                axis(KeyCode::KeyE, KeyCode::KeyQ),
                axis(KeyCode::KeyW, KeyCode::KeyS),
            ),
            yaw: axis(KeyCode::ArrowLeft, KeyCode::ArrowRight),
            pitch: axis(KeyCode::ArrowUp, KeyCode::ArrowDown),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.movement == Vec3::ZERO && self.yaw == 0.0 && self.pitch == 0.0
    }
}

/// Advance the rig by one frame of input. Movement stays level with the floor.
pub fn step_rig(rig: &mut CameraRig, transform: &mut Transform, input: RigInput, dt: f32) {
    rig.yaw += input.yaw * TURN_SPEED * dt;
    rig.pitch = (rig.pitch + input.pitch * TURN_SPEED * dt).clamp(-MAX_PITCH, MAX_PITCH);

    let heading = Quat::from_rotation_y(rig.yaw);
    let forward = heading * Vec3::NEG_Z;
    let right = heading * Vec3::X;
    let step = right * input.movement.x + Vec3::Y * input.movement.y + forward * input.movement.z;
    transform.translation += step.normalize_or_zero() * MOVE_SPEED * dt;
    transform.rotation = rig.rotation();
}

// =============================================================================
// Systems
// =============================================================================

pub fn spawn_measure_camera(mut commands: Commands) {
    let rig = CameraRig::default();
    commands.spawn((
        Name::new("Measure Camera"),
        Camera3d::default(),
        Transform::from_xyz(0.0, EYE_HEIGHT, 1.5).with_rotation(rig.rotation()),
        rig,
        MeasureCamera,
    ));
}

/// WASD/QE to walk, arrows to look around.
pub fn move_camera_rig(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut contexts: EguiContexts,
    mut rigs: Query<(&mut CameraRig, &mut Transform)>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    let input = RigInput::from_keys(&keyboard);
    if input.is_idle() {
        return;
    }

    for (mut rig, mut transform) in rigs.iter_mut() {
        step_rig(&mut rig, &mut transform, input, time.delta_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_origin() -> (CameraRig, Transform) {
        let rig = CameraRig { yaw: 0.0, pitch: 0.0 };
        (rig, Transform::from_rotation(rig.rotation()))
    }

    #[test]
    fn test_forward_moves_along_view_direction() {
        let (mut rig, mut transform) = at_origin();
        let input = RigInput {
            movement: Vec3::Z,
            ..RigInput::default()
        };
        step_rig(&mut rig, &mut transform, input, 1.0);
        assert!((transform.translation - Vec3::new(0.0, 0.0, -MOVE_SPEED)).length() < 1e-5);
    }

    #[test]
    fn test_movement_ignores_pitch() {
        let (mut rig, mut transform) = at_origin();
        rig.pitch = -1.0;
        let input = RigInput {
            movement: Vec3::Z,
            ..RigInput::default()
        };
        step_rig(&mut rig, &mut transform, input, 1.0);
        assert!(transform.translation.y.abs() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let (mut rig, mut transform) = at_origin();
        let input = RigInput {
            pitch: -1.0,
            ..RigInput::default()
        };
        step_rig(&mut rig, &mut transform, input, 100.0);
        assert_eq!(rig.pitch, -MAX_PITCH);
    }

    #[test]
    fn test_keys_map_to_axes() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyW);
        keyboard.press(KeyCode::KeyQ);
        keyboard.press(KeyCode::ArrowRight);
        let input = RigInput::from_keys(&keyboard);
        assert_eq!(input.movement, Vec3::new(0.0, -1.0, 1.0));
        assert_eq!(input.yaw, -1.0);
        assert_eq!(input.pitch, 0.0);
        assert!(RigInput::from_keys(&ButtonInput::default()).is_idle());
    }
}
