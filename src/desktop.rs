//! Desktop host: a small room to measure in, keyboard commands, and the
//! host end of the measuring view's link.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::config::AppConfig;
use crate::measure::{HostCommand, HostEvent, HostLink};
use crate::units::Unit;

const FLOOR_SIZE: f32 = 8.0;

/// Host end of the measuring view's link.
#[derive(Resource)]
pub struct DesktopHost {
    pub link: HostLink,
}

/// Keyboard shortcut for a host command.
///
/// 1/2/3 pick cm/in/m, R resets, C captures, Escape closes.
pub fn key_command(keyboard: &ButtonInput<KeyCode>) -> Option<HostCommand> {
    let bindings = [
        (KeyCode::Digit1, HostCommand::SetUnit(Unit::Centimeter)),
        (KeyCode::Digit2, HostCommand::SetUnit(Unit::Inch)),
        (KeyCode::Digit3, HostCommand::SetUnit(Unit::Meter)),
        (KeyCode::KeyR, HostCommand::Reset),
        (KeyCode::KeyC, HostCommand::Capture),
        (KeyCode::Escape, HostCommand::Close),
    ];
    bindings
        .into_iter()
        .find(|(key, _)| keyboard.just_pressed(*key))
        .map(|(_, command)| command)
}

/// Floor, light and a few boxes to measure.
pub fn setup_room(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Name::new("Floor"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(FLOOR_SIZE, FLOOR_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.33, 0.3))),
        Transform::default(),
    ));

    let crate_mesh = meshes.add(Cuboid::new(0.4, 0.4, 0.4));
    let crate_material = materials.add(Color::srgb(0.7, 0.45, 0.2));
    for (i, x) in [-1.0_f32, 0.2, 1.3].into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("Crate {}", i)),
            Mesh3d(crate_mesh.clone()),
            MeshMaterial3d(crate_material.clone()),
            Transform::from_xyz(x, 0.2, -1.5 - i as f32 * 0.6),
        ));
    }

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 6.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Open the measuring view with the configured options.
pub fn send_start(host: Res<DesktopHost>, config: Res<AppConfig>) {
    info!("Opening measuring view");
    host.link.send(HostCommand::Start(config.start_options()));
}

pub fn handle_host_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    host: Res<DesktopHost>,
    mut contexts: EguiContexts,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    if let Some(command) = key_command(&keyboard) {
        host.link.send(command);
    }
}

/// Log what the measuring view reports; exit once it has closed.
pub fn handle_host_events(host: Res<DesktopHost>, mut exit: MessageWriter<AppExit>) {
    for event in host.link.drain_events() {
        match event {
            HostEvent::MeasurementCommitted(value) => info!("Measured {}", value),
            HostEvent::CaptureComplete(result) => info!("Capture result: {}", result.to_json()),
            HostEvent::StartFailed(message) => {
                error!("Measuring view failed to start: {}", message);
                exit.write(AppExit::error());
            }
            HostEvent::Closed => {
                info!("Measuring view closed");
                exit.write(AppExit::Success);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_pick_units() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Digit2);
        assert_eq!(key_command(&keyboard), Some(HostCommand::SetUnit(Unit::Inch)));
    }

    #[test]
    fn test_escape_closes() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Escape);
        assert_eq!(key_command(&keyboard), Some(HostCommand::Close));
    }

    #[test]
    fn test_held_key_fires_once() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyC);
        assert_eq!(key_command(&keyboard), Some(HostCommand::Capture));
        keyboard.clear();
        assert_eq!(key_command(&keyboard), None);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyZ);
        assert_eq!(key_command(&keyboard), None);
    }
}
