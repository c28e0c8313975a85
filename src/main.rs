use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use ar_measure::camera::{move_camera_rig, spawn_measure_camera};
use ar_measure::config::load_config;
use ar_measure::desktop::{handle_host_events, handle_host_keys, send_start, setup_room, DesktopHost};
use ar_measure::measure::{host_link, MeasurePlugin};

fn main() {
    let config = load_config();
    let (host, link) = host_link();

    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "AR Measure".to_string(),
                    resolution: (1280, 720).into(),
                    ..default()
                }),
                ..default()
            }),
            EguiPlugin::default(),
            MeasurePlugin {
                link,
                tracking: config.tracking.clone(),
                capture_dir: config.capture.resolved_directory(),
            },
        ))
        .insert_resource(config)
        .insert_resource(DesktopHost { link: host })
        .add_systems(Startup, (setup_room, spawn_measure_camera, send_start))
        .add_systems(Update, (move_camera_rig, handle_host_keys, handle_host_events))
        .run();
}
