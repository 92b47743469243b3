use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use ledge::climb::{draw_sensor_gizmos, toggle_sensor_gizmos, SensorGizmosVisible};
use ledge::debug::DebugDumpPlugin;
use ledge::input::gather_input;
use ledge::player::{cursor_grab, CharacterPlugin, CharacterSet};
use ledge::settings::loader as settings_loader;
use ledge::ui::{
    setup_debug_overlay, spawn_debug_overlay, toggle_debug_overlay, update_debug_overlay,
};
use ledge::world::level::{load_level_from_dir, LEVELS_DIR};

mod app;
use app::{setup, sync_sensor_visibility};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());
    let level = load_level_from_dir(LEVELS_DIR);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "ledge".to_string(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(CharacterPlugin)
        .add_plugins(DebugDumpPlugin);

    app.insert_resource(SensorGizmosVisible(settings.climbing.show_sensors));
    app.insert_resource(level);
    app.insert_resource(settings);
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, setup_debug_overlay);
    app.add_systems(Startup, spawn_debug_overlay);
    app.add_systems(Startup, setup);
    app.add_systems(Update, gather_input.in_set(CharacterSet::Input));
    app.add_systems(Update, settings_loader::check_settings_changes.before(CharacterSet::Input));
    app.add_systems(Update, sync_sensor_visibility);
    app.add_systems(Update, toggle_sensor_gizmos.after(sync_sensor_visibility));
    app.add_systems(Update, draw_sensor_gizmos.after(CharacterSet::Simulate));
    app.add_systems(Update, toggle_debug_overlay);
    app.add_systems(Update, update_debug_overlay.after(CharacterSet::Simulate));
    app.add_systems(Update, cursor_grab);

    app.run();
}
