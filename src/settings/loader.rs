//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If multiple
//! RON files are present, the first successfully parsed `Settings` (in file name
//! order) is used. If none parse, default settings are used.
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use bevy::prelude::*;

pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub crate::ron::RonWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Load settings from `path` (directory).
///
/// # Example
/// ```no_run
/// let settings = ledge::settings::loader::load_settings_from_dir("data/settings");
/// ```
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    match items.into_iter().next() {
        Some(first) => first,
        None => {
            warn!("no usable settings in '{path}', using defaults");
            Settings::defaults()
        }
    }
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Propagates the `notify::Error` when the directory cannot be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Reload the `Settings` resource when the watcher saw a change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        info!("settings changed, reloading");
        *settings = load_settings_from_dir(SETTINGS_DIR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_gives_defaults() {
        let s = load_settings_from_dir("/no/such/settings/dir");
        assert!((s.camera.arm_length - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn first_parsable_file_wins() {
        let dir = std::env::temp_dir().join(format!("ledge-settings-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("0-broken.ron"), "(camera: (arm_length: oops))").unwrap();
        std::fs::write(dir.join("1-good.ron"), "(camera: (arm_length: 5.0))").unwrap();

        let s = load_settings_from_dir(dir.to_str().unwrap());
        assert!((s.camera.arm_length - 5.0).abs() < f32::EPSILON);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
