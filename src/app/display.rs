//! Display-related systems, such as syncing the sensor gizmo preference
//! from the main `Settings` resource into `SensorGizmosVisible`.
use bevy::prelude::*;
use ledge::climb::SensorGizmosVisible;
use ledge::settings::Settings;

/// Sync `Settings.climbing.show_sensors` into `SensorGizmosVisible`.
/// Only a changed preference is applied, so the F2 toggle survives
/// unrelated settings reloads.
///
/// # Example
/// ```ignore
/// app.add_systems(Update, crate::app::sync_sensor_visibility);
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn sync_sensor_visibility(
    settings: Res<Settings>,
    mut visible: ResMut<SensorGizmosVisible>,
    mut last: Local<Option<bool>>,
) {
    let desired = settings.climbing.show_sensors;
    if *last == Some(desired) { return; }

    visible.0 = desired;
    *last = Some(desired);
}
