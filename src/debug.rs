//! Debug dump: on the bound key (F3 by default) write diagnostics, process
//! memory, entity counts and every character's climb snapshot to a
//! timestamped text file in `./debug-dumps/`.
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::time::SystemTime;
use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};

use crate::climb::{ClimbStateTracker, ProximitySensor};
use crate::player::{Character, ControlRotation};

pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

fn kb_to_mb(kb: u64) -> String {
    format!("{:.2} MB", (kb as f64) / 1024.0)
}

/// Climb snapshot lines for one character and its sensors.
#[must_use]
pub fn climb_snapshot(
    entity: Entity,
    tf: &Transform,
    character: &Character,
    climb: &ClimbStateTracker,
    rotation: &ControlRotation,
    sensors: &[&ProximitySensor],
) -> String {
    let mut out = String::new();
    writeln!(out, "Character {entity:?}").ok();
    writeln!(out, "  position: {}", tf.translation).ok();
    writeln!(out, "  velocity: {} on_ground={}", character.velocity, character.on_ground).ok();
    writeln!(
        out,
        "  climbing={} contacts={} climb_speed={} exit_impulse={}",
        climb.is_in_climb_state(),
        climb.contact_count(),
        climb.climb_speed,
        climb.exit_impulse()
    )
    .ok();
    writeln!(out, "  control yaw={:.3} pitch={:.3}", rotation.yaw, rotation.pitch).ok();
    for s in sensors {
        writeln!(out, "  sensor {:<5} touching {:?}", s.direction.name(), s.contacts()).ok();
    }
    out
}

fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<crate::settings::Settings>,
    diagnostics: Res<DiagnosticsStore>,
    query_entities: Query<Entity>,
    characters: Query<(Entity, &Transform, &Character, &ClimbStateTracker, &ControlRotation)>,
    sensors: Query<&ProximitySensor>,
) {
    if !keys.just_pressed(settings.controls.key("dump_debug", KeyCode::F3)) {
        return;
    }

    let now = SystemTime::now();
    let dt: DateTime<Utc> = DateTime::from(now);
    let human_ts = dt.format("%Y-%m-%d %H:%M:%S").to_string();
    let fname = format!("{}/debug-{}.txt", DUMP_DIR, dt.timestamp());

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let mut sys = System::new();
    let pid = Pid::from_u32(std::process::id());
    sys.refresh_process(pid);
    let proc_mem_kb = sys.process(pid).map_or(0, |p| p.memory() / 1024);

    let mut out = String::new();
    writeln!(out, "Timestamp: {human_ts}").ok();
    writeln!(out, "FPS: {:.1}, frame_time: {:.4} ms", fps, frame_time).ok();
    writeln!(out, "Entities: {}", query_entities.iter().count()).ok();
    writeln!(out, "Process memory: {}", kb_to_mb(proc_mem_kb)).ok();
    writeln!(out).ok();

    for (entity, tf, character, climb, rotation) in &characters {
        let owned: Vec<&ProximitySensor> = sensors.iter().filter(|s| s.owner == entity).collect();
        out.push_str(&climb_snapshot(entity, tf, character, climb, rotation, &owned));
    }

    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{}': {}", DUMP_DIR, e);
        return;
    }
    if let Err(e) = fs::write(&fname, out) {
        error!("debug dump: failed to write {}: {}", fname, e);
    } else {
        info!("wrote debug dump: {}", fname);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::{SensorDirection, SensorLayout};

    #[test]
    fn snapshot_lists_each_sensor() {
        let owner = Entity::from_raw(3);
        let layout = SensorLayout::from(&crate::settings::ClimbingSettings::default());
        let sensors: Vec<ProximitySensor> = SensorDirection::ALL
            .iter()
            .map(|d| ProximitySensor::new(owner, *d, &layout))
            .collect();
        let refs: Vec<&ProximitySensor> = sensors.iter().collect();

        let text = climb_snapshot(
            owner,
            &Transform::default(),
            &Character::default(),
            &ClimbStateTracker::default(),
            &ControlRotation::default(),
            &refs,
        );
        assert!(text.contains("climbing=false contacts=0"));
        for d in SensorDirection::ALL {
            assert!(text.contains(&format!("sensor {:<5}", d.name())));
        }
    }
}
