//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! through the RON watcher utilities (see `ron::setup_ron_watcher`).
//! Distances are in metres, speeds in metres per second and angles in degrees.
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Mouse sensitivity multiplier
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 1.0 }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("jump", "Space"),
            ("turn_left", "Left"),
            ("turn_right", "Right"),
            ("look_up", "Up"),
            ("look_down", "Down"),
            ("pause", "Escape"),
            ("toggle_debug", "F1"),
            ("toggle_sensors", "F2"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// action is unbound or its key name is unknown.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Locomotion tuning for the playable character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSettings {
    #[serde(default = "CharacterSettings::default_capsule_radius")]
    pub capsule_radius: f32, // Horizontal half-size of the collision body.
    #[serde(default = "CharacterSettings::default_capsule_half_height")]
    pub capsule_half_height: f32, // Vertical half-size of the collision body.
    #[serde(default = "CharacterSettings::default_max_walk_speed")]
    pub max_walk_speed: f32, // Planar speed at full stick deflection.
    #[serde(default = "CharacterSettings::default_jump_velocity")]
    pub jump_velocity: f32, // Vertical velocity applied when a jump starts.
    #[serde(default = "CharacterSettings::default_air_control")]
    pub air_control: f32, // Fraction of planar control kept while airborne (0..1).
    #[serde(default = "CharacterSettings::default_rotation_rate")]
    pub rotation_rate: f32, // Degrees per second the body turns toward its movement.
    #[serde(default = "CharacterSettings::default_gravity")]
    pub gravity: f32, // Vertical acceleration (negative is down).
    #[serde(default = "CharacterSettings::default_base_turn_rate")]
    pub base_turn_rate: f32, // Degrees per second for rate-style turn input at 1.0.
    #[serde(default = "CharacterSettings::default_base_look_up_rate")]
    pub base_look_up_rate: f32, // Degrees per second for rate-style look input at 1.0.
}

impl CharacterSettings {
    fn default_capsule_radius() -> f32 { 0.42 }
    fn default_capsule_half_height() -> f32 { 0.96 }
    fn default_max_walk_speed() -> f32 { 6.0 }
    fn default_jump_velocity() -> f32 { 6.0 }
    fn default_air_control() -> f32 { 0.2 }
    fn default_rotation_rate() -> f32 { 540.0 }
    fn default_gravity() -> f32 { -19.6 }
    fn default_base_turn_rate() -> f32 { 45.0 }
    fn default_base_look_up_rate() -> f32 { 45.0 }
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            capsule_radius: Self::default_capsule_radius(),
            capsule_half_height: Self::default_capsule_half_height(),
            max_walk_speed: Self::default_max_walk_speed(),
            jump_velocity: Self::default_jump_velocity(),
            air_control: Self::default_air_control(),
            rotation_rate: Self::default_rotation_rate(),
            gravity: Self::default_gravity(),
            base_turn_rate: Self::default_base_turn_rate(),
            base_look_up_rate: Self::default_base_look_up_rate(),
        }
    }
}

/// Climb detection and climb movement tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimbingSettings {
    #[serde(default = "ClimbingSettings::default_climb_speed")]
    pub climb_speed: f32, // Vertical speed while climbing at full forward input.
    #[serde(default = "ClimbingSettings::default_exit_impulse_multiplier")]
    pub exit_impulse_multiplier: f32, // Scales climb_speed for the push given when contacts drop.
    #[serde(default = "ClimbingSettings::default_sensor_radius")]
    pub sensor_radius: f32, // Radius of each proximity sphere.
    #[serde(default = "ClimbingSettings::default_sensor_reach")]
    pub sensor_reach: f32, // How far in front of the body centre the sensors sit.
    #[serde(default = "ClimbingSettings::default_vertical_spread")]
    pub vertical_spread: f32, // Offset of the up/down sensors from the body centre.
    #[serde(default = "ClimbingSettings::default_lateral_spread")]
    pub lateral_spread: f32, // Offset of the left/right sensors from the body centre.
    #[serde(default = "ClimbingSettings::default_show_sensors")]
    pub show_sensors: bool, // Draw sensor spheres at startup.
}

impl ClimbingSettings {
    fn default_climb_speed() -> f32 { 3.0 }
    fn default_exit_impulse_multiplier() -> f32 { 2.0 }
    fn default_sensor_radius() -> f32 { 0.16 }
    fn default_sensor_reach() -> f32 { 0.55 }
    fn default_vertical_spread() -> f32 { 0.6 }
    fn default_lateral_spread() -> f32 { 0.3 }
    fn default_show_sensors() -> bool { true }
}

impl Default for ClimbingSettings {
    fn default() -> Self {
        Self {
            climb_speed: Self::default_climb_speed(),
            exit_impulse_multiplier: Self::default_exit_impulse_multiplier(),
            sensor_radius: Self::default_sensor_radius(),
            sensor_reach: Self::default_sensor_reach(),
            vertical_spread: Self::default_vertical_spread(),
            lateral_spread: Self::default_lateral_spread(),
            show_sensors: Self::default_show_sensors(),
        }
    }
}

/// Follow camera (boom) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "CameraSettings::default_arm_length")]
    pub arm_length: f32, // Distance of the camera behind the pivot when unobstructed.
    #[serde(default = "CameraSettings::default_pivot_height")]
    pub pivot_height: f32, // Height of the boom pivot above the body centre.
    #[serde(default = "CameraSettings::default_probe_margin")]
    pub probe_margin: f32, // Gap kept between the camera and a blocking surface.
    #[serde(default = "CameraSettings::default_max_pitch")]
    pub max_pitch: f32, // Pitch clamp in degrees (both directions).
}

impl CameraSettings {
    fn default_arm_length() -> f32 { 3.0 }
    fn default_pivot_height() -> f32 { 0.6 }
    fn default_probe_margin() -> f32 { 0.12 }
    fn default_max_pitch() -> f32 { 85.0 }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            arm_length: Self::default_arm_length(),
            pivot_height: Self::default_pivot_height(),
            probe_margin: Self::default_probe_margin(),
            max_pitch: Self::default_max_pitch(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub character: CharacterSettings,
    #[serde(default)]
    pub climbing: ClimbingSettings,
    #[serde(default)]
    pub camera: CameraSettings,
}

/// Key names accepted in `controls.keybinds`, matched case-insensitively.
const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("A", KeyCode::KeyA), ("B", KeyCode::KeyB), ("C", KeyCode::KeyC), ("D", KeyCode::KeyD),
    ("E", KeyCode::KeyE), ("F", KeyCode::KeyF), ("G", KeyCode::KeyG), ("H", KeyCode::KeyH),
    ("I", KeyCode::KeyI), ("J", KeyCode::KeyJ), ("K", KeyCode::KeyK), ("L", KeyCode::KeyL),
    ("M", KeyCode::KeyM), ("N", KeyCode::KeyN), ("O", KeyCode::KeyO), ("P", KeyCode::KeyP),
    ("Q", KeyCode::KeyQ), ("R", KeyCode::KeyR), ("S", KeyCode::KeyS), ("T", KeyCode::KeyT),
    ("U", KeyCode::KeyU), ("V", KeyCode::KeyV), ("W", KeyCode::KeyW), ("X", KeyCode::KeyX),
    ("Y", KeyCode::KeyY), ("Z", KeyCode::KeyZ),
    ("0", KeyCode::Digit0), ("1", KeyCode::Digit1), ("2", KeyCode::Digit2), ("3", KeyCode::Digit3),
    ("4", KeyCode::Digit4), ("5", KeyCode::Digit5), ("6", KeyCode::Digit6), ("7", KeyCode::Digit7),
    ("8", KeyCode::Digit8), ("9", KeyCode::Digit9),
    ("F1", KeyCode::F1), ("F2", KeyCode::F2), ("F3", KeyCode::F3), ("F4", KeyCode::F4),
    ("F5", KeyCode::F5), ("F6", KeyCode::F6), ("F7", KeyCode::F7), ("F8", KeyCode::F8),
    ("F9", KeyCode::F9), ("F10", KeyCode::F10), ("F11", KeyCode::F11), ("F12", KeyCode::F12),
    ("LEFT", KeyCode::ArrowLeft), ("ARROWLEFT", KeyCode::ArrowLeft),
    ("RIGHT", KeyCode::ArrowRight), ("ARROWRIGHT", KeyCode::ArrowRight),
    ("UP", KeyCode::ArrowUp), ("ARROWUP", KeyCode::ArrowUp),
    ("DOWN", KeyCode::ArrowDown), ("ARROWDOWN", KeyCode::ArrowDown),
    ("ESC", KeyCode::Escape), ("ESCAPE", KeyCode::Escape),
    ("SPACE", KeyCode::Space), ("TAB", KeyCode::Tab),
    ("ENTER", KeyCode::Enter), ("RETURN", KeyCode::Enter),
    ("BACKSPACE", KeyCode::Backspace),
    ("LSHIFT", KeyCode::ShiftLeft), ("SHIFT", KeyCode::ShiftLeft), ("RSHIFT", KeyCode::ShiftRight),
    ("LCTRL", KeyCode::ControlLeft), ("CTRL", KeyCode::ControlLeft), ("RCTRL", KeyCode::ControlRight),
    ("LALT", KeyCode::AltLeft), ("ALT", KeyCode::AltLeft), ("RALT", KeyCode::AltRight),
];

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Descriptions for each setting field, grouped by section, so users can
    /// tell what a value does before editing the RON file.
    pub fn field_descriptions() -> HashMap<&'static str, HashMap<&'static str, &'static str>> {
        let mut out: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();

        out.insert("controls", HashMap::from([
            ("invert_y", "Invert the vertical look/mouse Y axis."),
            ("invert_x", "Invert the horizontal look/mouse X axis."),
            ("mouse_sensitivity", "Mouse look sensitivity multiplier."),
            ("keybinds", "Map of action names to key identifiers (editable by user)."),
        ]));

        out.insert("character", HashMap::from([
            ("capsule_radius", "Horizontal half-size of the character's collision body (m)."),
            ("capsule_half_height", "Vertical half-size of the character's collision body (m)."),
            ("max_walk_speed", "Planar speed at full input (m/s)."),
            ("jump_velocity", "Vertical velocity applied when a jump starts (m/s)."),
            ("air_control", "Fraction of planar control kept while airborne (0..1)."),
            ("rotation_rate", "How fast the body turns toward its movement (deg/s)."),
            ("gravity", "Vertical acceleration, negative is down (m/s^2)."),
            ("base_turn_rate", "Turn speed for rate-style input such as arrow keys (deg/s)."),
            ("base_look_up_rate", "Look up/down speed for rate-style input (deg/s)."),
        ]));

        out.insert("climbing", HashMap::from([
            ("climb_speed", "Vertical speed while climbing at full forward input (m/s)."),
            ("exit_impulse_multiplier", "Multiplier on climb_speed for the push applied when sensor contacts drop."),
            ("sensor_radius", "Radius of each of the four proximity spheres (m)."),
            ("sensor_reach", "Distance of the sensors in front of the body centre (m)."),
            ("vertical_spread", "Offset of the up/down sensors from the body centre (m)."),
            ("lateral_spread", "Offset of the left/right sensors from the body centre (m)."),
            ("show_sensors", "Draw the sensor spheres at startup (toggle in game with F2)."),
        ]));

        out.insert("camera", HashMap::from([
            ("arm_length", "Distance of the follow camera behind the character (m)."),
            ("pivot_height", "Height of the camera pivot above the body centre (m)."),
            ("probe_margin", "Gap kept between the camera and a surface blocking the arm (m)."),
            ("max_pitch", "Maximum look pitch up or down (deg)."),
        ]));

        out
    }

    /// Convert a key identifier from `controls.keybinds` (e.g. "W", "Space",
    /// "F1") into a `KeyCode`. Returns `None` for unknown names.
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let upper = name.trim().to_ascii_uppercase();
        KEY_NAMES
            .iter()
            .find(|(key, _)| *key == upper)
            .map(|(_, code)| *code)
    }
}

pub mod loader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_are_case_insensitive() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("Space"), Some(KeyCode::Space));
        assert_eq!(Settings::keycode_from_str("arrowLeft"), Some(KeyCode::ArrowLeft));
        assert_eq!(Settings::keycode_from_str("Hyper"), None);
    }

    #[test]
    fn unknown_binding_falls_back() {
        let mut controls = ControlsSettings::default();
        controls.keybinds.insert("jump".into(), "NotAKey".into());
        assert_eq!(controls.key("jump", KeyCode::Space), KeyCode::Space);
        assert_eq!(controls.key("forward", KeyCode::ArrowUp), KeyCode::KeyW);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let s: Settings = ::ron::from_str("(climbing: (climb_speed: 4.5))").unwrap();
        assert!((s.climbing.climb_speed - 4.5).abs() < f32::EPSILON);
        assert!((s.climbing.exit_impulse_multiplier - 2.0).abs() < f32::EPSILON);
        assert!((s.character.base_turn_rate - 45.0).abs() < f32::EPSILON);
        assert_eq!(s.controls.key("forward", KeyCode::ArrowUp), KeyCode::KeyW);
    }

    #[test]
    fn every_section_is_described() {
        let d = Settings::field_descriptions();
        for section in ["controls", "character", "climbing", "camera"] {
            assert!(d.contains_key(section), "missing {section}");
        }
        assert!(d["climbing"].contains_key("exit_impulse_multiplier"));
    }
}
