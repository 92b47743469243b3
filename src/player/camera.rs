//! Controller rotation, follow camera and cursor helpers.
//!
//! The controller rotation (yaw/pitch) is separate from the body: turning the
//! camera does not turn the character, it only changes which way "forward"
//! points for movement input. The follow camera hangs behind the controller
//! rotation on a boom that is pulled in when a surface blocks it.

use bevy::math::EulerRot;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::input::CharacterInput;
use crate::player::Character;
use crate::settings::Settings;
use crate::world::Surface;

/// Radians of rotation per pixel of mouse motion at sensitivity 1.0.
const MOUSE_RADIANS_PER_PIXEL: f32 = 0.002;

/// Anything that can answer "which way is the controller facing".
pub trait OrientationProvider {
    /// Current yaw in radians around +Y.
    fn yaw(&self) -> f32;
}

/// Controller look orientation in radians.
///
/// - `yaw`: horizontal rotation around the Y axis.
/// - `pitch`: vertical rotation around the X axis, clamped.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlRotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl OrientationProvider for ControlRotation {
    fn yaw(&self) -> f32 {
        self.yaw
    }
}

impl ControlRotation {
    /// Apply absolute look deltas (mouse style). Positive `turn` looks right,
    /// positive `look_up` looks up.
    pub fn apply_delta(&mut self, turn: f32, look_up: f32, sensitivity: f32, max_pitch_deg: f32) {
        let scale = sensitivity * MOUSE_RADIANS_PER_PIXEL;
        self.yaw -= turn * scale;
        self.pitch += look_up * scale;
        self.clamp_pitch(max_pitch_deg);
    }

    /// Apply rate-style look input (stick or held keys): a value of 1.0 turns
    /// at `base_*_rate` degrees per second.
    pub fn apply_rates(
        &mut self,
        turn_rate: f32,
        look_up_rate: f32,
        settings: &crate::settings::CharacterSettings,
        max_pitch_deg: f32,
        dt: f32,
    ) {
        self.yaw -= (turn_rate * settings.base_turn_rate * dt).to_radians();
        self.pitch += (look_up_rate * settings.base_look_up_rate * dt).to_radians();
        self.clamp_pitch(max_pitch_deg);
    }

    fn clamp_pitch(&mut self, max_pitch_deg: f32) {
        let max_pitch = max_pitch_deg.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);
    }

    /// Full look rotation: yaw around Y then pitch around X.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Apply this frame's look input to every controlled character.
#[allow(clippy::needless_pass_by_value)]
pub fn control_look(
    input: Res<CharacterInput>,
    settings: Res<Settings>,
    time: Res<Time>,
    mut query: Query<&mut ControlRotation, With<Character>>,
) {
    let dt = time.delta_seconds();
    for mut rotation in &mut query {
        if input.turn != 0.0 || input.look_up != 0.0 {
            rotation.apply_delta(
                input.turn,
                input.look_up,
                settings.controls.mouse_sensitivity,
                settings.camera.max_pitch,
            );
        }
        if input.turn_rate != 0.0 || input.look_up_rate != 0.0 {
            rotation.apply_rates(
                input.turn_rate,
                input.look_up_rate,
                &settings.character,
                settings.camera.max_pitch,
                dt,
            );
        }
    }
}

/// Camera that trails `target` on a boom.
#[derive(Component, Debug, Clone, Copy)]
pub struct FollowCamera {
    pub target: Entity,
}

/// Length of the boom from `pivot` along `back`, shortened so the camera
/// stays `margin` in front of the nearest blocking surface.
#[must_use]
pub fn boom_length(
    pivot: Vec3,
    back: Vec3,
    arm_length: f32,
    margin: f32,
    surfaces: impl IntoIterator<Item = crate::world::Bounds>,
) -> f32 {
    let nearest = surfaces
        .into_iter()
        .filter_map(|b| b.ray_hit(pivot, back, arm_length))
        .fold(arm_length, f32::min);
    if nearest < arm_length {
        (nearest - margin).max(0.0)
    } else {
        arm_length
    }
}

/// Place each follow camera behind its target's controller rotation.
#[allow(clippy::needless_pass_by_value)]
pub fn follow_camera(
    settings: Res<Settings>,
    targets: Query<(&Transform, &ControlRotation), (With<Character>, Without<FollowCamera>)>,
    surfaces: Query<(&Transform, &Surface), (Without<FollowCamera>, Without<Character>)>,
    mut cameras: Query<(&mut Transform, &FollowCamera)>,
) {
    for (mut cam_tf, follow) in &mut cameras {
        let Ok((target_tf, rotation)) = targets.get(follow.target) else {
            continue;
        };

        let look = rotation.quat();
        let pivot = target_tf.translation + Vec3::Y * settings.camera.pivot_height;
        let back = look * Vec3::Z;
        let arm = boom_length(
            pivot,
            back,
            settings.camera.arm_length,
            settings.camera.probe_margin,
            surfaces.iter().map(|(tf, s)| s.bounds(tf.translation)),
        );

        cam_tf.translation = pivot + back * arm;
        cam_tf.rotation = look;
    }
}

/// Lock the cursor on left click, release it on the pause key.
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut wq: Query<&mut Window, With<PrimaryWindow>>,
    mb: Res<ButtonInput<MouseButton>>,
    kb: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    let Ok(mut w) = wq.get_single_mut() else { return };
    if mb.just_pressed(MouseButton::Left) {
        w.cursor.grab_mode = CursorGrabMode::Locked;
        w.cursor.visible = false;
    }

    if kb.just_pressed(settings.controls.key("pause", KeyCode::Escape)) {
        w.cursor.grab_mode = CursorGrabMode::None;
        w.cursor.visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Bounds;

    #[test]
    fn pitch_is_clamped() {
        let mut r = ControlRotation::default();
        r.apply_delta(0.0, 100_000.0, 1.0, 85.0);
        assert!((r.pitch - 85f32.to_radians()).abs() < 1e-5);
        r.apply_delta(0.0, -200_000.0, 1.0, 85.0);
        assert!((r.pitch + 85f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn turning_right_reduces_yaw() {
        let mut r = ControlRotation::default();
        r.apply_delta(100.0, 0.0, 1.0, 85.0);
        assert!(r.yaw < 0.0);
    }

    #[test]
    fn rate_input_scales_with_time() {
        let settings = crate::settings::CharacterSettings::default();
        let mut r = ControlRotation::default();
        // 45 deg/s for two seconds
        r.apply_rates(-1.0, 0.0, &settings, 85.0, 2.0);
        assert!((r.yaw - 90f32.to_radians()).abs() < 1e-5);
        r.apply_rates(0.0, 1.0, &settings, 85.0, 1.0);
        assert!((r.pitch - 45f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn boom_pulls_in_before_wall() {
        let wall = Bounds::from_center(Vec3::new(0.0, 0.0, 2.0), Vec3::new(5.0, 5.0, 0.5));
        let arm = boom_length(Vec3::ZERO, Vec3::Z, 3.0, 0.1, [wall]);
        assert!((arm - 1.4).abs() < 1e-5);
        let clear = boom_length(Vec3::ZERO, Vec3::Z, 3.0, 0.1, std::iter::empty());
        assert!((clear - 3.0).abs() < f32::EPSILON);
    }
}
