//! Character physics: gravity, jumping, launches and collision.
//!
//! Each frame the step drains the character's `CharacterMotor`: it applies a
//! queued launch, turns the accumulated planar input into horizontal velocity
//! (with reduced control in the air), integrates gravity and then moves
//! the body one axis at a time against the static `Surface` boxes. Register
//! `player_physics` as a system to run it each frame.

use bevy::math::EulerRot;
use bevy::prelude::*;

use crate::player::movement::CharacterMotor;
use crate::player::Character;
use crate::settings::CharacterSettings;
use crate::world::{Bounds, Surface};

pub const TERMINAL_VELOCITY: f32 = -50.0;

/// How quickly airborne velocity approaches the input target, before
/// scaling by `air_control`.
const AIR_ACCELERATION: f32 = 10.0;

/// Wrap an angle into (-PI, PI].
#[must_use]
pub fn wrap_angle(a: f32) -> f32 {
    let mut x = a;
    while x > std::f32::consts::PI { x -= std::f32::consts::TAU; }
    while x <= -std::f32::consts::PI { x += std::f32::consts::TAU; }
    x
}

/// Step `current` toward `target` by at most `max_delta` radians.
#[must_use]
pub fn turn_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = wrap_angle(target - current);
    if delta.abs() <= max_delta {
        return target;
    }
    wrap_angle(current + max_delta.copysign(delta))
}

/// Step one character for one frame.
///
/// Extracted from the system so tests and benchmarks run identical logic.
pub fn physics_step(
    tf: &mut Transform,
    character: &mut Character,
    motor: &mut CharacterMotor,
    solids: &[Bounds],
    tuning: &CharacterSettings,
    dt: f32,
) {
    // launch first, then input and air control on top of it
    if let Some(launch) = motor.take_launch() {
        character.velocity = launch.apply_to(character.velocity);
        if character.velocity.y > 0.0 {
            character.on_ground = false;
        }
    }

    let input = motor.consume_input();
    let planar = Vec3::new(input.x, 0.0, input.z).clamp_length_max(1.0);
    let target = planar * tuning.max_walk_speed;

    if character.on_ground {
        character.velocity.x = target.x;
        character.velocity.z = target.z;
    } else {
        let blend = (tuning.air_control * AIR_ACCELERATION * dt).min(1.0);
        character.velocity.x += (target.x - character.velocity.x) * blend;
        character.velocity.z += (target.z - character.velocity.z) * blend;
    }

    // orient the body toward its movement
    if planar.length_squared() > 1e-4 {
        let (yaw, _, _) = tf.rotation.to_euler(EulerRot::YXZ);
        let target_yaw = (-planar.x).atan2(-planar.z);
        let max_step = tuning.rotation_rate.to_radians() * dt;
        tf.rotation = Quat::from_rotation_y(turn_towards(yaw, target_yaw, max_step));
    }

    if character.jump_requested && character.on_ground {
        character.velocity.y = tuning.jump_velocity;
        character.on_ground = false;
        character.jump_requested = false;
    }

    character.velocity.y = (character.velocity.y + tuning.gravity * dt).max(TERMINAL_VELOCITY);

    let half = Vec3::new(tuning.capsule_radius, tuning.capsule_half_height, tuning.capsule_radius);
    let body_at = |p: Vec3| Bounds::from_center(p, half);
    let blocked = |p: Vec3| solids.iter().any(|s| s.overlaps(&body_at(p)));

    // horizontal axes are resolved separately so the body slides along walls
    let step = character.velocity * dt;
    let try_x = tf.translation + Vec3::X * step.x;
    if blocked(try_x) {
        character.velocity.x = 0.0;
    } else {
        tf.translation = try_x;
    }
    let try_z = tf.translation + Vec3::Z * step.z;
    if blocked(try_z) {
        character.velocity.z = 0.0;
    } else {
        tf.translation = try_z;
    }

    let try_y = tf.translation + Vec3::Y * step.y;
    let body = body_at(try_y);
    let hits: Vec<&Bounds> = solids.iter().filter(|s| s.overlaps(&body)).collect();
    if hits.is_empty() {
        tf.translation = try_y;
        character.on_ground = false;
    } else if step.y < 0.0 {
        let top = hits.iter().map(|s| s.max.y).fold(f32::MIN, f32::max);
        tf.translation.y = top + half.y;
        character.velocity.y = 0.0;
        character.on_ground = true;
    } else {
        let bottom = hits.iter().map(|s| s.min.y).fold(f32::MAX, f32::min);
        tf.translation.y = bottom - half.y;
        character.velocity.y = 0.0;
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn player_physics(
    time: Res<Time>,
    settings: Res<crate::settings::Settings>,
    surfaces: Query<(&Transform, &Surface), Without<Character>>,
    mut q: Query<(&mut Transform, &mut Character, &mut CharacterMotor)>,
) {
    let solids: Vec<Bounds> = surfaces
        .iter()
        .map(|(tf, s)| s.bounds(tf.translation))
        .collect();
    let dt = time.delta_seconds();

    for (mut tf, mut character, mut motor) in &mut q {
        physics_step(&mut tf, &mut character, &mut motor, &solids, &settings.character, dt);
    }
}
