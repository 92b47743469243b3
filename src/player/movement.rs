//! Movement requests and input routing.
//!
//! Systems never write velocities directly. They go through a
//! `MovementDriver`: planar move requests accumulate for the frame and
//! impulses (launches) are queued, then `physics::player_physics` consumes
//! both in one step.

use bevy::prelude::*;

use crate::climb::ClimbStateTracker;
use crate::input::CharacterInput;
use crate::player::camera::OrientationProvider;
use crate::player::Character;

/// Sink for locomotion requests.
pub trait MovementDriver {
    /// Request an instantaneous velocity change. With an override flag set
    /// the matching velocity components are replaced instead of added to.
    fn request_impulse(&mut self, impulse: Vec3, override_planar: bool, override_vertical: bool);

    /// Request continuous movement along `direction` scaled by `scale` for
    /// this frame.
    fn request_planar_move(&mut self, direction: Vec3, scale: f32);
}

/// A queued impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub velocity: Vec3,
    pub override_planar: bool,
    pub override_vertical: bool,
}

impl Launch {
    /// Resolve this launch against the current velocity.
    #[must_use]
    pub fn apply_to(&self, velocity: Vec3) -> Vec3 {
        let mut out = velocity;
        if self.override_planar {
            out.x = self.velocity.x;
            out.z = self.velocity.z;
        } else {
            out.x += self.velocity.x;
            out.z += self.velocity.z;
        }
        if self.override_vertical {
            out.y = self.velocity.y;
        } else {
            out.y += self.velocity.y;
        }
        out
    }
}

/// Per-character request buffer drained by the physics step.
#[derive(Component, Debug, Default, Clone)]
pub struct CharacterMotor {
    pending_input: Vec3,
    pending_launch: Option<Launch>,
}

impl CharacterMotor {
    /// Take the accumulated planar input for this frame.
    pub fn consume_input(&mut self) -> Vec3 {
        std::mem::take(&mut self.pending_input)
    }

    /// Take the queued launch, if any.
    pub fn take_launch(&mut self) -> Option<Launch> {
        self.pending_launch.take()
    }

    /// The launch queued for the next physics step.
    #[must_use]
    pub fn pending_launch(&self) -> Option<Launch> {
        self.pending_launch
    }
}

impl MovementDriver for CharacterMotor {
    fn request_impulse(&mut self, impulse: Vec3, override_planar: bool, override_vertical: bool) {
        // last request in a frame wins
        self.pending_launch = Some(Launch {
            velocity: impulse,
            override_planar,
            override_vertical,
        });
    }

    fn request_planar_move(&mut self, direction: Vec3, scale: f32) {
        self.pending_input += direction * scale;
    }
}

/// Horizontal forward axis for a yaw (radians). Forward is -Z at yaw 0.
#[must_use]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * Vec3::NEG_Z
}

/// Horizontal right axis for a yaw (radians). Right is +X at yaw 0.
#[must_use]
pub fn yaw_right(yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * Vec3::X
}

/// Route the forward axis.
///
/// While climbing, positive input becomes a vertical launch of
/// `value * climb_speed`. Otherwise (or when pulling back) it is a planar
/// move along the controller's forward axis.
pub fn move_forward<O, D>(value: f32, climb: &ClimbStateTracker, orientation: &O, driver: &mut D)
where
    O: OrientationProvider + ?Sized,
    D: MovementDriver + ?Sized,
{
    if value == 0.0 {
        return;
    }
    if climb.is_in_climb_state() && value > 0.0 {
        driver.request_impulse(Vec3::Y * (value * climb.climb_speed), true, true);
    } else {
        driver.request_planar_move(yaw_forward(orientation.yaw()), value);
    }
}

/// Route the lateral axis. Always a planar move, climbing or not.
pub fn move_right<O, D>(value: f32, orientation: &O, driver: &mut D)
where
    O: OrientationProvider + ?Sized,
    D: MovementDriver + ?Sized,
{
    if value == 0.0 {
        return;
    }
    driver.request_planar_move(yaw_right(orientation.yaw()), value);
}

/// Feed this frame's axis and jump input into each character.
#[allow(clippy::needless_pass_by_value)]
pub fn character_movement(
    input: Res<CharacterInput>,
    mut query: Query<(
        &mut Character,
        &ClimbStateTracker,
        &crate::player::camera::ControlRotation,
        &mut CharacterMotor,
    )>,
) {
    for (mut character, climb, rotation, mut motor) in &mut query {
        if input.jump_pressed {
            character.jump();
        }
        if input.jump_released {
            character.stop_jumping();
        }

        move_forward(input.move_forward, climb, rotation, &mut *motor);
        move_right(input.move_right, rotation, &mut *motor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::tests::RecordingDriver;
    use crate::player::camera::ControlRotation;

    fn climbing_tracker() -> ClimbStateTracker {
        let mut t = ClimbStateTracker::new(3.0, 2.0);
        for _ in 0..3 {
            t.on_sensor_enter();
        }
        t
    }

    #[test]
    fn climbing_forward_launches_up() {
        let climb = climbing_tracker();
        let mut driver = RecordingDriver::default();
        move_forward(0.8, &climb, &ControlRotation::default(), &mut driver);

        assert!(driver.planar.is_empty());
        assert_eq!(driver.impulses.len(), 1);
        let (impulse, planar, vertical) = driver.impulses[0];
        assert!((impulse.y - 0.8 * 3.0).abs() < 1e-5);
        assert_eq!(impulse.x, 0.0);
        assert_eq!(impulse.z, 0.0);
        assert!(planar && vertical);
    }

    #[test]
    fn climbing_backward_walks() {
        let climb = climbing_tracker();
        let mut driver = RecordingDriver::default();
        move_forward(-0.5, &climb, &ControlRotation::default(), &mut driver);

        assert!(driver.impulses.is_empty());
        assert_eq!(driver.planar, vec![(Vec3::NEG_Z, -0.5)]);
    }

    #[test]
    fn grounded_forward_follows_yaw() {
        let climb = ClimbStateTracker::default();
        let rotation = ControlRotation { yaw: std::f32::consts::FRAC_PI_2, pitch: 0.3 };
        let mut driver = RecordingDriver::default();
        move_forward(1.0, &climb, &rotation, &mut driver);

        let (dir, scale) = driver.planar[0];
        assert!(dir.distance(Vec3::NEG_X) < 1e-5);
        assert_eq!(scale, 1.0);
        assert!(driver.impulses.is_empty());
    }

    #[test]
    fn zero_input_requests_nothing() {
        let climb = climbing_tracker();
        let mut driver = RecordingDriver::default();
        move_forward(0.0, &climb, &ControlRotation::default(), &mut driver);
        move_right(0.0, &ControlRotation::default(), &mut driver);
        assert!(driver.impulses.is_empty());
        assert!(driver.planar.is_empty());
    }

    #[test]
    fn lateral_ignores_climb_state() {
        let mut driver = RecordingDriver::default();
        move_right(0.6, &ControlRotation::default(), &mut driver);
        assert_eq!(driver.planar, vec![(Vec3::X, 0.6)]);
    }

    #[test]
    fn motor_accumulates_and_last_launch_wins() {
        let mut motor = CharacterMotor::default();
        motor.request_planar_move(Vec3::X, 0.5);
        motor.request_planar_move(Vec3::NEG_Z, 1.0);
        motor.request_impulse(Vec3::Y, true, true);
        motor.request_impulse(Vec3::Y * 4.0, false, true);

        assert_eq!(motor.consume_input(), Vec3::new(0.5, 0.0, -1.0));
        assert_eq!(motor.consume_input(), Vec3::ZERO);
        let launch = motor.take_launch().unwrap();
        assert_eq!(launch.velocity, Vec3::Y * 4.0);
        assert!(motor.take_launch().is_none());
    }

    #[test]
    fn launch_overrides_replace_components() {
        let v = Vec3::new(2.0, -5.0, 1.0);
        let replace = Launch { velocity: Vec3::new(0.0, 3.0, 0.0), override_planar: true, override_vertical: true };
        assert_eq!(replace.apply_to(v), Vec3::new(0.0, 3.0, 0.0));
        let add = Launch { velocity: Vec3::new(1.0, 3.0, 0.0), override_planar: false, override_vertical: false };
        assert_eq!(add.apply_to(v), Vec3::new(3.0, -2.0, 1.0));
    }
}
