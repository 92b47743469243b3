//! Climb state: turns proximity sensor contacts into a climbing flag.
//!
//! Four sensors sit in front of the character. Each reports an enter when it
//! starts overlapping a climbable surface and an exit when it stops. The
//! `ClimbStateTracker` keeps a saturating count of those contacts and flips
//! into climbing once most of the sensors are touching.
//!
//! State machine:
//!
//! ```text
//!   Grounded/Moving --(enter, count >= 3)--> Climbing
//!   Climbing --(exit, count <= 3)--> Grounded/Moving   (+ exit impulse)
//! ```
//!
//! Every exit that leaves the count at or below the threshold requests the
//! exit impulse, even when the character was already not climbing. See
//! `exit_below_threshold_always_pushes` in the tests.

pub mod sensor;

use bevy::prelude::*;

use crate::player::movement::MovementDriver;

pub use sensor::*;

/// Number of proximity sensors feeding one tracker. Upper bound of the count.
pub const SENSOR_COUNT: u8 = 4;

/// Contact count at which climbing starts.
pub const CLIMB_THRESHOLD: u8 = 3;

/// Edge of the climb state machine, returned for logging/diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbTransition {
    Started,
    Stopped,
}

/// Per-character climb state.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ClimbStateTracker {
    contact_count: u8,
    is_climbing: bool,
    /// Vertical speed at full forward input while climbing.
    pub climb_speed: f32,
    /// Scales `climb_speed` for the push requested on exit.
    pub exit_impulse_multiplier: f32,
}

impl Default for ClimbStateTracker {
    fn default() -> Self {
        Self::new(3.0, 2.0)
    }
}

impl ClimbStateTracker {
    #[must_use]
    pub fn new(climb_speed: f32, exit_impulse_multiplier: f32) -> Self {
        Self {
            contact_count: 0,
            is_climbing: false,
            climb_speed,
            exit_impulse_multiplier,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &crate::settings::ClimbingSettings) -> Self {
        Self::new(settings.climb_speed, settings.exit_impulse_multiplier)
    }

    /// A sensor started touching a climbable surface.
    pub fn on_sensor_enter(&mut self) -> Option<ClimbTransition> {
        self.contact_count = (self.contact_count + 1).min(SENSOR_COUNT);
        if self.contact_count >= CLIMB_THRESHOLD {
            let was_climbing = std::mem::replace(&mut self.is_climbing, true);
            if !was_climbing {
                return Some(ClimbTransition::Started);
            }
        }
        None
    }

    /// A sensor stopped touching a climbable surface.
    ///
    /// At or below the threshold this pushes the character up through
    /// `driver` and clears the climbing flag. The push is requested on every
    /// such exit, not only on the climbing -> not climbing edge.
    pub fn on_sensor_exit<D: MovementDriver + ?Sized>(
        &mut self,
        driver: &mut D,
    ) -> Option<ClimbTransition> {
        self.contact_count = self.contact_count.saturating_sub(1);
        if self.contact_count <= CLIMB_THRESHOLD {
            driver.request_impulse(Vec3::Y * self.exit_impulse(), true, true);
            let was_climbing = std::mem::replace(&mut self.is_climbing, false);
            if was_climbing {
                return Some(ClimbTransition::Stopped);
            }
        }
        None
    }

    #[must_use]
    pub fn is_in_climb_state(&self) -> bool {
        self.is_climbing
    }

    #[must_use]
    pub fn contact_count(&self) -> u8 {
        self.contact_count
    }

    /// Magnitude of the vertical push requested on exit.
    #[must_use]
    pub fn exit_impulse(&self) -> f32 {
        self.exit_impulse_multiplier * self.climb_speed
    }

    /// Apply new tuning without touching the live contact state.
    pub fn retune(&mut self, settings: &crate::settings::ClimbingSettings) {
        self.climb_speed = settings.climb_speed;
        self.exit_impulse_multiplier = settings.exit_impulse_multiplier;
    }
}
