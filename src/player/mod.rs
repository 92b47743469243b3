//! Player character components and systems (look, movement, physics, camera).
//!
//! `spawn_character` builds the gameplay side of a character: body state,
//! movement request buffer, controller rotation, climb tracker and the four
//! climb sensors. `CharacterPlugin` schedules the per-frame systems in a
//! fixed order so sensor callbacks and movement never interleave.
//!
//! # Example:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use ledge::player::{spawn_character, CharacterPlugin};
//! use ledge::settings::Settings;
//!
//! fn setup(mut commands: Commands, settings: Res<Settings>) {
//!     spawn_character(&mut commands, &settings, Vec3::new(0.0, 1.0, 0.0));
//! }
//!
//! App::new()
//!     .add_plugins((MinimalPlugins, CharacterPlugin))
//!     .insert_resource(Settings::default())
//!     .add_systems(Startup, setup)
//!     .run();
//! ```
pub mod camera;
pub mod movement;
pub mod physics;

use bevy::prelude::*;

pub use camera::*;
pub use movement::*;
pub use physics::*;

use crate::climb::{
    ClimbStateTracker, ProximitySensor, SensorLayout, detect_sensor_overlaps, spawn_climb_sensors,
};
use crate::input::CharacterInput;
use crate::settings::Settings;

/// Body state used by movement and physics systems.
#[derive(Component, Debug, Default, Clone)]
pub struct Character {
    /// Current velocity in world units per second.
    pub velocity: Vec3,
    /// Whether the body is standing on a surface.
    pub on_ground: bool,
    /// Set by a jump press, cleared once the jump starts or on release.
    pub jump_requested: bool,
}

impl Character {
    pub fn jump(&mut self) {
        self.jump_requested = true;
    }

    pub fn stop_jumping(&mut self) {
        self.jump_requested = false;
    }
}

/// Ordering of the per-frame character work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    /// Device sampling into `CharacterInput`.
    Input,
    /// Look, sensors, movement routing, physics and camera.
    Simulate,
}

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CharacterInput>()
            .configure_sets(Update, (CharacterSet::Input, CharacterSet::Simulate).chain())
            .add_systems(
                Update,
                (
                    sync_character_settings,
                    control_look,
                    detect_sensor_overlaps,
                    character_movement,
                    player_physics,
                    follow_camera,
                )
                    .chain()
                    .in_set(CharacterSet::Simulate),
            );
    }
}

/// Spawn a controllable character at `position` with its climb sensors.
pub fn spawn_character(commands: &mut Commands, settings: &Settings, position: Vec3) -> Entity {
    let character = commands
        .spawn((
            Name::new("Character"),
            Character::default(),
            CharacterMotor::default(),
            ControlRotation::default(),
            ClimbStateTracker::from_settings(&settings.climbing),
            SpatialBundle::from_transform(Transform::from_translation(position)),
        ))
        .id();

    let layout = SensorLayout::from(&settings.climbing);
    spawn_climb_sensors(commands, character, &layout);
    info!("spawned character {character:?} at {position}");
    character
}

/// Push reloaded climbing tuning into live trackers and sensors.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_character_settings(
    settings: Res<Settings>,
    mut trackers: Query<&mut ClimbStateTracker>,
    mut sensors: Query<(&mut ProximitySensor, &mut Transform)>,
) {
    if !settings.is_changed() {
        return;
    }
    let layout = SensorLayout::from(&settings.climbing);
    for mut tracker in &mut trackers {
        tracker.retune(&settings.climbing);
    }
    for (mut sensor, mut tf) in &mut sensors {
        sensor.relayout(&layout);
        tf.translation = sensor.offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Climbable, Surface};
    use bevy::ecs::system::RunSystemOnce;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(Settings::default())
            .add_plugins(CharacterPlugin);
        app
    }

    fn spawn(app: &mut App, position: Vec3) -> Entity {
        app.world_mut()
            .run_system_once(move |mut commands: Commands, settings: Res<Settings>| {
                spawn_character(&mut commands, &settings, position)
            })
    }

    fn wall(app: &mut App, center: Vec3, size: Vec3) -> Entity {
        app.world_mut()
            .spawn((Surface::new(size), Climbable, Transform::from_translation(center)))
            .id()
    }

    fn tracker(app: &App, e: Entity) -> ClimbStateTracker {
        app.world().get::<ClimbStateTracker>(e).unwrap().clone()
    }

    #[test]
    fn spawns_four_sensors_owned_by_character() {
        let mut app = app();
        let c = spawn(&mut app, Vec3::ZERO);
        let mut q = app.world_mut().query::<&ProximitySensor>();
        let owners: Vec<Entity> = q.iter(app.world()).map(|s| s.owner).collect();
        assert_eq!(owners, vec![c; 4]);
        assert_eq!(app.world().get::<Children>(c).map(|ch| ch.len()), Some(4));
    }

    #[test]
    fn facing_a_wall_starts_climbing() {
        let mut app = app();
        // tall wall whose near face is 0.5 in front of the body (-Z)
        wall(&mut app, Vec3::new(0.0, 2.0, -1.0), Vec3::new(4.0, 6.0, 1.0));
        let c = spawn(&mut app, Vec3::new(0.0, 2.0, 0.0));

        app.update();
        let t = tracker(&app, c);
        assert_eq!(t.contact_count(), 4);
        assert!(t.is_in_climb_state());
    }

    #[test]
    fn leaving_the_wall_stops_climbing_and_pushes() {
        let mut app = app();
        let w = wall(&mut app, Vec3::new(0.0, 2.0, -1.0), Vec3::new(4.0, 6.0, 1.0));
        let c = spawn(&mut app, Vec3::new(0.0, 2.0, 0.0));
        app.update();
        assert!(tracker(&app, c).is_in_climb_state());

        app.world_mut().despawn(w);
        app.update();
        let t = tracker(&app, c);
        assert_eq!(t.contact_count(), 0);
        assert!(!t.is_in_climb_state());

        // exit impulse (6 m/s) replaced the vertical speed this frame
        let body = app.world().get::<Character>(c).unwrap();
        assert!(body.velocity.y > 0.0, "expected exit push, got {}", body.velocity.y);
    }

    #[test]
    fn exit_below_threshold_pushes_through_the_motor() {
        let mut app = app();
        // low block only the down sensor reaches
        let w = wall(&mut app, Vec3::new(0.0, 1.2, -1.0), Vec3::new(4.0, 0.6, 1.0));
        let c = spawn(&mut app, Vec3::new(0.0, 2.0, 0.0));
        app.update();
        let t = tracker(&app, c);
        assert_eq!(t.contact_count(), 1);
        assert!(!t.is_in_climb_state());

        app.world_mut().despawn(w);
        app.world_mut().run_system_once(crate::climb::detect_sensor_overlaps);

        let t = tracker(&app, c);
        assert_eq!(t.contact_count(), 0);
        assert!(!t.is_in_climb_state());
        let launch = app.world().get::<CharacterMotor>(c).unwrap().pending_launch();
        assert_eq!(
            launch,
            Some(Launch {
                velocity: Vec3::Y * t.exit_impulse(),
                override_planar: true,
                override_vertical: true,
            })
        );
    }

    #[test]
    fn climbing_forward_input_lifts_the_character() {
        let mut app = app();
        wall(&mut app, Vec3::new(0.0, 2.0, -1.0), Vec3::new(4.0, 6.0, 1.0));
        let c = spawn(&mut app, Vec3::new(0.0, 2.0, 0.0));
        app.update();

        app.world_mut().resource_mut::<CharacterInput>().move_forward = 1.0;
        app.update();

        let body = app.world().get::<Character>(c).unwrap();
        assert!(body.velocity.y > 0.0, "expected upward velocity, got {}", body.velocity.y);
        assert_eq!(body.velocity.z, 0.0);
    }

    #[test]
    fn reloaded_settings_retune_trackers() {
        let mut app = app();
        let c = spawn(&mut app, Vec3::ZERO);
        app.update();
        {
            let mut settings = app.world_mut().resource_mut::<Settings>();
            settings.climbing.climb_speed = 7.0;
            settings.climbing.lateral_spread = 0.5;
        }
        app.update();
        assert!((tracker(&app, c).climb_speed - 7.0).abs() < f32::EPSILON);

        // sensor transforms follow the new layout
        let mut q = app.world_mut().query::<(&ProximitySensor, &Transform)>();
        for (sensor, tf) in q.iter(app.world()) {
            assert_eq!(tf.translation, sensor.offset);
            if sensor.direction == crate::climb::SensorDirection::Left {
                assert!((tf.translation.x + 0.5).abs() < f32::EPSILON);
            }
        }
    }
}
