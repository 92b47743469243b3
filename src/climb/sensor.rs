//! Proximity sensors feeding the climb tracker.
//!
//! Each character carries four small spheres placed in front of its body,
//! offset up, down, left and right. Every frame `detect_sensor_overlaps`
//! compares the climbable surfaces each sphere touches with the set it
//! touched last frame and triggers one `SensorExit` per surface that was
//! left and one `SensorEnter` per surface that was reached (exits first).
//! The observers that forward those triggers to the owner's
//! `ClimbStateTracker` are attached when the sensor is spawned.

use bevy::prelude::*;

use crate::climb::{ClimbStateTracker, ClimbTransition};
use crate::player::movement::CharacterMotor;
use crate::settings::ClimbingSettings;
use crate::world::{Climbable, Surface};

/// Placement of a sensor around the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SensorDirection {
    pub const ALL: [SensorDirection; 4] = [
        SensorDirection::Up,
        SensorDirection::Down,
        SensorDirection::Left,
        SensorDirection::Right,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SensorDirection::Up => "Up",
            SensorDirection::Down => "Down",
            SensorDirection::Left => "Left",
            SensorDirection::Right => "Right",
        }
    }

    /// Offset from the body centre in the character's local space
    /// (forward is -Z).
    #[must_use]
    pub fn local_offset(self, layout: &SensorLayout) -> Vec3 {
        let ahead = Vec3::NEG_Z * layout.reach;
        match self {
            SensorDirection::Up => ahead + Vec3::Y * layout.vertical_spread,
            SensorDirection::Down => ahead - Vec3::Y * layout.vertical_spread,
            SensorDirection::Left => ahead - Vec3::X * layout.lateral_spread,
            SensorDirection::Right => ahead + Vec3::X * layout.lateral_spread,
        }
    }
}

/// Size and placement shared by the four sensors of a character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorLayout {
    pub radius: f32,
    pub reach: f32,
    pub vertical_spread: f32,
    pub lateral_spread: f32,
}

impl From<&ClimbingSettings> for SensorLayout {
    fn from(s: &ClimbingSettings) -> Self {
        Self {
            radius: s.sensor_radius,
            reach: s.sensor_reach,
            vertical_spread: s.vertical_spread,
            lateral_spread: s.lateral_spread,
        }
    }
}

/// A sphere reporting contact with climbable surfaces.
#[derive(Component, Debug, Clone)]
pub struct ProximitySensor {
    pub owner: Entity,
    pub direction: SensorDirection,
    pub radius: f32,
    pub offset: Vec3,
    contacts: Vec<Entity>,
}

impl ProximitySensor {
    #[must_use]
    pub fn new(owner: Entity, direction: SensorDirection, layout: &SensorLayout) -> Self {
        Self {
            owner,
            direction,
            radius: layout.radius,
            offset: direction.local_offset(layout),
            contacts: Vec::new(),
        }
    }

    /// Surfaces currently touched.
    #[must_use]
    pub fn contacts(&self) -> &[Entity] {
        &self.contacts
    }

    /// Replace the contact set with `touching` and return
    /// `(entered, exited)` surfaces.
    pub fn update_contacts(&mut self, touching: &[Entity]) -> (Vec<Entity>, Vec<Entity>) {
        let exited: Vec<Entity> = self
            .contacts
            .iter()
            .copied()
            .filter(|e| !touching.contains(e))
            .collect();
        let entered: Vec<Entity> = touching
            .iter()
            .copied()
            .filter(|e| !self.contacts.contains(e))
            .collect();
        self.contacts.clear();
        self.contacts.extend_from_slice(touching);
        (entered, exited)
    }

    /// Move the sphere to a new layout. Contacts are kept and settle on the
    /// next detection pass.
    pub fn relayout(&mut self, layout: &SensorLayout) {
        self.radius = layout.radius;
        self.offset = self.direction.local_offset(layout);
    }
}

/// A sensor began overlapping `surface`.
#[derive(Event, Debug, Clone, Copy)]
pub struct SensorEnter {
    pub surface: Entity,
}

/// A sensor stopped overlapping `surface`.
#[derive(Event, Debug, Clone, Copy)]
pub struct SensorExit {
    pub surface: Entity,
}

/// Whether sensor spheres are drawn.
#[derive(Resource, Debug, Default)]
pub struct SensorGizmosVisible(pub bool);

/// Spawn one sensor as a child of `owner` and subscribe the owner's tracker
/// to its enter/exit triggers.
pub fn spawn_sensor(
    commands: &mut Commands,
    owner: Entity,
    direction: SensorDirection,
    layout: &SensorLayout,
) -> Entity {
    let sensor = ProximitySensor::new(owner, direction, layout);
    let transform = Transform::from_translation(sensor.offset);

    let id = commands
        .spawn((
            Name::new(format!("ClimbSensor{}", direction.name())),
            sensor,
            SpatialBundle::from_transform(transform),
        ))
        .observe(move |trigger: Trigger<SensorEnter>, mut trackers: Query<&mut ClimbStateTracker>| {
            let Ok(mut tracker) = trackers.get_mut(owner) else { return };
            if tracker.on_sensor_enter() == Some(ClimbTransition::Started) {
                debug!(
                    "{:?} started climbing ({} sensor hit {:?})",
                    owner,
                    direction.name(),
                    trigger.event().surface
                );
            }
        })
        .observe(
            move |trigger: Trigger<SensorExit>,
                  mut owners: Query<(&mut ClimbStateTracker, &mut CharacterMotor)>| {
                let Ok((mut tracker, mut motor)) = owners.get_mut(owner) else { return };
                if tracker.on_sensor_exit(&mut *motor) == Some(ClimbTransition::Stopped) {
                    debug!(
                        "{:?} stopped climbing ({} sensor left {:?})",
                        owner,
                        direction.name(),
                        trigger.event().surface
                    );
                }
            },
        )
        .id();

    commands.entity(owner).add_child(id);
    id
}

/// Spawn the full set of four sensors for `owner`.
pub fn spawn_climb_sensors(commands: &mut Commands, owner: Entity, layout: &SensorLayout) -> [Entity; 4] {
    SensorDirection::ALL.map(|direction| spawn_sensor(commands, owner, direction, layout))
}

/// Compare each sensor's overlaps with last frame and trigger enter/exit.
#[allow(clippy::needless_pass_by_value)]
pub fn detect_sensor_overlaps(
    mut commands: Commands,
    owners: Query<&Transform, With<ClimbStateTracker>>,
    surfaces: Query<(Entity, &Transform, &Surface), With<Climbable>>,
    mut sensors: Query<(Entity, &mut ProximitySensor)>,
) {
    for (sensor_entity, mut sensor) in &mut sensors {
        let Ok(owner_tf) = owners.get(sensor.owner) else {
            continue;
        };
        let center = owner_tf.transform_point(sensor.offset);

        let touching: Vec<Entity> = surfaces
            .iter()
            .filter(|(_, tf, surface)| {
                surface.bounds(tf.translation).intersects_sphere(center, sensor.radius)
            })
            .map(|(entity, ..)| entity)
            .collect();

        let (entered, exited) = sensor.update_contacts(&touching);
        for surface in exited {
            commands.trigger_targets(SensorExit { surface }, sensor_entity);
        }
        for surface in entered {
            commands.trigger_targets(SensorEnter { surface }, sensor_entity);
        }
    }
}

/// Flip sensor drawing on the bound key.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_sensor_gizmos(
    mut visible: ResMut<SensorGizmosVisible>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<crate::settings::Settings>,
) {
    if input.just_pressed(settings.controls.key("toggle_sensors", KeyCode::F2)) {
        visible.0 = !visible.0;
    }
}

/// Draw each sensor sphere, green while touching a climbable surface.
#[allow(clippy::needless_pass_by_value)]
pub fn draw_sensor_gizmos(
    visible: Res<SensorGizmosVisible>,
    mut gizmos: Gizmos,
    owners: Query<&Transform, With<ClimbStateTracker>>,
    sensors: Query<&ProximitySensor>,
) {
    if !visible.0 {
        return;
    }
    for sensor in &sensors {
        let Ok(owner_tf) = owners.get(sensor.owner) else { continue };
        let center = owner_tf.transform_point(sensor.offset);
        let color = if sensor.contacts().is_empty() {
            Color::srgb(0.9, 0.2, 0.2)
        } else {
            Color::srgb(0.1, 0.9, 0.2)
        };
        gizmos.sphere(center, Quat::IDENTITY, sensor.radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SensorLayout {
        SensorLayout::from(&ClimbingSettings::default())
    }

    #[test]
    fn sensors_sit_in_front_of_the_body() {
        let l = layout();
        for d in SensorDirection::ALL {
            assert!(d.local_offset(&l).z < 0.0, "{} sensor behind body", d.name());
        }
        assert!(SensorDirection::Up.local_offset(&l).y > 0.0);
        assert!(SensorDirection::Down.local_offset(&l).y < 0.0);
        assert!(SensorDirection::Left.local_offset(&l).x < 0.0);
        assert!(SensorDirection::Right.local_offset(&l).x > 0.0);
    }

    #[test]
    fn contact_diff_reports_edges_only() {
        let owner = Entity::from_raw(1);
        let wall_a = Entity::from_raw(10);
        let wall_b = Entity::from_raw(11);
        let mut s = ProximitySensor::new(owner, SensorDirection::Up, &layout());

        let (entered, exited) = s.update_contacts(&[wall_a]);
        assert_eq!((entered, exited), (vec![wall_a], vec![]));

        let (entered, exited) = s.update_contacts(&[wall_a, wall_b]);
        assert_eq!((entered, exited), (vec![wall_b], vec![]));

        let (entered, exited) = s.update_contacts(&[wall_b]);
        assert_eq!((entered, exited), (vec![], vec![wall_a]));

        let (entered, exited) = s.update_contacts(&[]);
        assert_eq!((entered, exited), (vec![], vec![wall_b]));
        assert!(s.contacts().is_empty());
    }

    #[test]
    fn relayout_moves_the_sphere() {
        let mut s = ProximitySensor::new(Entity::from_raw(1), SensorDirection::Left, &layout());
        let wider = SensorLayout { lateral_spread: 1.0, radius: 0.3, ..layout() };
        s.relayout(&wider);
        assert!((s.offset.x + 1.0).abs() < f32::EPSILON);
        assert!((s.radius - 0.3).abs() < f32::EPSILON);
    }
}
