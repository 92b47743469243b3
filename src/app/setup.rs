//! Startup scene: level geometry with visuals, lights, the character with
//! its capsule and the follow camera.
use bevy::prelude::*;
use ledge::player::{spawn_character, FollowCamera};
use ledge::settings::Settings;
use ledge::world::level::{spawn_level_geometry, Level};

/// Spawn the level, lighting, one character and a camera trailing it.
///
/// Collision boxes come from `spawn_level_geometry`; each gets a cuboid mesh
/// child in its block colour. The character's capsule mesh is sized from
/// `Settings.character` (total half height includes the caps).
#[allow(clippy::needless_pass_by_value)]
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<Settings>,
    level: Res<Level>,
) {
    let blocks = spawn_level_geometry(&mut commands, &level);
    for (entity, block) in blocks.into_iter().zip(&level.blocks) {
        let [r, g, b] = block.color;
        let visual = commands
            .spawn(PbrBundle {
                mesh: meshes.add(Cuboid::from_size(block.size())),
                material: materials.add(StandardMaterial {
                    base_color: Color::srgb(r, g, b),
                    perceptual_roughness: 0.9,
                    ..default()
                }),
                ..default()
            })
            .id();
        commands.entity(entity).add_child(visual);
    }
    info!("level '{}' spawned ({} blocks)", level.name, level.blocks.len());

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            illuminance: 8000.0,
            ..default()
        },
        transform: Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    let character = spawn_character(&mut commands, &settings, level.spawn_point());

    let radius = settings.character.capsule_radius;
    let cylinder = (settings.character.capsule_half_height - radius).max(0.0) * 2.0;
    let body = commands
        .spawn(PbrBundle {
            mesh: meshes.add(Capsule3d::new(radius, cylinder)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb(0.2, 0.45, 0.85),
                ..default()
            }),
            ..default()
        })
        .id();
    // nose marker so the facing direction (-Z) is visible
    let nose = commands
        .spawn(PbrBundle {
            mesh: meshes.add(Cuboid::new(0.12, 0.12, 0.3)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb(0.95, 0.85, 0.2),
                ..default()
            }),
            transform: Transform::from_xyz(0.0, settings.character.capsule_half_height * 0.5, -radius),
            ..default()
        })
        .id();
    commands.entity(character).push_children(&[body, nose]);

    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(level.spawn_point() + Vec3::new(0.0, 1.0, 3.0)),
            ..default()
        },
        FollowCamera { target: character },
    ));
}
