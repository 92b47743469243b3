//! Debug overlay.
//!
//! A text block in the top-left corner showing FPS and the controlled
//! character's movement and climb state. Refreshed on a timer rather than
//! every frame.

use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::climb::ClimbStateTracker;
use crate::player::{Character, ControlRotation};

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    /// Whether the overlay is currently visible.
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Component)]
pub struct DebugOverlayText;

pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(
        0.25,
        TimerMode::Repeating,
    )));
    commands.insert_resource(DebugOverlayState { visible: true });
}

/// Toggle the debug overlay on the bound key (F1 by default).
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<crate::settings::Settings>,
) {
    if input.just_pressed(settings.controls.key("toggle_debug", KeyCode::F1)) {
        state.visible = !state.visible;
    }
}

pub fn spawn_debug_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font_size: 18.0,
                    color: Color::srgb(1.0, 1.0, 0.0),
                    ..default()
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));
}

/// One character's state as overlay lines.
#[must_use]
pub fn describe_character(
    tf: &Transform,
    character: &Character,
    climb: &ClimbStateTracker,
    rotation: &ControlRotation,
) -> String {
    let p = tf.translation;
    let v = character.velocity;
    let state = if climb.is_in_climb_state() { "Climbing" } else { "Grounded/Moving" };
    format!(
        "Pos: ({:.2}, {:.2}, {:.2})\nVel: ({:.2}, {:.2}, {:.2}) on_ground={}\nClimb: {} contacts={}/{}\nLook: yaw {:.0} pitch {:.0}",
        p.x,
        p.y,
        p.z,
        v.x,
        v.y,
        v.z,
        character.on_ground,
        state,
        climb.contact_count(),
        crate::climb::SENSOR_COUNT,
        rotation.yaw.to_degrees(),
        rotation.pitch.to_degrees(),
    )
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub query: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub characters: Query<
        'w,
        's,
        (
            &'static Transform,
            &'static Character,
            &'static ClimbStateTracker,
            &'static ControlRotation,
        ),
    >,
}

pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }

    let Ok(mut text) = ctx.query.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let body = ctx
        .characters
        .get_single()
        .map(|(tf, c, climb, rot)| describe_character(tf, c, climb, rot))
        .unwrap_or_else(|_| "Character: N/A".to_string());

    text.sections[0].value = format!("FPS: {fps:.1}\n{body}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_climb_state() {
        let mut climb = ClimbStateTracker::default();
        for _ in 0..3 {
            climb.on_sensor_enter();
        }
        let text = describe_character(
            &Transform::from_xyz(1.0, 2.0, 3.0),
            &Character::default(),
            &climb,
            &ControlRotation::default(),
        );
        assert!(text.contains("Climb: Climbing contacts=3/4"));
        assert!(text.contains("Pos: (1.00, 2.00, 3.00)"));
    }
}
