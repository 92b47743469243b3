//! Input source for the character.
//!
//! `gather_input` samples the keyboard, mouse and touch screen once per frame
//! and writes normalized axis values plus jump press/release edges into the
//! `CharacterInput` resource. Gameplay systems only read that resource, so
//! tests can drive a character by inserting values directly.

use bevy::input::mouse::MouseMotion;
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::settings::{ControlsSettings, Settings};

/// Per-frame input values.
///
/// Axis conventions: positive `move_forward` is forward, positive
/// `move_right` is right, positive `turn`/`turn_rate` looks right and
/// positive `look_up`/`look_up_rate` looks up. `turn` and `look_up` are
/// absolute deltas (mouse pixels); the `*_rate` axes are in [-1, 1].
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct CharacterInput {
    pub move_forward: f32,
    pub move_right: f32,
    pub turn: f32,
    pub turn_rate: f32,
    pub look_up: f32,
    pub look_up_rate: f32,
    pub jump_pressed: bool,
    pub jump_released: bool,
}

/// Keys resolved from `controls.keybinds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBindings {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub jump: KeyCode,
    pub turn_left: KeyCode,
    pub turn_right: KeyCode,
    pub look_up: KeyCode,
    pub look_down: KeyCode,
}

impl InputBindings {
    #[must_use]
    pub fn from_controls(c: &ControlsSettings) -> Self {
        Self {
            forward: c.key("forward", KeyCode::KeyW),
            back: c.key("back", KeyCode::KeyS),
            left: c.key("left", KeyCode::KeyA),
            right: c.key("right", KeyCode::KeyD),
            jump: c.key("jump", KeyCode::Space),
            turn_left: c.key("turn_left", KeyCode::ArrowLeft),
            turn_right: c.key("turn_right", KeyCode::ArrowRight),
            look_up: c.key("look_up", KeyCode::ArrowUp),
            look_down: c.key("look_down", KeyCode::ArrowDown),
        }
    }
}

/// -1, 0 or 1 from a pair of opposing keys.
fn key_axis(kb: &ButtonInput<KeyCode>, positive: KeyCode, negative: KeyCode) -> f32 {
    let mut v = 0.0;
    if kb.pressed(positive) {
        v += 1.0;
    }
    if kb.pressed(negative) {
        v -= 1.0;
    }
    v
}

impl CharacterInput {
    /// Sample keyboard axes and jump edges.
    pub fn read_keys(&mut self, kb: &ButtonInput<KeyCode>, bindings: &InputBindings) {
        self.move_forward = key_axis(kb, bindings.forward, bindings.back);
        self.move_right = key_axis(kb, bindings.right, bindings.left);
        self.turn_rate = key_axis(kb, bindings.turn_right, bindings.turn_left);
        self.look_up_rate = key_axis(kb, bindings.look_up, bindings.look_down);
        self.jump_pressed = kb.just_pressed(bindings.jump);
        self.jump_released = kb.just_released(bindings.jump);
    }

    /// Add mouse motion (screen pixels, +y down) as look deltas.
    pub fn add_mouse_delta(&mut self, delta: Vec2, controls: &ControlsSettings) {
        let mut axis = delta;
        if controls.invert_x { axis.x = -axis.x; }
        if controls.invert_y { axis.y = -axis.y; }
        self.turn += axis.x;
        self.look_up -= axis.y;
    }
}

/// Refresh `CharacterInput` for this frame.
///
/// Touch presses and releases act as jump presses and releases. Mouse motion
/// only counts while the cursor is grabbed.
#[allow(clippy::needless_pass_by_value)]
pub fn gather_input(
    kb: Res<ButtonInput<KeyCode>>,
    motion_events: Res<Events<MouseMotion>>,
    touches: Option<Res<Touches>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<Settings>,
    mut input: ResMut<CharacterInput>,
) {
    let bindings = InputBindings::from_controls(&settings.controls);
    *input = CharacterInput::default();
    input.read_keys(&kb, &bindings);

    if let Some(touches) = touches {
        input.jump_pressed |= touches.any_just_pressed();
        input.jump_released |= touches.any_just_released();
    }

    let grabbed = windows.get_single().is_ok_and(|w| !w.cursor.visible);
    if grabbed {
        let delta: Vec2 = motion_events
            .iter_current_update_events()
            .map(|ev| ev.delta)
            .sum();
        input.add_mouse_delta(delta, &settings.controls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_follow_settings() {
        let b = InputBindings::from_controls(&ControlsSettings::default());
        assert_eq!(b.forward, KeyCode::KeyW);
        assert_eq!(b.jump, KeyCode::Space);
        assert_eq!(b.turn_left, KeyCode::ArrowLeft);
    }

    #[test]
    fn opposing_keys_cancel() {
        let b = InputBindings::from_controls(&ControlsSettings::default());
        let mut kb = ButtonInput::<KeyCode>::default();
        kb.press(KeyCode::KeyW);
        kb.press(KeyCode::KeyS);
        kb.press(KeyCode::KeyD);
        kb.press(KeyCode::Space);

        let mut input = CharacterInput::default();
        input.read_keys(&kb, &b);
        assert_eq!(input.move_forward, 0.0);
        assert_eq!(input.move_right, 1.0);
        assert!(input.jump_pressed);
        assert!(!input.jump_released);

        kb.clear();
        kb.release(KeyCode::Space);
        input.read_keys(&kb, &b);
        assert!(!input.jump_pressed);
        assert!(input.jump_released);
    }

    #[test]
    fn mouse_up_looks_up() {
        let mut controls = ControlsSettings::default();
        let mut input = CharacterInput::default();
        input.add_mouse_delta(Vec2::new(4.0, -3.0), &controls);
        assert_eq!((input.turn, input.look_up), (4.0, 3.0));

        controls.invert_y = true;
        let mut inverted = CharacterInput::default();
        inverted.add_mouse_delta(Vec2::new(0.0, -3.0), &controls);
        assert_eq!(inverted.look_up, -3.0);
    }
}
