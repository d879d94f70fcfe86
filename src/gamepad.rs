//! Gamepad input method
//!
//! The host polls its gamepad API once per frame and hands the raw axis and
//! button values over. This module normalizes them: the stick with the
//! largest deflection becomes the active stick, a radial deadzone filters
//! drift, and its direction is mapped to a position around the active item.
//! Commitment is button-driven, so the reported button state is always
//! released.
//!
//! Selected items stay at the initial menu position, like the anchored mode
//! of the pointer input.

use crate::input::{ButtonState, InputEvent, InputMethod, InputState, SelectionType};
use crate::math::Vec2;

/// Axis deflections below this radius are treated as centered.
const AXIS_DEADZONE: f64 = 0.3;

/// Raw per-frame snapshot of one connected gamepad, as read by the host.
#[derive(Debug, Clone, Copy)]
pub struct GamepadSample<'a> {
    pub axes: &'a [f64],
    pub buttons: &'a [bool],
}

/// Tracked state of one gamepad across frames.
#[derive(Debug, Default)]
struct GamepadState {
    buttons: Vec<bool>,
    last_stick_position: Vec2,
}

/// Turns per-frame gamepad samples into [`InputEvent`]s. The sticks hover
/// over items, the configured buttons close the menu or go back, and any
/// other button selects the hovered item.
pub struct GamepadInput {
    /// Hovered items are placed at this distance from the active item.
    pub parent_distance: f64,

    /// Index of the button that selects the parent item. Negative disables.
    pub back_button: i32,

    /// Index of the button that closes the menu. Negative disables.
    pub close_button: i32,

    /// Whether gamepad input is processed at all.
    pub enabled: bool,

    /// Per-gamepad state, indexed like the host's sample slice.
    states: Vec<GamepadState>,

    /// The absolute position of the currently active item.
    center_position: Vec2,
}

impl Default for GamepadInput {
    fn default() -> Self {
        Self {
            parent_distance: 150.0,
            back_button: 1,
            close_button: 2,
            enabled: true,
            states: Vec::new(),
            center_position: Vec2::ZERO,
        }
    }
}

impl InputMethod for GamepadInput {
    fn set_current_center(&mut self, center: Vec2, _radius: f64) {
        if self.enabled {
            self.center_position = center;
        }
    }
}

impl GamepadInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one frame of gamepad samples.
    pub fn on_frame(&mut self, pads: &[GamepadSample]) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if !self.enabled {
            return events;
        }

        for (index, pad) in pads.iter().enumerate() {
            while self.states.len() <= index {
                self.states.push(GamepadState::default());
            }

            self.handle_buttons(index, pad, &mut events);
            self.handle_sticks(index, pad, &mut events);
        }

        events
    }

    /// Emits events for buttons which went down since the last frame.
    fn handle_buttons(&mut self, index: usize, pad: &GamepadSample, events: &mut Vec<InputEvent>) {
        let state = &mut self.states[index];
        state.buttons.resize(pad.buttons.len(), false);

        for (button, pressed) in pad.buttons.iter().enumerate() {
            if state.buttons[button] == *pressed {
                continue;
            }
            state.buttons[button] = *pressed;

            if !*pressed {
                continue;
            }

            if self.close_button >= 0 && button == self.close_button as usize {
                events.push(InputEvent::CloseMenu);
            } else if self.back_button >= 0 && button == self.back_button as usize {
                events.push(InputEvent::Selection {
                    position: self.center_position,
                    kind: SelectionType::Parent,
                });
            } else {
                events.push(InputEvent::Selection {
                    position: self.center_position,
                    kind: SelectionType::ActiveItem,
                });
            }
        }
    }

    /// Finds the dominant stick, applies the deadzone, and emits a state
    /// update if the stick moved since the last frame.
    fn handle_sticks(&mut self, index: usize, pad: &GamepadSample, events: &mut Vec<InputEvent>) {
        // Only the first four axes correspond to the two sticks.
        let mut axis_index = 0;
        let mut max_value = 0.0;
        for (i, value) in pad.axes.iter().take(4).enumerate() {
            if value.abs() > max_value {
                max_value = value.abs();
                axis_index = i;
            }
        }

        let (x_axis, y_axis) = if axis_index >= 2 { (2, 3) } else { (0, 1) };
        let x = pad.axes.get(x_axis).copied().unwrap_or(0.0);
        let y = pad.axes.get(y_axis).copied().unwrap_or(0.0);

        let tilt = (x * x + y * y).sqrt();
        let stick_position = if tilt > AXIS_DEADZONE {
            Vec2::new(x, y)
        } else {
            Vec2::ZERO
        };

        let state = &mut self.states[index];
        if stick_position == state.last_stick_position {
            return;
        }
        state.last_stick_position = stick_position;

        let relative = stick_position * self.parent_distance;
        events.push(InputEvent::State(InputState::new(
            ButtonState::Released,
            self.center_position + relative,
            self.center_position,
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(input: &mut GamepadInput, axes: &[f64], buttons: &[bool]) -> Vec<InputEvent> {
        input.on_frame(&[GamepadSample { axes, buttons }])
    }

    #[test]
    fn stick_motion_hovers_at_parent_distance() {
        let mut input = GamepadInput::new();
        input.set_current_center(Vec2::new(500.0, 500.0), 50.0);

        let events = frame(&mut input, &[1.0, 0.0, 0.0, 0.0], &[false; 4]);
        assert_eq!(events.len(), 1);

        let InputEvent::State(state) = &events[0] else {
            panic!("expected a state event");
        };
        assert_eq!(state.button, ButtonState::Released);
        assert_eq!(state.absolute_position, Vec2::new(650.0, 500.0));
        assert!((state.distance - 150.0).abs() < 1e-9);
        assert!((state.angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn the_deadzone_swallows_drift() {
        let mut input = GamepadInput::new();

        // Small deflection: centered, and since nothing changed, silent.
        assert!(frame(&mut input, &[0.1, 0.1, 0.0, 0.0], &[false; 4]).is_empty());

        // Deflect, then drift back under the deadzone: one update out, one
        // update back to the center.
        assert_eq!(frame(&mut input, &[0.8, 0.0, 0.0, 0.0], &[false; 4]).len(), 1);
        let events = frame(&mut input, &[0.2, 0.0, 0.0, 0.0], &[false; 4]);
        assert_eq!(events.len(), 1);
        let InputEvent::State(state) = &events[0] else {
            panic!("expected a state event");
        };
        assert!(state.distance < 1e-9);
    }

    #[test]
    fn the_dominant_stick_wins() {
        let mut input = GamepadInput::new();

        // The right stick is deflected further, so axes 2/3 are used.
        let events = frame(&mut input, &[0.4, 0.0, 0.0, -0.9], &[false; 4]);
        assert_eq!(events.len(), 1);
        let InputEvent::State(state) = &events[0] else {
            panic!("expected a state event");
        };
        // Straight up.
        assert!((state.angle - 0.0).abs() < 1e-9);
    }

    #[test]
    fn buttons_map_to_close_back_and_select() {
        let mut input = GamepadInput::new();
        input.set_current_center(Vec2::new(100.0, 100.0), 50.0);

        let events = frame(&mut input, &[0.0; 4], &[false, false, true, false]);
        assert_eq!(events, vec![InputEvent::CloseMenu]);

        let events = frame(&mut input, &[0.0; 4], &[false, true, false, false]);
        assert_eq!(
            events,
            vec![InputEvent::Selection {
                position: Vec2::new(100.0, 100.0),
                kind: SelectionType::Parent,
            }]
        );

        let events = frame(&mut input, &[0.0; 4], &[false, false, false, true]);
        assert_eq!(
            events,
            vec![InputEvent::Selection {
                position: Vec2::new(100.0, 100.0),
                kind: SelectionType::ActiveItem,
            }]
        );
    }

    #[test]
    fn button_edges_fire_once() {
        let mut input = GamepadInput::new();

        let held = [false, false, false, true];
        assert_eq!(frame(&mut input, &[0.0; 4], &held).len(), 1);
        // Still held: no repeat.
        assert!(frame(&mut input, &[0.0; 4], &held).is_empty());
        // Released and pressed again: a new edge.
        assert!(frame(&mut input, &[0.0; 4], &[false; 4]).is_empty());
        assert_eq!(frame(&mut input, &[0.0; 4], &held).len(), 1);
    }

    #[test]
    fn disabled_input_is_silent() {
        let mut input = GamepadInput {
            enabled: false,
            ..GamepadInput::default()
        };

        assert!(frame(&mut input, &[1.0, 0.0, 0.0, 0.0], &[true; 4]).is_empty());
    }
}
