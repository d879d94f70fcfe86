//! Common input contract
//!
//! The engine does not differentiate between mouse, touch, pen, or gamepad
//! input. Every input method normalizes its raw device events into the same
//! [`InputState`] and the same small set of [`InputEvent`]s, which the menu
//! consumes without knowing where they came from.

use crate::math::{self, Vec2};

/// The logical button state of an input device. A press makes it clicked;
/// moving more than the drag threshold before the release makes it dragged.
/// Devices without physical buttons reach the dragged state by other means,
/// e.g. a held modifier key in turbo mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Clicked,
    Dragged,
}

/// A hint what a selection should commit. Gesture-based selections only ever
/// open submenus so the user can verify an action before executing it;
/// dedicated back buttons select the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    ActiveItem,
    SubmenuOnly,
    Parent,
}

/// A snapshot of an input device, relative to the currently active item.
/// Replaced wholesale on every change; never partially mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    pub button: ButtonState,

    /// The pointer position in absolute screen coordinates.
    pub absolute_position: Vec2,

    /// The pointer position relative to the center of the active item.
    pub relative_position: Vec2,

    /// Distance to the center of the active item in pixels.
    pub distance: f64,

    /// Angle towards the pointer in degrees, clockwise from the top.
    pub angle: f64,
}

impl InputState {
    /// Builds a state snapshot from an absolute pointer position and the
    /// center of the active item.
    pub fn new(button: ButtonState, position: Vec2, center: Vec2) -> Self {
        let relative = position - center;
        Self {
            button,
            absolute_position: position,
            relative_position: relative,
            distance: relative.length(),
            angle: math::get_angle(relative),
        }
    }
}

/// What an input method wants the menu to do. The Rust rendering of the
/// state/selection/close callbacks: input methods return these from their
/// event handlers and the menu processes them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The input state changed; the menu should redraw.
    State(InputState),

    /// An item should be selected at the given absolute position. With
    /// gesture recognition this can lie some way back along the stroke.
    Selection { position: Vec2, kind: SelectionType },

    /// The menu should be closed (or the parent selected, if the host maps
    /// the close button that way).
    CloseMenu,
}

/// The currently held modifier keys, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(self) -> bool {
        self.ctrl || self.shift || self.alt || self.meta
    }
}

/// Pointer buttons the engine reacts to. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left mouse button or touch contact; clicks and drags.
    Primary,
    /// Right mouse button; closes the menu or selects the parent.
    Secondary,
    /// The extra "back" mouse button; selects the parent.
    Back,
}

/// Common interface of the two input methods. The set is closed: the menu
/// owns one pointer and one gamepad input and drives their concrete event
/// methods directly; this trait carries only what both share.
pub trait InputMethod {
    /// Called whenever a new submenu is selected, so the input method can
    /// compute positions relative to the new center. The radius is the
    /// interactive center radius of the newly selected item.
    fn set_current_center(&mut self, center: Vec2, radius: f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_is_relative_to_the_center() {
        let state = InputState::new(
            ButtonState::Released,
            Vec2::new(300.0, 100.0),
            Vec2::new(200.0, 100.0),
        );

        assert_eq!(state.relative_position, Vec2::new(100.0, 0.0));
        assert!((state.distance - 100.0).abs() < 1e-9);
        // Straight to the right of the center is 90 degrees.
        assert!((state.angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn modifier_presence() {
        assert!(!Modifiers::default().any());
        assert!(Modifiers {
            shift: true,
            ..Modifiers::default()
        }
        .any());
    }
}
