//! Pointer input method
//!
//! Normalizes mouse, touch, and pen events. Supports plain click
//! navigation, "marking mode" (items are dragged and selected by stroke
//! gestures while the button is held), "turbo mode" (the same, but holding
//! a keyboard modifier instead of the button), and "hover mode" (items are
//! selected by merely hovering over them).

use std::time::Instant;

use crate::gesture::GestureDetector;
use crate::input::{
    ButtonState, InputEvent, InputMethod, InputState, Modifiers, PointerButton, SelectionType,
};
use crate::math::Vec2;

/// On some Wayland compositors one or two initial motion events carry stale
/// coordinates from before the menu window existed. They are swallowed.
const SPURIOUS_MOTION_EVENTS: u32 = 2;

/// Turns raw pointer and key events into [`InputEvent`]s.
pub struct PointerInput {
    /// Movement beyond this threshold turns a click into a drag, in pixels.
    pub drag_threshold: f64,

    /// If enabled, items can be selected by dragging over them.
    pub enable_marking_mode: bool,

    /// If enabled, items can be selected by hovering while a keyboard key
    /// is held down.
    pub enable_turbo_mode: bool,

    /// If enabled, items are selected by hovering alone. Very fast, very
    /// advanced.
    pub enable_hover_mode: bool,

    /// If set, hover mode commits final actions only with a click.
    pub hover_mode_needs_confirmation: bool,

    /// Detects marking-mode and turbo-mode selections from the motion
    /// stream.
    pub gesture_detector: GestureDetector,

    /// The current pointer position.
    pointer_position: Vec2,

    /// The logical button state.
    button_state: ButtonState,

    /// If set, turbo mode stays off until the next key release. Used when
    /// the menu opens away from the pointer, where a still-held shortcut
    /// modifier would immediately start dragging.
    deferred_turbo_mode: bool,

    /// Where the pointer was when the primary button went down.
    click_position: Option<Vec2>,

    /// Where the pointer was at the last key-down event.
    keydown_position: Vec2,

    /// The center of the currently active item.
    center_position: Vec2,

    /// The interactive center radius of the currently active item.
    center_radius: f64,

    /// Set while any key is held; moving `drag_threshold` past the key-down
    /// position then activates turbo mode.
    any_key_pressed: bool,

    /// Number of upcoming motion events to ignore.
    ignore_motion_events: u32,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self {
            drag_threshold: 15.0,
            enable_marking_mode: true,
            enable_turbo_mode: true,
            enable_hover_mode: false,
            hover_mode_needs_confirmation: false,
            gesture_detector: GestureDetector::new(),
            pointer_position: Vec2::ZERO,
            button_state: ButtonState::Released,
            deferred_turbo_mode: false,
            click_position: None,
            keydown_position: Vec2::ZERO,
            center_position: Vec2::ZERO,
            center_radius: 0.0,
            any_key_pressed: false,
            ignore_motion_events: 0,
        }
    }
}

impl InputMethod for PointerInput {
    fn set_current_center(&mut self, center: Vec2, radius: f64) {
        let mut events = Vec::new();
        self.update(center, center, self.button_state, &mut events);
        self.gesture_detector.reset(Some(center));
        self.keydown_position = center;
        self.center_radius = radius;
        // The state change is picked up with the next motion event; the
        // menu repositions the pointer itself when it moves the center.
    }
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swallows the next few motion events. Called when the menu opens, see
    /// [`SPURIOUS_MOTION_EVENTS`].
    pub fn ignore_next_motion_events(&mut self) {
        self.ignore_motion_events = SPURIOUS_MOTION_EVENTS;
    }

    /// Keeps turbo mode off until the next key release.
    pub fn defer_turbo_mode(&mut self) {
        self.deferred_turbo_mode = true;
    }

    /// Handles a pointer motion event.
    pub fn on_motion(&mut self, position: Vec2, modifiers: Modifiers, now: Instant) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if self.ignore_motion_events > 0 {
            self.ignore_motion_events -= 1;
            log::debug!("ignoring spurious motion event at {position:?}");
            return events;
        }

        // Once the pointer moved more than the drag threshold away from the
        // click position, this is no longer a click but a drag.
        let in_click_zone = self
            .click_position
            .is_some_and(|click| self.pointer_position.distance(click) < self.drag_threshold);

        let mut new_button_state = self.button_state;

        if self.button_state == ButtonState::Clicked && !in_click_zone {
            new_button_state = if self.enable_marking_mode {
                ButtonState::Dragged
            } else {
                ButtonState::Released
            };
        }

        // Turbo mode: a key is held and the pointer moved more than the
        // drag threshold since the key went down. Hover mode behaves like
        // turbo mode with an always-pressed key.
        let can_enter_turbo_mode = (self.enable_turbo_mode || self.enable_hover_mode)
            && !self.deferred_turbo_mode
            && self.button_state != ButtonState::Dragged;

        if can_enter_turbo_mode
            && (self.enable_hover_mode || self.any_key_pressed || modifiers.any())
            && self.pointer_position.distance(self.keydown_position) > self.drag_threshold
        {
            new_button_state = ButtonState::Dragged;
        }

        self.update(position, self.center_position, new_button_state, &mut events);

        // While dragging, the motion stream feeds the gesture detector.
        if self.button_state == ButtonState::Dragged {
            if let Some(position) = self.gesture_detector.on_motion(self.pointer_position, now) {
                events.push(InputEvent::Selection {
                    position,
                    kind: self.gesture_selection_type(),
                });
            }
        }

        events
    }

    /// Handles a pointer button press.
    pub fn on_button_down(&mut self, position: Vec2, button: PointerButton) -> Vec<InputEvent> {
        let mut events = Vec::new();

        match button {
            PointerButton::Secondary => {
                events.push(InputEvent::CloseMenu);
                return events;
            }
            PointerButton::Back => {
                events.push(InputEvent::Selection {
                    position: self.pointer_position,
                    kind: SelectionType::Parent,
                });
                return events;
            }
            PointerButton::Primary => {}
        }

        self.click_position = Some(position);
        self.update(position, self.center_position, ButtonState::Clicked, &mut events);

        // A new gesture may start here.
        self.gesture_detector.reset(None);

        events
    }

    /// Handles a pointer button release.
    pub fn on_button_up(&mut self, position: Vec2) -> Vec<InputEvent> {
        let mut events = Vec::new();

        self.gesture_detector.reset(None);

        let click_selection = self.button_state == ButtonState::Clicked;

        // Marking-mode selections do not trigger on the center item.
        let marking_mode_selection = self.button_state == ButtonState::Dragged
            && self.pointer_position.distance(self.center_position) > self.center_radius;

        if click_selection || marking_mode_selection {
            events.push(InputEvent::Selection {
                position: self.pointer_position,
                kind: SelectionType::ActiveItem,
            });
        }

        self.click_position = None;
        self.update(position, self.center_position, ButtonState::Released, &mut events);

        events
    }

    /// Handles a key press. Key releases are what commit turbo-mode
    /// selections, so this only records where the key went down.
    pub fn on_key_down(&mut self) {
        if !self.deferred_turbo_mode {
            self.any_key_pressed = true;
            self.keydown_position = self.pointer_position;
        }
    }

    /// Handles a key release. `remaining` are the modifiers still held
    /// after this release; once none are left, a turbo-mode drag commits
    /// the hovered item.
    pub fn on_key_up(&mut self, remaining: Modifiers) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if remaining.any() {
            return events;
        }

        self.any_key_pressed = false;
        self.deferred_turbo_mode = false;

        // Commit the dragged item, unless the pointer rests on the center.
        if self.button_state == ButtonState::Dragged
            && self.pointer_position.distance(self.center_position) > self.center_radius
        {
            self.gesture_detector.reset(None);
            events.push(InputEvent::Selection {
                position: self.pointer_position,
                kind: SelectionType::ActiveItem,
            });
        }

        self.update(
            self.pointer_position,
            self.center_position,
            ButtonState::Released,
            &mut events,
        );

        events
    }

    /// Drives the gesture pause timer. Call once per frame.
    pub fn poll(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if let Some(position) = self.gesture_detector.poll(now) {
            events.push(InputEvent::Selection {
                position,
                kind: self.gesture_selection_type(),
            });
        }

        events
    }

    /// In hover mode without confirmation, gestures select anything; in
    /// marking and turbo mode they only open submenus so the user can check
    /// an action before committing it with a release.
    fn gesture_selection_type(&self) -> SelectionType {
        if self.enable_hover_mode && !self.hover_mode_needs_confirmation {
            SelectionType::ActiveItem
        } else {
            SelectionType::SubmenuOnly
        }
    }

    /// Stores pointer position, menu center, and button state. Emits a new
    /// input state if any of them changed.
    fn update(&mut self, pointer: Vec2, center: Vec2, button: ButtonState, events: &mut Vec<InputEvent>) {
        if self.center_position != center
            || self.button_state != button
            || self.pointer_position != pointer
        {
            self.center_position = center;
            self.button_state = button;
            self.pointer_position = pointer;

            events.push(InputEvent::State(InputState::new(button, pointer, center)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_states(events: &[InputEvent]) -> Vec<ButtonState> {
        events
            .iter()
            .filter_map(|e| match e {
                InputEvent::State(state) => Some(state.button),
                _ => None,
            })
            .collect()
    }

    fn selections(events: &[InputEvent]) -> Vec<(Vec2, SelectionType)> {
        events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Selection { position, kind } => Some((*position, *kind)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn a_click_selects_on_release() {
        let mut input = PointerInput::new();
        let now = Instant::now();

        let down = input.on_button_down(Vec2::new(10.0, 0.0), PointerButton::Primary);
        assert_eq!(button_states(&down), vec![ButtonState::Clicked]);

        let _ = input.on_motion(Vec2::new(12.0, 0.0), Modifiers::default(), now);

        let up = input.on_button_up(Vec2::new(12.0, 0.0));
        assert_eq!(
            selections(&up),
            vec![(Vec2::new(12.0, 0.0), SelectionType::ActiveItem)]
        );
        assert_eq!(button_states(&up), vec![ButtonState::Released]);
    }

    #[test]
    fn dragging_past_the_threshold_enters_marking_mode() {
        let mut input = PointerInput::new();
        let now = Instant::now();

        let mut all = input.on_button_down(Vec2::ZERO, PointerButton::Primary);
        all.extend(input.on_motion(Vec2::new(20.0, 0.0), Modifiers::default(), now));
        all.extend(input.on_motion(Vec2::new(22.0, 0.0), Modifiers::default(), now));

        // Released -> Clicked -> Dragged, and the drag state is reported
        // before any selection happens.
        assert_eq!(
            button_states(&all),
            vec![ButtonState::Clicked, ButtonState::Clicked, ButtonState::Dragged]
        );
        assert!(selections(&all).is_empty());
    }

    #[test]
    fn without_marking_mode_a_drag_releases_the_button() {
        let mut input = PointerInput {
            enable_marking_mode: false,
            enable_turbo_mode: false,
            ..PointerInput::default()
        };
        let now = Instant::now();

        let _ = input.on_button_down(Vec2::ZERO, PointerButton::Primary);
        let _ = input.on_motion(Vec2::new(20.0, 0.0), Modifiers::default(), now);
        let events = input.on_motion(Vec2::new(22.0, 0.0), Modifiers::default(), now);

        assert_eq!(button_states(&events), vec![ButtonState::Released]);
    }

    #[test]
    fn marking_release_outside_the_dead_zone_selects() {
        let mut input = PointerInput::new();
        input.set_current_center(Vec2::ZERO, 50.0);
        let now = Instant::now();

        let _ = input.on_button_down(Vec2::ZERO, PointerButton::Primary);
        let _ = input.on_motion(Vec2::new(100.0, 0.0), Modifiers::default(), now);
        let _ = input.on_motion(Vec2::new(120.0, 0.0), Modifiers::default(), now);

        let up = input.on_button_up(Vec2::new(120.0, 0.0));
        assert_eq!(
            selections(&up),
            vec![(Vec2::new(120.0, 0.0), SelectionType::ActiveItem)]
        );
    }

    #[test]
    fn marking_release_in_the_dead_zone_does_not_select() {
        let mut input = PointerInput::new();
        input.set_current_center(Vec2::ZERO, 50.0);
        let now = Instant::now();

        let _ = input.on_button_down(Vec2::ZERO, PointerButton::Primary);
        let _ = input.on_motion(Vec2::new(100.0, 0.0), Modifiers::default(), now);
        let _ = input.on_motion(Vec2::new(30.0, 0.0), Modifiers::default(), now);
        let _ = input.on_motion(Vec2::new(20.0, 0.0), Modifiers::default(), now);

        let up = input.on_button_up(Vec2::new(20.0, 0.0));
        assert!(selections(&up).is_empty());
    }

    #[test]
    fn holding_a_key_and_moving_enters_turbo_mode() {
        let mut input = PointerInput::new();
        input.set_current_center(Vec2::ZERO, 50.0);
        let now = Instant::now();

        input.on_key_down();
        let _ = input.on_motion(Vec2::new(100.0, 0.0), Modifiers { ctrl: true, ..Modifiers::default() }, now);
        let events = input.on_motion(
            Vec2::new(110.0, 0.0),
            Modifiers { ctrl: true, ..Modifiers::default() },
            now,
        );
        assert_eq!(button_states(&events), vec![ButtonState::Dragged]);

        // Releasing the last modifier outside the dead zone commits.
        let up = input.on_key_up(Modifiers::default());
        assert_eq!(
            selections(&up),
            vec![(Vec2::new(110.0, 0.0), SelectionType::ActiveItem)]
        );
        assert_eq!(button_states(&up), vec![ButtonState::Released]);
    }

    #[test]
    fn deferred_turbo_mode_waits_for_a_key_release() {
        let mut input = PointerInput::new();
        input.set_current_center(Vec2::ZERO, 50.0);
        input.defer_turbo_mode();
        let now = Instant::now();

        input.on_key_down();
        let _ = input.on_motion(Vec2::new(100.0, 0.0), Modifiers { alt: true, ..Modifiers::default() }, now);
        let events = input.on_motion(
            Vec2::new(110.0, 0.0),
            Modifiers { alt: true, ..Modifiers::default() },
            now,
        );

        // No drag while the deferral holds.
        assert_eq!(button_states(&events), vec![ButtonState::Released]);

        // The release lifts the deferral; the next held key drags again.
        let _ = input.on_key_up(Modifiers::default());
        input.on_key_down();
        let _ = input.on_motion(Vec2::new(150.0, 0.0), Modifiers { alt: true, ..Modifiers::default() }, now);
        let events = input.on_motion(
            Vec2::new(160.0, 0.0),
            Modifiers { alt: true, ..Modifiers::default() },
            now,
        );
        assert_eq!(button_states(&events), vec![ButtonState::Dragged]);
    }

    #[test]
    fn gesture_corners_select_submenus_only() {
        let mut input = PointerInput::new();
        input.set_current_center(Vec2::ZERO, 50.0);
        let now = Instant::now();

        let _ = input.on_button_down(Vec2::ZERO, PointerButton::Primary);
        let _ = input.on_motion(Vec2::new(20.0, 0.0), Modifiers::default(), now);
        let _ = input.on_motion(Vec2::new(100.0, 0.0), Modifiers::default(), now);
        let _ = input.on_motion(Vec2::new(300.0, 0.0), Modifiers::default(), now);
        let events = input.on_motion(Vec2::new(300.0, -100.0), Modifiers::default(), now);

        let selections = selections(&events);
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].1, SelectionType::SubmenuOnly);
    }

    #[test]
    fn hover_mode_gestures_select_anything() {
        let mut input = PointerInput {
            enable_hover_mode: true,
            ..PointerInput::default()
        };
        input.set_current_center(Vec2::ZERO, 50.0);
        let now = Instant::now();

        // No button, no key: hover mode drags on its own.
        let _ = input.on_motion(Vec2::new(100.0, 0.0), Modifiers::default(), now);
        let events = input.on_motion(Vec2::new(110.0, 0.0), Modifiers::default(), now);
        assert_eq!(button_states(&events), vec![ButtonState::Dragged]);

        let _ = input.on_motion(Vec2::new(250.0, 0.0), Modifiers::default(), now);
        let events = input.on_motion(Vec2::new(250.0, -100.0), Modifiers::default(), now);
        assert_eq!(
            selections(&events).first().map(|s| s.1),
            Some(SelectionType::ActiveItem)
        );
    }

    #[test]
    fn secondary_and_back_buttons() {
        let mut input = PointerInput::new();

        let events = input.on_button_down(Vec2::ZERO, PointerButton::Secondary);
        assert_eq!(events, vec![InputEvent::CloseMenu]);

        let events = input.on_button_down(Vec2::ZERO, PointerButton::Back);
        assert_eq!(
            selections(&events),
            vec![(Vec2::ZERO, SelectionType::Parent)]
        );
    }

    #[test]
    fn spurious_motion_events_are_swallowed() {
        let mut input = PointerInput::new();
        input.ignore_next_motion_events();
        let now = Instant::now();

        assert!(input
            .on_motion(Vec2::new(500.0, 500.0), Modifiers::default(), now)
            .is_empty());
        assert!(input
            .on_motion(Vec2::new(510.0, 500.0), Modifiers::default(), now)
            .is_empty());

        let events = input.on_motion(Vec2::new(30.0, 40.0), Modifiers::default(), now);
        assert_eq!(button_states(&events), vec![ButtonState::Released]);
    }
}
