//! The selection engine
//!
//! [`Menu`] owns the selection chain and everything needed to navigate a
//! shown menu: it consumes the normalized [`InputEvent`]s of the pointer and
//! gamepad input methods, tracks which item is hovered, clicked, or dragged,
//! pushes into submenus and pops back to parents, and keeps the active item
//! centered under the pointer by shifting the whole menu.
//!
//! Usually, child items are placed on a ring around the active item and
//! grandchild items on a smaller ring around each child. The items which
//! connect the active item to the root are the parent items. How all of this
//! looks is up to the host's [`Renderer`]; the engine only pushes positions,
//! roles, and highlight flags at it.
//!
//! Everything the host has to react to arrives as a [`MenuEvent`], drained
//! with [`Menu::drain_events`] after feeding input in.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::{MenuConfig, ShowMenuOptions};
use crate::gamepad::{GamepadInput, GamepadSample};
use crate::input::{
    ButtonState, InputEvent, InputMethod, InputState, Modifiers, PointerButton, SelectionType,
};
use crate::item::{MenuItem, RenderedItem};
use crate::math::{self, Vec2};
use crate::pointer::PointerInput;
use crate::render::{ChainRole, ConnectorSpec, ItemHandle, ItemVisual, Renderer};

/// Keys which directly select a child of the active item. The key's position
/// in this string is its selection index, where index zero selects the
/// parent.
const MENU_KEYS: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Everything the engine wants the host to do, in the order it was decided.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    /// A leaf item was committed. The payload is its index path from the
    /// root; executing the action behind it is the host's business.
    Select(Vec<usize>),

    /// The item at the given path is now hovered.
    Hover(Vec<usize>),

    /// The item at the given path is no longer hovered.
    Unhover(Vec<usize>),

    /// The menu should be dismissed without a selection.
    Cancel,

    /// The host should warp the physical pointer by this offset, so it stays
    /// on the menu center after clamping or centered opening.
    MovePointer(Vec2),

    /// Audible feedback of the given kind should be played.
    Sound(SoundType),
}

/// Classification of audible feedback. The engine only decides which kind of
/// sound fits a transition; whether and how it is played is up to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    OpenMenu,
    CloseMenu,
    SelectItem,
    SelectSubmenu,
    SelectParent,
    HoverItem,
    HoverSubmenu,
    HoverParent,
}

/// Keyboard input relevant to the engine. Escape is deliberately ignored
/// everywhere; closing the menu on Escape is the host's decision, made by
/// calling [`Menu::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Backspace,
    Escape,
    /// Modifiers and anything else. Only tracked for turbo mode.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("no menu is shown")]
    NoMenuShown,

    #[error("no item at path {0:?}")]
    InvalidPath(Vec<usize>),

    #[error("submenu \"{0}\" has no children")]
    EmptyTree(String),
}

/// The selection engine. Raw events go in through the `on_*` methods,
/// [`MenuEvent`]s come out through [`drain_events`](Menu::drain_events), and
/// all visual state flows to the host's [`Renderer`].
pub struct Menu<R: Renderer> {
    config: MenuConfig,
    renderer: R,

    pointer_input: PointerInput,
    gamepad_input: GamepadInput,

    /// The rendered tree of the currently shown menu.
    root: Option<RenderedItem>,

    /// How the current menu was opened.
    show_options: Option<ShowMenuOptions>,

    /// Index paths from the root to the active item; the first element is
    /// always the root's empty path. Empty while no menu is shown.
    selection_chain: Vec<Vec<usize>>,

    /// The item currently under the pointer. The parent of the active item
    /// when the pointer rests on the menu center.
    hovered_item: Option<Vec<usize>>,

    /// The item under the pointer while the button is pressed.
    clicked_item: Option<Vec<usize>>,

    /// The item being dragged around in marking or turbo mode.
    dragged_item: Option<Vec<usize>>,

    /// The most recent input state of any input method.
    latest_input: InputState,

    /// While set, the menu is fading out: input is ignored, and once the
    /// deadline passes the rendered tree is dropped.
    hide_deadline: Option<Instant>,

    events: VecDeque<MenuEvent>,
}

impl<R: Renderer> Menu<R> {
    pub fn new(renderer: R, config: MenuConfig) -> Self {
        let mut menu = Self {
            config: MenuConfig::default(),
            renderer,
            pointer_input: PointerInput::new(),
            gamepad_input: GamepadInput::new(),
            root: None,
            show_options: None,
            selection_chain: Vec::new(),
            hovered_item: None,
            clicked_item: None,
            dragged_item: None,
            latest_input: InputState::new(ButtonState::Released, Vec2::ZERO, Vec2::ZERO),
            hide_deadline: None,
            events: VecDeque::new(),
        };
        menu.update_config(config);
        menu
    }

    /// Shows the given menu. Builds the rendered tree with all angles and
    /// wedges, asks the renderer for one handle per item, and selects the
    /// root at the initial position. An ongoing fade-out is cancelled.
    pub fn show(&mut self, item: &MenuItem, options: ShowMenuOptions) -> Result<(), MenuError> {
        validate_tree(item, true)?;

        self.hide_deadline = None;
        self.clear();
        self.show_options = Some(options);

        // When the menu opens away from the pointer, a still-held shortcut
        // modifier must not immediately start a turbo-mode drag.
        if !self.config.warp_mouse && options.centered_mode {
            self.pointer_input.defer_turbo_mode();
        }
        self.pointer_input.ignore_next_motion_events();

        // Anchored menus keep every level at the initial position, which
        // rules out the drag-based selection modes.
        self.pointer_input.enable_marking_mode =
            self.config.enable_marking_mode && !options.anchored_mode;
        self.pointer_input.enable_turbo_mode = self.config.enable_turbo_mode
            && !options.anchored_mode
            && !self.config.keep_input_focus;
        self.pointer_input.enable_hover_mode = self.config.enable_hover_mode;
        self.pointer_input.hover_mode_needs_confirmation =
            self.config.hover_mode_needs_confirmation;

        let mut root = RenderedItem::build(item);
        create_handles(&mut self.renderer, &mut root);
        self.root = Some(root);

        self.latest_input = InputState::new(
            ButtonState::Released,
            options.mouse_position,
            options.mouse_position,
        );

        let initial = self.initial_menu_position();
        self.select_item(&[], Some(initial));

        if self.config.warp_mouse && options.centered_mode {
            self.events
                .push_back(MenuEvent::MovePointer(initial - options.mouse_position));
        }

        self.events.push_back(MenuEvent::Sound(SoundType::OpenMenu));
        log::debug!("menu \"{}\" shown at {initial:?}", item.name);
        Ok(())
    }

    /// Starts hiding the menu. The host's fade-out animation runs for
    /// `fade_out_ms`; during that window all input is ignored, and the next
    /// [`poll`](Menu::poll) past the deadline drops the rendered tree.
    pub fn hide(&mut self, now: Instant) {
        if self.root.is_some() && self.hide_deadline.is_none() {
            self.hide_deadline = Some(now + Duration::from_millis(self.config.fade_out_ms));
        }
    }

    /// Asks the host to dismiss the menu without a selection. Does nothing
    /// while the menu is already fading out.
    pub fn cancel(&mut self) {
        if self.root.is_some() && self.hide_deadline.is_none() {
            self.events.push_back(MenuEvent::Sound(SoundType::CloseMenu));
            self.events.push_back(MenuEvent::Cancel);
        }
    }

    /// Drives the time-based parts of the engine: the gesture pause timer
    /// and the fade-out deadline. Call once per frame.
    pub fn poll(&mut self, now: Instant) {
        if self.hide_deadline.is_some_and(|deadline| now >= deadline) {
            self.hide_deadline = None;
            self.clear();
        }

        let events = self.pointer_input.poll(now);
        self.process_input_events(events);
    }

    /// Replaces the configuration and pushes the new thresholds into both
    /// input methods and the gesture detector.
    pub fn update_config(&mut self, config: MenuConfig) {
        self.pointer_input.drag_threshold = config.drag_threshold;
        self.pointer_input.enable_marking_mode = config.enable_marking_mode;
        self.pointer_input.enable_turbo_mode = config.enable_turbo_mode;
        self.pointer_input.hover_mode_needs_confirmation = config.hover_mode_needs_confirmation;

        let gesture = &mut self.pointer_input.gesture_detector;
        gesture.min_stroke_length = config.min_stroke_length;
        gesture.min_stroke_angle = config.min_stroke_angle;
        gesture.jitter_threshold = config.jitter_threshold;
        gesture.pause_timeout = Duration::from_millis(config.pause_timeout_ms);
        gesture.fixed_stroke_length = config.fixed_stroke_length;
        gesture.center_dead_zone = config.center_dead_zone;

        self.gamepad_input.enabled = config.enable_gamepad;
        self.gamepad_input.parent_distance = config.min_parent_distance;
        self.gamepad_input.back_button = config.gamepad_back_button;
        self.gamepad_input.close_button = config.gamepad_close_button;

        self.config = config;
    }

    /// True while a menu is shown and not fading out.
    pub fn is_shown(&self) -> bool {
        self.root.is_some() && self.hide_deadline.is_none()
    }

    /// True while the fade-out window is running.
    pub fn is_hiding(&self) -> bool {
        self.hide_deadline.is_some()
    }

    /// The index path of the currently active item.
    pub fn active_path(&self) -> Option<&[usize]> {
        self.selection_chain.last().map(|path| path.as_slice())
    }

    /// Removes and returns all pending events.
    pub fn drain_events(&mut self) -> Vec<MenuEvent> {
        self.events.drain(..).collect()
    }

    /// Selects the item at the given path, e.g. on behalf of a remote
    /// caller. Unlike the engine's own navigation this can be handed an
    /// arbitrary path, so it fails loudly when the path does not resolve.
    pub fn select_path(&mut self, path: &[usize]) -> Result<(), MenuError> {
        if self.root.is_none() || self.hide_deadline.is_some() {
            return Err(MenuError::NoMenuShown);
        }

        if self.item(path).is_none() {
            log::warn!("cannot select {path:?}: no such item");
            return Err(MenuError::InvalidPath(path.to_vec()));
        }

        self.select_item(path, None);
        Ok(())
    }

    // ------------------------------------------------------------- raw input

    pub fn on_pointer_motion(&mut self, position: Vec2, modifiers: Modifiers, now: Instant) {
        let events = self.pointer_input.on_motion(position, modifiers, now);
        self.process_input_events(events);
    }

    pub fn on_pointer_down(&mut self, position: Vec2, button: PointerButton) {
        let events = self.pointer_input.on_button_down(position, button);
        self.process_input_events(events);
    }

    pub fn on_pointer_up(&mut self, position: Vec2) {
        let events = self.pointer_input.on_button_up(position);
        self.process_input_events(events);
    }

    /// Handles a key press: digits and letters select the corresponding
    /// child, Backspace selects the parent, anything else feeds the
    /// turbo-mode key tracking.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) {
        if self.root.is_none() || self.hide_deadline.is_some() {
            return;
        }

        match key {
            Key::Backspace if !modifiers.any() => self.select_parent(None),
            Key::Character(c) if !modifiers.any() && MENU_KEYS.contains(c) => {
                self.select_by_key(MENU_KEYS.find(c).unwrap_or(0));
            }
            Key::Escape => {}
            _ => self.pointer_input.on_key_down(),
        }
    }

    /// Handles a key release. Releasing the last held modifier commits a
    /// turbo-mode drag.
    pub fn on_key_up(&mut self, key: Key, remaining: Modifiers) {
        if self.root.is_none() || self.hide_deadline.is_some() {
            return;
        }

        if key == Key::Escape {
            return;
        }

        let events = self.pointer_input.on_key_up(remaining);
        self.process_input_events(events);
    }

    /// Feeds one frame of raw gamepad samples through the gamepad input.
    pub fn on_gamepad_frame(&mut self, pads: &[GamepadSample]) {
        let events = self.gamepad_input.on_frame(pads);
        self.process_input_events(events);
    }

    // ------------------------------------------------------ input processing

    fn process_input_events(&mut self, events: Vec<InputEvent>) {
        if self.root.is_none() || self.hide_deadline.is_some() {
            return;
        }

        for event in events {
            match event {
                InputEvent::State(state) => {
                    self.latest_input = state;
                    self.redraw();
                }
                InputEvent::Selection { position, kind } => self.on_selection(position, kind),
                InputEvent::CloseMenu => {
                    if self.config.rmb_selects_parent {
                        self.select_parent(None);
                    } else {
                        self.cancel();
                    }
                }
            }
        }
    }

    fn on_selection(&mut self, coords: Vec2, kind: SelectionType) {
        if kind == SelectionType::Parent {
            self.select_parent(Some(coords));
            return;
        }

        let item = self
            .hovered_item
            .clone()
            .or_else(|| self.clicked_item.clone())
            .or_else(|| self.dragged_item.clone());
        let Some(path) = item else {
            return;
        };

        // Gesture-based selections only ever open submenus, so the user can
        // always check an action before committing it with a release. They
        // also never trigger from inside the dead zone; that would make
        // pausing near the center select the parent.
        if kind == SelectionType::SubmenuOnly {
            let is_submenu = self.item(&path).is_some_and(|item| item.is_submenu());
            if is_submenu && self.latest_input.distance > self.config.center_dead_zone {
                self.select_item(&path, Some(coords));
            }
            return;
        }

        // Committing the root of a single-level chain closes the menu.
        if self.selection_chain.len() == 1 && path.is_empty() {
            self.cancel();
        } else {
            self.select_item(&path, Some(coords));
        }
    }

    // ----------------------------------------------------------- navigation

    /// The core transition: makes the item at `path` the active item. Pops
    /// the chain if the item is the parent of the active item, pushes it
    /// otherwise, and repositions the menu so the item lands at `coords`
    /// (or at the latest pointer position).
    fn select_item(&mut self, path: &[usize], coords: Option<Vec2>) {
        let Some((item_angle, item_offset, is_submenu)) = self
            .item(path)
            .map(|item| (item.angle, item.position, item.is_submenu()))
        else {
            log::warn!("ignoring selection of unknown path {path:?}");
            return;
        };

        self.drag_item(None);
        self.hover_item(None);

        // Re-selecting the active item is a no-op.
        if self
            .selection_chain
            .last()
            .is_some_and(|active| active.as_slice() == path)
        {
            return;
        }

        let selected_parent = self.is_parent_of_center(path);
        if selected_parent {
            self.selection_chain.pop();
        } else {
            self.selection_chain.push(path.to_vec());
        }
        log::debug!(
            "{} {path:?}, chain depth {}",
            if selected_parent { "popped to" } else { "selected" },
            self.selection_chain.len()
        );

        let anchored = self.show_options.is_some_and(|options| options.anchored_mode);
        let target = if anchored {
            self.initial_menu_position()
        } else {
            coords.unwrap_or(self.latest_input.absolute_position)
        };

        if path.is_empty() {
            if let Some(root) = self.root.as_mut() {
                root.position = target;
            }
        } else {
            // The distance to the parent item: popping restores the stored
            // offset, diving in keeps the item under the pointer but never
            // closer than the minimum distance.
            let distance = if anchored {
                self.config.min_parent_distance
            } else if selected_parent {
                item_offset.length()
            } else {
                self.config.min_parent_distance.max(self.latest_input.distance)
            };

            if let Some(item) = self.item_mut(path) {
                item.position = math::get_direction(item_angle, distance);
            }

            // Shift the whole menu so the newly active item lands exactly on
            // the target position.
            let offset = target - self.center_item_position();
            if let Some(root) = self.root.as_mut() {
                root.position = root.position + offset;
            }
        }

        // Submenus must stay reachable, so their center is clamped away from
        // the monitor edges. The physical pointer is warped along.
        if is_submenu {
            let position = self.center_item_position();
            let window_size = self
                .show_options
                .map(|options| options.window_size)
                .unwrap_or(position);
            let clamped =
                math::clamp_to_monitor(position, self.config.max_menu_radius, window_size);
            let offset = Vec2::new(
                (clamped.x - position.x).trunc(),
                (clamped.y - position.y).trunc(),
            );

            if offset.x != 0.0 || offset.y != 0.0 {
                if !anchored && self.config.warp_mouse {
                    self.events.push_back(MenuEvent::MovePointer(offset));
                }
                if let Some(root) = self.root.as_mut() {
                    root.position = root.position + offset;
                }
            }

            self.pointer_input
                .set_current_center(clamped, self.config.center_dead_zone);
            self.gamepad_input
                .set_current_center(clamped, self.config.center_dead_zone);
            self.latest_input =
                InputState::new(self.latest_input.button, clamped, clamped);
        }

        // No sound for the initial selection of the root.
        if !path.is_empty() || selected_parent {
            let sound = if selected_parent {
                SoundType::SelectParent
            } else if is_submenu {
                SoundType::SelectSubmenu
            } else {
                SoundType::SelectItem
            };
            self.events.push_back(MenuEvent::Sound(sound));
        }

        self.push_grandchild_visuals();
        self.redraw();

        if !is_submenu {
            self.events.push_back(MenuEvent::Select(path.to_vec()));
        }
    }

    /// Selects the parent of the active item, or cancels at the root.
    fn select_parent(&mut self, coords: Option<Vec2>) {
        if self.selection_chain.len() > 1 {
            let parent = self.selection_chain[self.selection_chain.len() - 2].clone();
            self.select_item(&parent, coords);
        } else {
            self.cancel();
        }
    }

    /// Keyboard selection: index zero is the parent, everything else is the
    /// n-th child of the active item.
    fn select_by_key(&mut self, index: usize) {
        if index == 0 {
            self.select_parent(None);
            return;
        }

        let Some(active) = self.selection_chain.last().cloned() else {
            return;
        };

        if self
            .item(&active)
            .is_some_and(|item| index <= item.children.len())
        {
            let mut path = active;
            path.push(index - 1);
            let coords = self.center_item_position();
            self.select_item(&path, Some(coords));
        }
    }

    // ------------------------------------------------------- per-frame state

    /// Recomputes hover, click, and drag state from the latest input and
    /// pushes the resulting visuals. Called whenever the input state changed.
    fn redraw(&mut self) {
        if self.root.is_none() || self.selection_chain.is_empty() {
            return;
        }

        let new_hovered = self.compute_hovered_item();
        if new_hovered != self.hovered_item {
            self.hover_item(new_hovered);
        }

        // The dragged highlight follows the hovered item.
        if self.dragged_item.is_some() && self.dragged_item != self.hovered_item {
            self.drag_item(self.hovered_item.clone());
        }

        let latest = self.latest_input;

        if latest.button == ButtonState::Clicked && self.clicked_item.is_none() {
            self.clicked_item = self.hovered_item.clone();
        }

        if latest.button == ButtonState::Dragged
            && self.dragged_item.is_none()
            && latest.distance > self.config.center_dead_zone
            && self.hovered_item.is_some()
        {
            self.drag_item(self.hovered_item.clone());
        }

        // Dragging back into the center aborts the drag.
        if latest.button == ButtonState::Dragged
            && self.dragged_item.is_some()
            && latest.distance < self.config.center_dead_zone
        {
            self.drag_item(None);
        }

        if latest.button == ButtonState::Released {
            if self.dragged_item.is_some() {
                self.drag_item(None);
            }
            self.clicked_item = None;
        }

        self.push_chain_visuals();
    }

    /// The item the pointer currently resolves to: the parent while inside
    /// the dead zone or the parent wedge, otherwise the child whose wedge
    /// contains the pointer direction.
    fn compute_hovered_item(&self) -> Option<Vec<usize>> {
        let root = self.root.as_ref()?;
        let active_path = self.selection_chain.last()?;

        if self.latest_input.distance < self.config.center_dead_zone {
            if self.selection_chain.len() > 1 {
                return Some(self.selection_chain[self.selection_chain.len() - 2].clone());
            }
            return Some(Vec::new());
        }

        let active = root.item_at(active_path)?;
        for (i, child) in active.children.iter().enumerate() {
            if math::is_angle_between(self.latest_input.angle, child.wedge.start, child.wedge.end)
            {
                let mut path = active_path.clone();
                path.push(i);
                return Some(path);
            }
        }

        // No child wedge matched, so the pointer is in the gap reserved for
        // the way back.
        if self.selection_chain.len() > 1 {
            return Some(self.selection_chain[self.selection_chain.len() - 2].clone());
        }

        None
    }

    /// Moves the hover highlight, emitting the hover and unhover events and
    /// classifying the hover sound.
    fn hover_item(&mut self, item: Option<Vec<usize>>) {
        if self.hovered_item == item {
            return;
        }

        // Only hovering from one item to another makes a sound; entering a
        // fresh submenu starts without one.
        if let Some(path) = &item {
            if self.hovered_item.is_some() {
                let sound = if self.is_parent_of_center(path) {
                    SoundType::HoverParent
                } else if self.item(path).is_some_and(|item| item.is_submenu()) {
                    SoundType::HoverSubmenu
                } else {
                    SoundType::HoverItem
                };
                self.events.push_back(MenuEvent::Sound(sound));
            }
        }

        if let Some(old) = self.hovered_item.take() {
            self.events.push_back(MenuEvent::Unhover(old));
        }

        if let Some(path) = item {
            self.events.push_back(MenuEvent::Hover(path.clone()));
            self.hovered_item = Some(path);
        }
    }

    /// Moves the dragged highlight. A drag always swallows the clicked
    /// highlight.
    fn drag_item(&mut self, item: Option<Vec<usize>>) {
        self.clicked_item = None;
        self.dragged_item = item;
    }

    // --------------------------------------------------------------- visuals

    /// Pushes the visuals of the selection chain and of the active item's
    /// children: roles, highlight flags, explicit positions, and the
    /// connectors between consecutive chain items.
    fn push_chain_visuals(&mut self) {
        let chain = self.selection_chain.clone();
        let latest = self.latest_input;
        let hovered = self.hovered_item.clone();
        let clicked = self.clicked_item.clone();
        let dragged = self.dragged_item.clone();

        let mut updates: Vec<(ItemHandle, ItemVisual)> = Vec::new();

        let Some(root) = self.root.as_mut() else {
            return;
        };
        let Some(active_path) = chain.last() else {
            return;
        };

        for (i, path) in chain.iter().enumerate() {
            let is_active = i + 1 == chain.len();

            // Where this item's connector points: the next chain item, or
            // for the active item a dragged, clicked, or hovered child. A
            // merely hovered child keeps the connector at length zero; the
            // rotation is still tracked so it points the right way the
            // moment the child is dragged.
            let target = if !is_active {
                root.item_at(&chain[i + 1])
                    .map(|next| (next.position.length(), math::get_angle(next.position)))
            } else if dragged
                .as_ref()
                .is_some_and(|p| is_child_path(active_path, p))
                || clicked
                    .as_ref()
                    .is_some_and(|p| is_child_path(active_path, p))
            {
                Some((latest.distance, latest.angle))
            } else if let Some(h) = hovered.as_ref().filter(|p| is_child_path(active_path, p)) {
                root.item_at(h).map(|child| (0.0, child.angle))
            } else {
                None
            };

            let Some(item) = root.item_at_mut(path) else {
                continue;
            };

            let connector = target.map(|(length, angle)| {
                let angle = math::get_closest_equivalent_angle(angle, item.last_connector_angle);
                item.last_connector_angle = Some(angle);
                ConnectorSpec { length, angle }
            });

            if let Some(handle) = item.handle {
                updates.push((
                    handle,
                    ItemVisual {
                        role: if is_active {
                            ChainRole::Active
                        } else {
                            ChainRole::Parent
                        },
                        hovered: hovered.as_deref() == Some(path.as_slice()),
                        clicked: clicked.as_deref() == Some(path.as_slice()),
                        dragged: dragged.as_deref() == Some(path.as_slice()),
                        position: Some(item.position),
                        connector,
                    },
                ));
            }
        }

        // Children of the active item sit at their default ring position,
        // except the one being clicked or dragged, which sticks to the
        // pointer.
        if let Some(active) = root.item_at(active_path) {
            for (j, child) in active.children.iter().enumerate() {
                let Some(handle) = child.handle else {
                    continue;
                };
                let mut child_path = active_path.clone();
                child_path.push(j);
                let child_path = child_path.as_slice();

                let is_dragged = dragged.as_deref() == Some(child_path);
                let is_clicked = clicked.as_deref() == Some(child_path);

                updates.push((
                    handle,
                    ItemVisual {
                        role: ChainRole::Child,
                        hovered: hovered.as_deref() == Some(child_path),
                        clicked: is_clicked,
                        dragged: is_dragged,
                        position: (is_dragged || is_clicked)
                            .then_some(latest.relative_position),
                        connector: None,
                    },
                ));
            }
        }

        for (handle, visual) in updates {
            self.renderer.update_item(handle, &visual);
        }
    }

    /// Pushes the grandchild role at every item two steps away from the
    /// selection chain. Called when the chain changes; the chain and child
    /// visuals follow in the next [`redraw`](Self::redraw).
    fn push_grandchild_visuals(&mut self) {
        let chain = self.selection_chain.clone();
        let mut handles = Vec::new();

        {
            let Some(root) = self.root.as_ref() else {
                return;
            };

            for (i, path) in chain.iter().enumerate() {
                let Some(item) = root.item_at(path) else {
                    continue;
                };
                let is_active = i + 1 == chain.len();

                for child in &item.children {
                    if is_active {
                        handles.extend(child.children.iter().filter_map(|gc| gc.handle));
                    } else if let Some(handle) = child.handle {
                        handles.push(handle);
                    }
                }
            }
        }

        let visual = ItemVisual {
            role: ChainRole::Grandchild,
            hovered: false,
            clicked: false,
            dragged: false,
            position: None,
            connector: None,
        };
        for handle in handles {
            self.renderer.update_item(handle, &visual);
        }
    }

    // --------------------------------------------------------------- lookups

    fn item(&self, path: &[usize]) -> Option<&RenderedItem> {
        self.root.as_ref().and_then(|root| root.item_at(path))
    }

    fn item_mut(&mut self, path: &[usize]) -> Option<&mut RenderedItem> {
        self.root.as_mut().and_then(|root| root.item_at_mut(path))
    }

    fn is_parent_of_center(&self, path: &[usize]) -> bool {
        self.selection_chain.len() > 1
            && self.selection_chain[self.selection_chain.len() - 2].as_slice() == path
    }

    /// The absolute position of the active item: the root position plus the
    /// relative offsets along the selection chain.
    fn center_item_position(&self) -> Vec2 {
        let Some(root) = self.root.as_ref() else {
            return Vec2::ZERO;
        };

        let mut position = root.position;
        for path in self.selection_chain.iter().skip(1) {
            if let Some(item) = root.item_at(path) {
                position = position + item.position;
            }
        }
        position
    }

    /// Where the root goes when the menu opens: the window center in
    /// centered mode, the pointer otherwise.
    fn initial_menu_position(&self) -> Vec2 {
        match self.show_options {
            Some(options) if options.centered_mode => options.window_size * 0.5,
            Some(options) => options.mouse_position,
            None => Vec2::ZERO,
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.show_options = None;
        self.selection_chain.clear();
        self.hovered_item = None;
        self.clicked_item = None;
        self.dragged_item = None;
    }
}

/// True if `path` addresses a direct child of the item at `parent`.
fn is_child_path(parent: &[usize], path: &[usize]) -> bool {
    path.len() == parent.len() + 1 && path.starts_with(parent)
}

/// A menu needs at least one ring of items, and every submenu in it must
/// have children to show.
fn validate_tree(item: &MenuItem, is_root: bool) -> Result<(), MenuError> {
    if (is_root || item.is_submenu()) && item.children.is_empty() {
        return Err(MenuError::EmptyTree(item.name.clone()));
    }
    for child in &item.children {
        validate_tree(child, false)?;
    }
    Ok(())
}

fn create_handles<R: Renderer>(renderer: &mut R, item: &mut RenderedItem) {
    let handle = renderer.create_item(item);
    item.handle = Some(handle);
    for child in &mut item.children {
        create_handles(renderer, child);
    }
}
