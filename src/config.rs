//! Configuration for the selection engine
//!
//! All behavioral knobs of the engine in one serde-friendly struct:
//! - click/drag thresholds and the center dead zone
//! - marking, turbo, and hover mode switches
//! - gesture recognition thresholds
//! - gamepad button mapping
//!
//! The engine never touches disk; the host loads and stores this however it
//! likes and hands it over at construction time or through
//! `Menu::update_config`. Every field has a default, so partial
//! configurations deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Behavioral options of the selection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Pixels of movement after which a pressed button counts as a drag
    /// rather than a click.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,

    /// Select items by dragging over them with the button held.
    #[serde(default = "default_true")]
    pub enable_marking_mode: bool,

    /// Select items by dragging over them with a keyboard key held.
    #[serde(default = "default_true")]
    pub enable_turbo_mode: bool,

    /// Select items by hovering alone.
    #[serde(default)]
    pub enable_hover_mode: bool,

    /// In hover mode, commit final actions only with a click.
    #[serde(default)]
    pub hover_mode_needs_confirmation: bool,

    /// Radius around the active item in which pointer input resolves to
    /// the parent instead of a child, in pixels.
    #[serde(default = "default_center_dead_zone")]
    pub center_dead_zone: f64,

    /// Minimum distance between a selected item and its parent, in pixels.
    /// Also the hover distance used for gamepad sticks.
    #[serde(default = "default_min_parent_distance")]
    pub min_parent_distance: f64,

    /// Gesture strokes shorter than this do not select, in pixels.
    #[serde(default = "default_min_stroke_length")]
    pub min_stroke_length: f64,

    /// Gesture turns smaller than this do not select, in degrees.
    #[serde(default = "default_min_stroke_angle")]
    pub min_stroke_angle: f64,

    /// Gesture movements below this length are ignored, in pixels.
    #[serde(default = "default_jitter_threshold")]
    pub jitter_threshold: f64,

    /// Resting this long mid-gesture selects the hovered item.
    #[serde(default = "default_pause_timeout_ms")]
    pub pause_timeout_ms: u64,

    /// If positive, gesture selections fire purely by stroke distance.
    #[serde(default)]
    pub fixed_stroke_length: f64,

    /// Process gamepad input at all.
    #[serde(default = "default_true")]
    pub enable_gamepad: bool,

    /// Gamepad button that selects the parent item. Negative disables.
    #[serde(default = "default_gamepad_back_button")]
    pub gamepad_back_button: i32,

    /// Gamepad button that closes the menu. Negative disables.
    #[serde(default = "default_gamepad_close_button")]
    pub gamepad_close_button: i32,

    /// The right mouse button selects the parent instead of closing the
    /// menu.
    #[serde(default)]
    pub rmb_selects_parent: bool,

    /// Ask the host to warp the pointer when the menu is clamped to the
    /// monitor or opened in centered mode.
    #[serde(default = "default_true")]
    pub warp_mouse: bool,

    /// The host keeps keyboard focus elsewhere; turbo mode cannot work
    /// then.
    #[serde(default)]
    pub keep_input_focus: bool,

    /// How long the host's fade-out animation runs. Input is ignored while
    /// the menu is hiding and the render tree is dropped afterwards.
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,

    /// Maximum radius the menu can reach, used to clamp the menu center
    /// away from monitor edges.
    #[serde(default = "default_max_menu_radius")]
    pub max_menu_radius: f64,
}

fn default_true() -> bool {
    true
}

fn default_drag_threshold() -> f64 {
    15.0
}

fn default_center_dead_zone() -> f64 {
    50.0
}

fn default_min_parent_distance() -> f64 {
    150.0
}

fn default_min_stroke_length() -> f64 {
    150.0
}

fn default_min_stroke_angle() -> f64 {
    20.0
}

fn default_jitter_threshold() -> f64 {
    10.0
}

fn default_pause_timeout_ms() -> u64 {
    100
}

fn default_gamepad_back_button() -> i32 {
    1
}

fn default_gamepad_close_button() -> i32 {
    2
}

fn default_fade_out_ms() -> u64 {
    200
}

fn default_max_menu_radius() -> f64 {
    300.0
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            drag_threshold: default_drag_threshold(),
            enable_marking_mode: true,
            enable_turbo_mode: true,
            enable_hover_mode: false,
            hover_mode_needs_confirmation: false,
            center_dead_zone: default_center_dead_zone(),
            min_parent_distance: default_min_parent_distance(),
            min_stroke_length: default_min_stroke_length(),
            min_stroke_angle: default_min_stroke_angle(),
            jitter_threshold: default_jitter_threshold(),
            pause_timeout_ms: default_pause_timeout_ms(),
            fixed_stroke_length: 0.0,
            enable_gamepad: true,
            gamepad_back_button: default_gamepad_back_button(),
            gamepad_close_button: default_gamepad_close_button(),
            rmb_selects_parent: false,
            warp_mouse: true,
            keep_input_focus: false,
            fade_out_ms: default_fade_out_ms(),
            max_menu_radius: default_max_menu_radius(),
        }
    }
}

/// Per-open options, decided by whatever triggered the menu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShowMenuOptions {
    /// Where the pointer was when the menu was requested, in absolute
    /// screen coordinates.
    pub mouse_position: Vec2,

    /// Size of the window or monitor the menu lives in.
    pub window_size: Vec2,

    /// Open in the center of the window instead of at the pointer.
    #[serde(default)]
    pub centered_mode: bool,

    /// Pin every submenu to the initial menu position instead of following
    /// the pointer. Disables marking and turbo mode.
    #[serde(default)]
    pub anchored_mode: bool,
}

impl ShowMenuOptions {
    /// Menu at the pointer position, following the pointer.
    pub fn at_pointer(mouse_position: Vec2, window_size: Vec2) -> Self {
        Self {
            mouse_position,
            window_size,
            centered_mode: false,
            anchored_mode: false,
        }
    }

    /// Menu in the middle of the window.
    pub fn centered(mouse_position: Vec2, window_size: Vec2) -> Self {
        Self {
            mouse_position,
            window_size,
            centered_mode: true,
            anchored_mode: false,
        }
    }
}
