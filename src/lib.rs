//! Interactive selection engine for radial pie menus.
//!
//! This crate contains everything that makes a pie menu feel like a pie
//! menu, and nothing that puts one on screen: the geometry which lays
//! sibling items out around a circle (including user-pinned fixed angles),
//! the stroke gesture recognition behind marking and turbo mode, the
//! normalization of pointer and gamepad input, and the selection chain
//! state machine which dives into submenus and climbs back out.
//!
//! The host owns the window, the event loop, and the rendering. It hands
//! the engine a [`Renderer`] and a [`MenuConfig`], feeds raw input events
//! into the [`Menu`]'s injection points, and reacts to the [`MenuEvent`]s
//! the engine emits in return:
//!
//! ```
//! use pie_select::{Menu, MenuConfig, MenuItem, ShowMenuOptions, Vec2};
//! # use pie_select::{ItemHandle, ItemVisual, RenderedItem, Renderer};
//! # struct NoopRenderer(u64);
//! # impl Renderer for NoopRenderer {
//! #     fn create_item(&mut self, _item: &RenderedItem) -> ItemHandle {
//! #         self.0 += 1;
//! #         ItemHandle(self.0)
//! #     }
//! #     fn update_item(&mut self, _handle: ItemHandle, _visual: &ItemVisual) {}
//! # }
//!
//! let root = MenuItem::submenu(
//!     "apps",
//!     vec![
//!         MenuItem::action("terminal", "command"),
//!         MenuItem::action("browser", "command"),
//!     ],
//! );
//!
//! let mut menu = Menu::new(NoopRenderer(0), MenuConfig::default());
//! menu.show(
//!     &root,
//!     ShowMenuOptions::at_pointer(Vec2::new(500.0, 300.0), Vec2::new(1920.0, 1080.0)),
//! )?;
//!
//! // Pump pointer, key, and gamepad events in; drain the resulting
//! // hover/select/cancel/move-pointer events out.
//! let _events = menu.drain_events();
//! # Ok::<(), pie_select::MenuError>(())
//! ```

pub mod config;
pub mod gamepad;
pub mod gesture;
pub mod input;
pub mod item;
pub mod math;
pub mod menu;
pub mod pointer;
pub mod render;

pub use config::{MenuConfig, ShowMenuOptions};
pub use gamepad::{GamepadInput, GamepadSample};
pub use gesture::GestureDetector;
pub use input::{
    ButtonState, InputEvent, InputMethod, InputState, Modifiers, PointerButton, SelectionType,
};
pub use item::{ItemKind, MenuItem, RenderedItem};
pub use math::{Vec2, Wedge};
pub use menu::{Key, Menu, MenuError, MenuEvent, SoundType};
pub use render::{ChainRole, ConnectorSpec, ItemHandle, ItemVisual, Renderer};
