//! Renderer contract
//!
//! The engine never draws. When a menu is shown it asks the host's renderer
//! for one opaque handle per item, and from then on pushes plain visual
//! state at those handles: the item's role relative to the selection chain,
//! highlight flags, an explicit position for chain and dragged items, and
//! the connector towards the active child. How any of this looks is
//! entirely up to the renderer.

use crate::item::RenderedItem;
use crate::math::Vec2;

/// Opaque identifier of an item's visual, issued by the renderer. The
/// engine stores and returns it but never looks inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub u64);

/// Where an item currently sits relative to the selection chain. Themes
/// typically style these very differently, e.g. grandchildren as tiny dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRole {
    /// The item in the center.
    Active,
    /// An ancestor of the active item.
    Parent,
    /// A direct child of the active item.
    Child,
    /// A child of a parent or of a child.
    Grandchild,
}

/// The line connecting an item to its active or dragged child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorSpec {
    /// Length in pixels. Zero while the target is only hovered; the
    /// rotation is still meaningful then, so the connector points the
    /// right way the moment it grows.
    pub length: f64,

    /// Accumulated rotation in degrees, kept free of 360 degree jumps.
    pub angle: f64,
}

/// Everything the renderer needs to draw one item right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemVisual {
    pub role: ChainRole,
    pub hovered: bool,
    pub clicked: bool,
    pub dragged: bool,

    /// Explicit position: absolute for the root, relative to the parent
    /// item otherwise. `None` means the item sits at its default place on
    /// the ring, derived from its angle by the theme.
    pub position: Option<Vec2>,

    /// Set on items whose child connector should be drawn or rotated.
    pub connector: Option<ConnectorSpec>,
}

/// Implemented by the host. [`create_item`](Renderer::create_item) is
/// called once per item when a menu is shown; afterwards all visual change
/// arrives through [`update_item`](Renderer::update_item).
pub trait Renderer {
    fn create_item(&mut self, item: &RenderedItem) -> ItemHandle;
    fn update_item(&mut self, handle: ItemHandle, visual: &ItemVisual);
}
