//! Menu item model
//!
//! A menu is a tree of [`MenuItem`]s. When a menu is shown, the tree is
//! turned into a tree of [`RenderedItem`]s which additionally carry the
//! computed angles, selection wedges, index paths, and the opaque render
//! handles of the host's renderer. The rendered tree lives only while the
//! menu is on screen.

use serde::{Deserialize, Serialize};

use crate::math::{self, Vec2, Wedge};
use crate::render::ItemHandle;

/// What an item does when selected. The engine only cares whether an item
/// opens a submenu; action items carry an opaque type tag which the host's
/// action registry resolves to actual behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Opens another ring of items.
    Submenu,
    /// A leaf. The tag selects the host-side action implementation.
    Action(String),
}

/// One node of a menu definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,

    /// Icon identifier, opaque to the engine.
    #[serde(default)]
    pub icon: String,

    pub kind: ItemKind,

    /// A user-pinned direction in degrees. Constrains the automatic layout
    /// of the siblings; meaningless on the root.
    #[serde(default)]
    pub fixed_angle: Option<f64>,

    /// Present (and non-empty) only for submenus.
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// Creates a submenu item.
    pub fn submenu(name: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self {
            name: name.into(),
            icon: String::new(),
            kind: ItemKind::Submenu,
            fixed_angle: None,
            children,
        }
    }

    /// Creates a leaf action item with the given type tag.
    pub fn action(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: String::new(),
            kind: ItemKind::Action(tag.into()),
            fixed_angle: None,
            children: Vec::new(),
        }
    }

    pub fn is_submenu(&self) -> bool {
        self.kind == ItemKind::Submenu
    }
}

/// A menu item as shown on screen, with everything the selection engine
/// needs precomputed at open time.
#[derive(Debug, Clone)]
pub struct RenderedItem {
    pub name: String,
    pub icon: String,
    pub kind: ItemKind,

    /// The direction of this item as seen from its parent, in degrees.
    /// Unused on the root.
    pub angle: f64,

    /// The angular range in which pointer directions resolve to this item.
    pub wedge: Wedge,

    /// If this item is a submenu with a parent, the wedge among its
    /// children which leads back to that parent.
    pub parent_wedge: Option<Wedge>,

    /// Child indices from the root to this item; empty for the root.
    pub path: Vec<usize>,

    /// Offset from the parent item once this item was selected. On the
    /// root this is the absolute menu position.
    pub position: Vec2,

    /// Handle of the host renderer's visual for this item. The engine
    /// stores it and hands it back, nothing more.
    pub handle: Option<ItemHandle>,

    /// Accumulated connector rotation, kept across frames so the connector
    /// never visibly flips by a full turn.
    pub last_connector_angle: Option<f64>,

    pub children: Vec<RenderedItem>,
}

impl RenderedItem {
    /// Builds the rendered tree for a menu definition: index paths, item
    /// angles, and selection wedges, recursively for all levels. The angle
    /// towards the parent of a level is the level owner's own angle plus
    /// 180 degrees.
    pub fn build(item: &MenuItem) -> RenderedItem {
        Self::build_node(item, Vec::new(), 0.0, Wedge { start: 0.0, end: 360.0 })
    }

    fn build_node(item: &MenuItem, path: Vec<usize>, angle: f64, wedge: Wedge) -> RenderedItem {
        let parent_angle = if path.is_empty() {
            None
        } else {
            Some((angle + 180.0) % 360.0)
        };

        let fixed_angles: Vec<Option<f64>> =
            item.children.iter().map(|child| child.fixed_angle).collect();
        let angles = math::compute_item_angles(&fixed_angles, parent_angle);
        let wedges = math::compute_item_wedges(&angles, parent_angle);

        let children = item
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let mut child_path = path.clone();
                child_path.push(i);
                Self::build_node(child, child_path, angles[i], wedges.item_wedges[i])
            })
            .collect();

        RenderedItem {
            name: item.name.clone(),
            icon: item.icon.clone(),
            kind: item.kind.clone(),
            angle,
            wedge,
            parent_wedge: wedges.parent_wedge,
            path,
            position: Vec2::ZERO,
            handle: None,
            last_connector_angle: None,
            children,
        }
    }

    pub fn is_submenu(&self) -> bool {
        self.kind == ItemKind::Submenu
    }

    /// Walks the given index path down from this item.
    pub fn item_at(&self, path: &[usize]) -> Option<&RenderedItem> {
        let mut item = self;
        for &index in path {
            item = item.children.get(index)?;
        }
        Some(item)
    }

    /// Like [`item_at`](Self::item_at), mutably.
    pub fn item_at_mut(&mut self, path: &[usize]) -> Option<&mut RenderedItem> {
        let mut item = self;
        for &index in path {
            item = item.children.get_mut(index)?;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_menu() -> MenuItem {
        MenuItem::submenu(
            "root",
            vec![
                MenuItem::action("terminal", "command"),
                MenuItem::submenu(
                    "bookmarks",
                    vec![
                        MenuItem::action("home", "uri"),
                        MenuItem::action("work", "uri"),
                    ],
                ),
                MenuItem::action("files", "command"),
                MenuItem::action("music", "command"),
            ],
        )
    }

    #[test]
    fn paths_enumerate_the_tree() {
        let tree = RenderedItem::build(&sample_menu());

        assert_eq!(tree.path, Vec::<usize>::new());
        assert_eq!(tree.children[1].path, vec![1]);
        assert_eq!(tree.children[1].children[0].path, vec![1, 0]);
    }

    #[test]
    fn top_level_items_are_distributed_evenly() {
        let tree = RenderedItem::build(&sample_menu());

        let angles: Vec<f64> = tree.children.iter().map(|c| c.angle).collect();
        assert_eq!(angles, vec![0.0, 90.0, 180.0, 270.0]);
        assert!(tree.parent_wedge.is_none());
    }

    #[test]
    fn submenu_levels_reserve_the_way_back() {
        let tree = RenderedItem::build(&sample_menu());

        // The submenu sits at 90 degrees, so the way back from inside it
        // points at 270 degrees. Its own children must keep clear of that
        // direction, and the gap is recorded as the parent wedge.
        let submenu = &tree.children[1];
        let parent_wedge = submenu.parent_wedge.expect("submenu needs a parent wedge");
        assert!(math::is_angle_between(270.0, parent_wedge.start, parent_wedge.end));

        for child in &submenu.children {
            assert!(!math::is_angle_between(270.0, child.wedge.start, child.wedge.end));
            assert!(math::get_angular_difference(child.angle, 270.0) > 1.0);
        }
    }

    #[test]
    fn fixed_angles_survive_into_the_rendered_tree() {
        let mut menu = sample_menu();
        menu.children[2].fixed_angle = Some(135.0);

        let tree = RenderedItem::build(&menu);
        assert_eq!(tree.children[2].angle, 135.0);
    }

    #[test]
    fn path_resolution() {
        let tree = RenderedItem::build(&sample_menu());

        assert_eq!(tree.item_at(&[]).map(|i| i.name.as_str()), Some("root"));
        assert_eq!(tree.item_at(&[1, 1]).map(|i| i.name.as_str()), Some("work"));
        assert!(tree.item_at(&[4]).is_none());
        assert!(tree.item_at(&[0, 0]).is_none());
    }

    #[test]
    fn menu_definitions_deserialize_with_defaults() {
        let json = r#"{
            "name": "shortcuts",
            "kind": "Submenu",
            "children": [
                { "name": "terminal", "kind": { "Action": "command" } },
                { "name": "editor", "kind": { "Action": "command" }, "fixed_angle": 90.0 }
            ]
        }"#;

        let menu: MenuItem = serde_json::from_str(json).expect("valid menu definition");
        assert!(menu.is_submenu());
        assert_eq!(menu.children.len(), 2);
        assert_eq!(menu.children[1].fixed_angle, Some(90.0));
        assert_eq!(menu.children[0].icon, "");
    }
}
