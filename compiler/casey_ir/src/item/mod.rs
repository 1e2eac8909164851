//! The item tree: the program's declaration hierarchy.
//!
//! Items form a tree (project → packages → classes/functions/variables,
//! functions → parameters/variables) stored in an arena. Ids stay stable for
//! the lifetime of the tree; removal invalidates a slot instead of shifting
//! the arena, so ids held by block contents never dangle silently.

use std::fmt;
use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;

use crate::block::BlockGraph;
use crate::type_name::TypeName;

/// Stable identifier of an item in an [`ItemTree`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ItemId(u32);

impl ItemId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        ItemId(index as u32)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

/// The kind of a program item.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ItemKind {
    Project,
    Package,
    Class,
    Function,
    Variable,
    Parameter,
}

impl ItemKind {
    /// Parse a document `item` field (`"PROJECT"`, `"FUNCTION"`, ...).
    pub fn parse(text: &str) -> Option<ItemKind> {
        Some(match text.trim().to_ascii_uppercase().as_str() {
            "PROJECT" => ItemKind::Project,
            "PACKAGE" => ItemKind::Package,
            "CLASS" => ItemKind::Class,
            "FUNCTION" => ItemKind::Function,
            "VARIABLE" => ItemKind::Variable,
            "PARAMETER" => ItemKind::Parameter,
            _ => return None,
        })
    }

    pub fn as_document_str(self) -> &'static str {
        match self {
            ItemKind::Project => "PROJECT",
            ItemKind::Package => "PACKAGE",
            ItemKind::Class => "CLASS",
            ItemKind::Function => "FUNCTION",
            ItemKind::Variable => "VARIABLE",
            ItemKind::Parameter => "PARAMETER",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_document_str().to_ascii_lowercase())
    }
}

/// A named node in the declaration hierarchy.
///
/// The per-kind fields are optional and only populated for the kinds the
/// document defines them on: `declared_type` for variables and parameters,
/// `return_type` and `blocks` for functions, `project_id` for projects.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub name: String,
    pub comments: String,
    pub kind: ItemKind,
    pub parent: Option<ItemId>,
    pub children: Vec<ItemId>,
    pub declared_type: Option<TypeName>,
    pub return_type: Option<TypeName>,
    pub blocks: Option<BlockGraph>,
    pub project_id: Option<String>,
}

impl Item {
    fn new(name: String, kind: ItemKind, parent: Option<ItemId>) -> Self {
        Item {
            name,
            comments: String::new(),
            kind,
            parent,
            children: Vec::new(),
            declared_type: None,
            return_type: None,
            blocks: None,
            project_id: None,
        }
    }
}

/// Error raised while building the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemError {
    /// A sibling with the same name already exists under the parent.
    DuplicateName { parent: String, name: String },
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::DuplicateName { parent, name } => {
                write!(f, "duplicate item name `{name}` under `{parent}`")
            }
        }
    }
}

impl std::error::Error for ItemError {}

/// Arena of items with a dotted-path index.
///
/// Paths are the item names joined with `.` from the root
/// (`Project.pkg.Function`); the index is kept current by
/// [`ItemTree::add_child`] and [`ItemTree::remove`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemTree {
    items: Vec<Option<Item>>,
    root: Option<ItemId>,
    path_index: FxHashMap<String, ItemId>,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root item. Replaces any previous root wholesale.
    pub fn add_root(&mut self, name: impl Into<String>, kind: ItemKind) -> ItemId {
        let name = name.into();
        let id = self.alloc(Item::new(name.clone(), kind, None));
        self.root = Some(id);
        self.path_index.insert(name, id);
        id
    }

    /// Append a child under `parent`. Sibling names must be unique.
    pub fn add_child(
        &mut self,
        parent: ItemId,
        name: impl Into<String>,
        kind: ItemKind,
    ) -> Result<ItemId, ItemError> {
        let name = name.into();
        let duplicate = self[parent]
            .children
            .iter()
            .any(|&c| self[c].name == name);
        if duplicate {
            return Err(ItemError::DuplicateName {
                parent: self.full_name(parent),
                name,
            });
        }
        let id = self.alloc(Item::new(name, kind, Some(parent)));
        self[parent].children.push(id);
        let path = self.full_name(id);
        self.path_index.insert(path, id);
        Ok(id)
    }

    /// Remove an item and its whole subtree. Slots are invalidated, not
    /// reused; ids into the removed subtree become dead.
    pub fn remove(&mut self, id: ItemId) {
        if let Some(parent) = self[id].parent {
            self[parent].children.retain(|&c| c != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.invalidate(id);
    }

    fn invalidate(&mut self, id: ItemId) {
        let path = self.full_name(id);
        self.path_index.remove(&path);
        let children = std::mem::take(&mut self[id].children);
        for child in children {
            self.invalidate(child);
        }
        self.items[id.index()] = None;
    }

    fn alloc(&mut self, item: Item) -> ItemId {
        let id = ItemId::from_index(self.items.len());
        self.items.push(Some(item));
        id
    }

    pub fn root(&self) -> Option<ItemId> {
        self.root
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Dotted path from the root, e.g. `Project.pkg.Function`.
    pub fn full_name(&self, id: ItemId) -> String {
        let mut segments = vec![self[id].name.as_str()];
        let mut current = self[id].parent;
        while let Some(parent) = current {
            segments.push(self[parent].name.as_str());
            current = self[parent].parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Resolve a dotted path to an item id.
    pub fn resolve(&self, path: &str) -> Option<ItemId> {
        self.path_index.get(path).copied()
    }

    /// All live items in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (ItemId::from_index(index), item)))
    }

    /// Children of `id` that have the given kind, in declaration order.
    pub fn children_of_kind(&self, id: ItemId, kind: ItemKind) -> Vec<ItemId> {
        self[id]
            .children
            .iter()
            .copied()
            .filter(|&c| self[c].kind == kind)
            .collect()
    }

    /// Find a direct child by name.
    pub fn find_child(&self, parent: ItemId, name: &str) -> Option<ItemId> {
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self[c].name == name)
    }

    /// Whether an item lives directly in a project or package (and therefore
    /// compiles to a static member wrapped in its own class).
    pub fn is_static(&self, id: ItemId) -> bool {
        match self[id].parent {
            Some(parent) => matches!(self[parent].kind, ItemKind::Project | ItemKind::Package),
            None => false,
        }
    }
}

impl Index<ItemId> for ItemTree {
    type Output = Item;

    fn index(&self, id: ItemId) -> &Item {
        match self.items.get(id.index()).and_then(Option::as_ref) {
            Some(item) => item,
            None => panic!("stale item id {id:?}"),
        }
    }
}

impl IndexMut<ItemId> for ItemTree {
    fn index_mut(&mut self, id: ItemId) -> &mut Item {
        match self.items.get_mut(id.index()).and_then(Option::as_mut) {
            Some(item) => item,
            None => panic!("stale item id {id:?}"),
        }
    }
}
