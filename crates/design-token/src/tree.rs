//! Element arena.
//!
//! Elements are stored in slots addressed by generational [`ElementId`]s
//! instead of live references. When an element is detached its slot is
//! recycled with a bumped generation, so a stale handle held by the host (or
//! by a dependency edge) is detected instead of silently aliasing a new
//! element.

use std::fmt;

use crate::error::{Result, TokenError};
use crate::storage::TokenStorage;

/// Handle to an element in a [`DesignTokenTree`](crate::DesignTokenTree).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A live element: its token storage (which links the parent) and children.
#[derive(Debug)]
pub(crate) struct ElementNode {
    pub(crate) storage: TokenStorage,
    pub(crate) children: Vec<ElementId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<ElementNode>,
}

#[derive(Debug, Default)]
pub(crate) struct ElementArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ElementArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn contains(&self, id: ElementId) -> bool {
        self.node(id).is_some()
    }

    /// Fails with [`TokenError::UnknownElement`] for stale or foreign handles.
    pub(crate) fn ensure(&self, id: ElementId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TokenError::UnknownElement(id))
        }
    }

    fn node(&self, id: ElementId) -> Option<&ElementNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn get(&self, id: ElementId) -> Result<&ElementNode> {
        self.node(id).ok_or(TokenError::UnknownElement(id))
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Result<&mut ElementNode> {
        self.node_mut(id).ok_or(TokenError::UnknownElement(id))
    }

    /// Adds an element with no parent.
    pub(crate) fn insert_root(&mut self) -> ElementId {
        self.allocate(None)
    }

    /// Adds an element under `parent` (or as a new root).
    pub(crate) fn insert(&mut self, parent: Option<ElementId>) -> Result<ElementId> {
        let Some(parent) = parent else {
            return Ok(self.insert_root());
        };
        self.ensure(parent)?;
        let id = self.allocate(Some(parent));
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn allocate(&mut self, parent: Option<ElementId>) -> ElementId {
        let node = ElementNode {
            storage: TokenStorage::new(parent),
            children: Vec::new(),
        };
        self.len += 1;

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                ElementId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                ElementId { index, generation: 0 }
            }
        }
    }

    /// Removes a single element, unlinking it from its parent.
    ///
    /// Children are not touched; callers remove a subtree bottom-up using
    /// [`ElementArena::subtree_post_order`].
    pub(crate) fn remove(&mut self, id: ElementId) -> Result<ElementNode> {
        let parent = self.get(id)?.storage.parent();
        if let Some(parent) = parent {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }

        let slot = &mut self.slots[id.index as usize];
        let node = slot.node.take().ok_or(TokenError::UnknownElement(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Ok(node)
    }

    pub(crate) fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|node| node.storage.parent())
    }

    pub(crate) fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Walks from `id` up to its root, starting with `id` itself.
    pub(crate) fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// True if `candidate` is `ancestor` or lies below it.
    pub(crate) fn is_inclusive_descendant(&self, candidate: ElementId, ancestor: ElementId) -> bool {
        self.ancestors(candidate).any(|id| id == ancestor)
    }

    /// Every element in the subtree rooted at `id`, children before parents.
    pub(crate) fn subtree_post_order(&self, id: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        self.collect_post_order(id, &mut order);
        order
    }

    fn collect_post_order(&self, id: ElementId, order: &mut Vec<ElementId>) {
        for &child in self.children(id) {
            self.collect_post_order(child, order);
        }
        if self.contains(id) {
            order.push(id);
        }
    }

    /// Moves `id` (with its subtree) under `new_parent`.
    pub(crate) fn reparent(&mut self, id: ElementId, new_parent: ElementId) -> Result<()> {
        self.ensure(id)?;
        self.ensure(new_parent)?;
        if self.is_inclusive_descendant(new_parent, id) {
            return Err(TokenError::InvalidMove {
                element: id,
                parent: new_parent,
            });
        }

        if let Some(old_parent) = self.parent(id) {
            self.get_mut(old_parent)?.children.retain(|child| *child != id);
        }
        self.get_mut(id)?.storage.set_parent(Some(new_parent));
        self.get_mut(new_parent)?.children.push(id);
        Ok(())
    }
}

/// Iterator returned by [`ElementArena::ancestors`].
pub(crate) struct Ancestors<'a> {
    arena: &'a ElementArena,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.parent(current);
        Some(current)
    }
}
