//! Per-element token storage.
//!
//! Each element owns the assignments made directly on it plus a link to its
//! parent, which is where resolution continues when the element has no
//! assignment of its own.

use std::collections::HashMap;

use crate::token::TokenId;
use crate::tree::ElementId;
use crate::value::Assigned;

#[derive(Debug, Default)]
pub(crate) struct TokenStorage {
    parent: Option<ElementId>,
    values: HashMap<TokenId, Assigned>,
}

impl TokenStorage {
    pub(crate) fn new(parent: Option<ElementId>) -> Self {
        Self {
            parent,
            values: HashMap::new(),
        }
    }

    pub(crate) fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    /// Stores an assignment, returning the one it replaced.
    pub(crate) fn set(&mut self, token: TokenId, value: Assigned) -> Option<Assigned> {
        self.values.insert(token, value)
    }

    pub(crate) fn remove(&mut self, token: TokenId) -> Option<Assigned> {
        self.values.remove(&token)
    }

    pub(crate) fn get(&self, token: TokenId) -> Option<&Assigned> {
        self.values.get(&token)
    }

    pub(crate) fn contains(&self, token: TokenId) -> bool {
        self.values.contains_key(&token)
    }
}
