//! The public entry point: a tree of elements carrying design tokens.

use std::collections::HashSet;

use token_css::{StyleScope, parse_declarations};

use crate::css_sync::{CssChange, CssSync, CustomPropertySink, Subscription};
use crate::error::{Result, TokenError};
use crate::registry::TokenRegistry;
use crate::resolver::Resolver;
use crate::token::Token;
use crate::tracker::EntryKey;
use crate::tree::ElementId;
use crate::value::{Assignment, TokenValue};

/// Upper bound on re-sync passes after one mutation. Each pass can only be
/// followed by another if a derive function mutated tokens while being
/// re-evaluated.
const MAX_FLUSH_ROUNDS: usize = 64;

/// A tree of elements, their token assignments and everything derived from them.
///
/// Every mutating call leaves CSS in sync before it returns: the custom
/// properties of assigned and observed tokens that changed are written to
/// the element's [`StyleScope`] and forwarded to the
/// [`CustomPropertySink`], if one is installed.
///
/// ```
/// use design_token::{DesignTokenTree, Token};
///
/// let mut tree = DesignTokenTree::new();
/// let root = tree.create_root();
/// let card = tree.attach(root).unwrap();
///
/// let padding = Token::<String>::create("padding");
/// padding.set_value_for(&mut tree, root, "5px".to_string()).unwrap();
/// assert_eq!(padding.get_value_for(&mut tree, card).unwrap(), "5px");
///
/// padding.set_value_for(&mut tree, card, "10px".to_string()).unwrap();
/// assert_eq!(padding.get_value_for(&mut tree, card).unwrap(), "10px");
/// assert_eq!(padding.get_value_for(&mut tree, root).unwrap(), "5px");
///
/// padding.delete_value_for(&mut tree, card).unwrap();
/// assert_eq!(padding.get_value_for(&mut tree, card).unwrap(), "5px");
/// ```
#[derive(Debug, Default)]
pub struct DesignTokenTree {
    resolver: Resolver,
    css: CssSync,
}

impl DesignTokenTree {
    pub fn new() -> Self {
        Self {
            resolver: Resolver::new(),
            css: CssSync::new(),
        }
    }

    /// Creates a tree that forwards custom property changes to `sink`.
    pub fn with_sink(sink: impl CustomPropertySink + 'static) -> Self {
        let mut tree = Self::new();
        tree.set_sink(sink);
        tree
    }

    pub fn set_sink(&mut self, sink: impl CustomPropertySink + 'static) {
        self.css.set_sink(Some(Box::new(sink)));
    }

    /// Stops forwarding changes to the host; they are queued for
    /// [`take_css_changes`](Self::take_css_changes) instead.
    pub fn clear_sink(&mut self) {
        self.css.set_sink(None);
    }

    // --- tree lifecycle --------------------------------------------------

    /// Adds a new root element.
    pub fn create_root(&mut self) -> ElementId {
        self.resolver.elements.insert_root()
    }

    /// Adds a new element under `parent`. The element starts with no
    /// assignments and inherits everything.
    pub fn attach(&mut self, parent: ElementId) -> Result<ElementId> {
        self.resolver.elements.insert(Some(parent))
    }

    /// Removes `element` and its descendants. Their handles become stale.
    pub fn detach(&mut self, element: ElementId) -> Result<()> {
        let removed = self.resolver.detach(element)?;
        for id in removed {
            self.css.forget_element(id);
        }
        self.flush();
        Ok(())
    }

    /// Moves `element` (with its subtree) under `new_parent`.
    pub fn move_to(&mut self, element: ElementId, new_parent: ElementId) -> Result<()> {
        self.resolver.move_to(element, new_parent)?;
        self.flush();
        Ok(())
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.resolver.elements.contains(element)
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.resolver.elements.parent(element)
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.resolver.elements.children(element)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.resolver.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- values ----------------------------------------------------------

    /// Resolves `token` on `element`. See [`Token::get_value_for`].
    pub fn get<T: TokenValue>(&mut self, element: ElementId, token: &Token<T>) -> Result<T> {
        let resolved = self.resolver.resolve(token.meta(), element);
        // derive functions may have mutated tokens while evaluating
        self.flush();
        token.downcast(&resolved?)
    }

    /// Assigns `token` on `element`. See [`Token::set_value_for`].
    pub fn set<T: TokenValue>(
        &mut self,
        element: ElementId,
        token: &Token<T>,
        value: impl Into<Assignment<T>>,
    ) -> Result<()> {
        self.resolver
            .assign(token.meta(), element, Some(value.into().erase()))?;
        self.flush();
        Ok(())
    }

    /// Clears the own assignment of `token` on `element`. See [`Token::delete_value_for`].
    pub fn delete<T: TokenValue>(&mut self, element: ElementId, token: &Token<T>) -> Result<()> {
        self.resolver.assign(token.meta(), element, None)?;
        self.flush();
        Ok(())
    }

    /// True if `element` assigns `token` itself rather than inheriting it.
    pub fn has_own_value<T: TokenValue>(&self, element: ElementId, token: &Token<T>) -> Result<bool> {
        self.resolver.has_own_value(token.id(), element)
    }

    /// True if the value of `token` on `element` is cached.
    pub fn is_resolved<T: TokenValue>(&self, element: ElementId, token: &Token<T>) -> bool {
        self.resolver.is_cached(EntryKey::new(token.id(), element))
    }

    /// Assigns every `--name: value;` declaration in `source` to `element`.
    ///
    /// All names and values are checked before anything is assigned, so a
    /// bad declaration leaves the tree untouched. Returns the number of
    /// declarations applied.
    pub fn apply_declarations(
        &mut self,
        element: ElementId,
        source: &str,
        registry: &TokenRegistry,
    ) -> Result<usize> {
        self.resolver.elements.ensure(element)?;

        let mut parsed = Vec::new();
        for declaration in parse_declarations(source)? {
            let entry = registry
                .get(&declaration.name)
                .ok_or_else(|| TokenError::UnknownToken(declaration.name.clone()))?;
            parsed.push((entry.meta.clone(), (entry.parse)(&declaration.value)?));
        }

        let count = parsed.len();
        for (meta, assigned) in parsed {
            self.resolver.assign(&meta, element, Some(assigned))?;
        }
        self.flush();
        log::debug!("applied {} declarations to {}", count, element);
        Ok(count)
    }

    // --- css -------------------------------------------------------------

    /// Mirrors `token` on `element` to CSS even while it is inherited.
    pub fn observe<T: TokenValue>(&mut self, element: ElementId, token: &Token<T>) -> Result<()> {
        self.resolver.elements.ensure(element)?;
        if !token.emits_custom_property() {
            log::debug!(
                "design token '{}' does not emit a custom property; observe ignored",
                token.name()
            );
            return Ok(());
        }

        self.resolver.register_token(token.meta());
        let key = EntryKey::new(token.id(), element);
        self.css.subscribe(key, Subscription::OBSERVED);
        self.sync_key(key);
        self.flush();
        Ok(())
    }

    /// Reverses [`observe`](Self::observe). The custom property stays if
    /// the element has assigned the token itself.
    pub fn unobserve<T: TokenValue>(&mut self, element: ElementId, token: &Token<T>) -> Result<()> {
        self.resolver.elements.ensure(element)?;
        let key = EntryKey::new(token.id(), element);
        if self.css.unsubscribe(key, Subscription::OBSERVED).is_empty() {
            self.css.remove(element, token.css_custom_property());
        }
        Ok(())
    }

    /// Custom properties currently declared on `element`.
    pub fn style_scope(&self, element: ElementId) -> Option<&StyleScope> {
        self.css.scope(element)
    }

    /// Drains changes queued while no sink is installed.
    pub fn take_css_changes(&mut self) -> Vec<CssChange> {
        self.css.take_changes()
    }

    /// Brings CSS up to date with everything invalidated since the last flush.
    ///
    /// Deferred while a derive function is running; the outermost call
    /// flushes once the evaluation stack unwinds.
    fn flush(&mut self) {
        if self.resolver.is_evaluating() {
            return;
        }

        for _ in 0..MAX_FLUSH_ROUNDS {
            let events = self.resolver.take_assignment_events();
            let pending = self.resolver.take_pending();
            if events.is_empty() && pending.is_empty() {
                return;
            }

            // An element that assigned a token keeps mirroring it after an
            // unset, so the fallback value replaces its own.
            for (key, assigned) in events {
                let emits = self
                    .resolver
                    .token_meta(key.token)
                    .is_some_and(|meta| meta.emits_custom_property());
                if emits && assigned {
                    self.css.subscribe(key, Subscription::ASSIGNED);
                }
            }

            let mut seen = HashSet::new();
            for key in pending {
                if seen.insert(key) {
                    self.sync_key(key);
                }
            }
        }

        log::warn!(
            "css sync did not settle after {} rounds; derive functions keep mutating tokens",
            MAX_FLUSH_ROUNDS
        );
    }

    /// Writes or removes the custom property for one (token, element) pair.
    fn sync_key(&mut self, key: EntryKey) {
        let Some(meta) = self.resolver.token_meta(key.token) else {
            return;
        };
        if !meta.emits_custom_property() || !self.resolver.elements.contains(key.element) {
            return;
        }

        if self.css.subscription(key).is_empty() {
            self.css.remove(key.element, &meta.custom_property);
            return;
        }

        match self.resolver.resolve_key(key) {
            Ok(value) => {
                self.css
                    .write(key.element, &meta.custom_property, &value.css_text());
            }
            Err(err) => {
                if !err.is_not_found() {
                    log::warn!(
                        "design token '{}' on {} could not be resolved for css: {}",
                        meta.name,
                        key.element,
                        err
                    );
                }
                self.css.remove(key.element, &meta.custom_property);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_css::Length;

    #[test]
    fn test_set_writes_custom_property() {
        let mut tree = DesignTokenTree::new();
        let root = tree.create_root();
        let gap = Token::<Length>::create("gap");

        gap.set_value_for(&mut tree, root, Length::px(4.0)).unwrap();
        assert_eq!(tree.style_scope(root).unwrap().get("--gap"), Some("4px"));
        assert_eq!(
            tree.take_css_changes(),
            vec![CssChange::Write {
                element: root,
                property: "--gap".to_string(),
                value: "4px".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_emitting_token_has_no_css() {
        let mut tree = DesignTokenTree::new();
        let root = tree.create_root();
        let density = Token::<f64>::create_with("density", false);

        density.set_value_for(&mut tree, root, 1.5).unwrap();
        tree.observe(root, &density).unwrap();
        assert!(tree.style_scope(root).is_none());
        assert!(tree.take_css_changes().is_empty());
        assert_eq!(density.get_value_for(&mut tree, root), Ok(1.5));
    }

    #[test]
    fn test_stale_element_is_rejected() {
        let mut tree = DesignTokenTree::new();
        let root = tree.create_root();
        let child = tree.attach(root).unwrap();
        let gap = Token::<f64>::create("gap");
        tree.detach(child).unwrap();

        assert_eq!(
            gap.set_value_for(&mut tree, child, 1.0),
            Err(TokenError::UnknownElement(child))
        );
        assert_eq!(tree.attach(child), Err(TokenError::UnknownElement(child)));
        assert_eq!(tree.has_own_value(child, &gap), Err(TokenError::UnknownElement(child)));
    }

    #[test]
    fn test_has_own_value() {
        let mut tree = DesignTokenTree::new();
        let root = tree.create_root();
        let child = tree.attach(root).unwrap();
        let gap = Token::<f64>::create("gap");
        gap.set_value_for(&mut tree, root, 1.0).unwrap();

        assert_eq!(tree.has_own_value(root, &gap), Ok(true));
        assert_eq!(tree.has_own_value(child, &gap), Ok(false));
    }

    #[test]
    fn test_lifecycle_queries() {
        let mut tree = DesignTokenTree::new();
        assert!(tree.is_empty());
        let root = tree.create_root();
        let a = tree.attach(root).unwrap();
        let b = tree.attach(root).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));

        tree.detach(root).unwrap();
        assert!(tree.is_empty());
        assert!(!tree.contains(a));
    }
}
