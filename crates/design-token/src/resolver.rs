//! Token resolution and invalidation.
//!
//! The [`Resolver`] owns the element arena and every piece of derived state:
//!
//! - `entries`: resolved values keyed by (token, element), plus the origin
//!   (nearest element with an own assignment) each query resolved through
//! - `inherited`: for each (token, origin), the elements whose queries went
//!   through that origin, so a change at the origin reaches them
//! - `graph`: which entries a derived value read on its last evaluation
//!
//! Resolution is lazy. Mutations remove the affected entries (breadth-first,
//! each entry once) and queue their keys in `pending` so the owning tree can
//! re-sync the ones mirrored to CSS.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::error::{Result, TokenError};
use crate::token::{Token, TokenId, TokenMeta};
use crate::tracker::{DependencyGraph, EntryKey, EvaluationStack};
use crate::tree::{ElementArena, ElementId};
use crate::value::{Assigned, Assignment, DeriveFn, SharedValue, TokenValue};

#[derive(Debug, Clone)]
enum Resolved {
    Value(SharedValue),
    /// Nothing assigned up to the root and no default.
    Missing,
}

#[derive(Debug)]
struct Entry {
    origin: Option<ElementId>,
    /// `None` until the query succeeds (or is known to be missing).
    value: Option<Resolved>,
}

#[derive(Debug, Default)]
pub(crate) struct Resolver {
    pub(crate) elements: ElementArena,
    tokens: HashMap<TokenId, Rc<TokenMeta>>,
    entries: HashMap<EntryKey, Entry>,
    inherited: HashMap<(TokenId, Option<ElementId>), HashSet<ElementId>>,
    graph: DependencyGraph,
    stack: EvaluationStack,
    pending: Vec<EntryKey>,
    assignment_events: Vec<(EntryKey, bool)>,
}

impl Resolver {
    pub(crate) fn new() -> Self {
        Self {
            elements: ElementArena::new(),
            ..Self::default()
        }
    }

    pub(crate) fn token_meta(&self, token: TokenId) -> Option<Rc<TokenMeta>> {
        self.tokens.get(&token).cloned()
    }

    /// Remembers the metadata of a token. A handle carrying a default
    /// replaces one registered without it.
    pub(crate) fn register_token(&mut self, meta: &Rc<TokenMeta>) {
        let stored = self.tokens.entry(meta.id).or_insert_with(|| Rc::clone(meta));
        if stored.default.is_some() || meta.default.is_none() {
            return;
        }
        *stored = Rc::clone(meta);

        // Queries that found nothing now resolve to the default.
        let missing: Vec<EntryKey> = self
            .inherited
            .get(&(meta.id, None))
            .map(|members| {
                members
                    .iter()
                    .map(|member| EntryKey::new(meta.id, *member))
                    .collect()
            })
            .unwrap_or_default();
        if !missing.is_empty() {
            self.invalidate(missing);
        }
    }

    pub(crate) fn is_evaluating(&self) -> bool {
        !self.stack.is_empty()
    }

    pub(crate) fn is_cached(&self, key: EntryKey) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|entry| entry.value.is_some())
    }

    pub(crate) fn has_own_value(&self, token: TokenId, element: ElementId) -> Result<bool> {
        Ok(self.elements.get(element)?.storage.contains(token))
    }

    /// Keys invalidated since the last call.
    pub(crate) fn take_pending(&mut self) -> Vec<EntryKey> {
        std::mem::take(&mut self.pending)
    }

    /// `(key, assigned)` for every set (`true`) or unset (`false`) since the last call.
    pub(crate) fn take_assignment_events(&mut self) -> Vec<(EntryKey, bool)> {
        std::mem::take(&mut self.assignment_events)
    }

    fn find_origin(&self, token: TokenId, element: ElementId) -> Option<ElementId> {
        self.elements.ancestors(element).find(|id| {
            self.elements
                .get(*id)
                .is_ok_and(|node| node.storage.contains(token))
        })
    }

    fn not_found(meta: &TokenMeta) -> TokenError {
        TokenError::NotFound {
            token: meta.name.clone(),
        }
    }

    fn cycle_error(&self, path: &[EntryKey]) -> TokenError {
        TokenError::CyclicDependency {
            path: path
                .iter()
                .map(|key| {
                    self.tokens
                        .get(&key.token)
                        .map(|meta| meta.name.clone())
                        .unwrap_or_else(|| format!("{:?}", key.token))
                })
                .collect(),
        }
    }

    /// Records that `key` resolves through `origin`.
    fn register(&mut self, key: EntryKey, origin: Option<ElementId>) {
        if let Some(previous) = self.entries.get(&key).map(|entry| entry.origin) {
            if previous != origin {
                self.unregister(key, previous);
            }
        }
        self.entries.insert(key, Entry { origin, value: None });
        self.inherited
            .entry((key.token, origin))
            .or_default()
            .insert(key.element);
    }

    fn unregister(&mut self, key: EntryKey, origin: Option<ElementId>) {
        if let Some(members) = self.inherited.get_mut(&(key.token, origin)) {
            members.remove(&key.element);
            if members.is_empty() {
                self.inherited.remove(&(key.token, origin));
            }
        }
    }

    /// Stores a value for a registered entry. Entries removed by an
    /// invalidation in the meantime stay uncached.
    fn cache(&mut self, key: EntryKey, value: Resolved) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = Some(value);
        }
    }

    /// Resolves `key`, using the token metadata registered for it.
    pub(crate) fn resolve_key(&mut self, key: EntryKey) -> Result<SharedValue> {
        let meta = self
            .token_meta(key.token)
            .ok_or_else(|| TokenError::UnknownToken(format!("{:?}", key.token)))?;
        self.resolve(&meta, key.element)
    }

    pub(crate) fn resolve(&mut self, meta: &Rc<TokenMeta>, element: ElementId) -> Result<SharedValue> {
        self.elements.ensure(element)?;
        self.register_token(meta);
        let key = EntryKey::new(meta.id, element);

        if let Some(resolved) = self.entries.get(&key).and_then(|entry| entry.value.clone()) {
            log::trace!("design token '{}' cache hit on {}", meta.name, element);
            return match resolved {
                Resolved::Value(value) => Ok(value),
                Resolved::Missing => Err(Self::not_found(meta)),
            };
        }

        let origin = self.find_origin(meta.id, element);
        self.register(key, origin);

        let Some(origin) = origin else {
            return match &meta.default {
                Some(default) => {
                    self.cache(key, Resolved::Value(Rc::clone(default)));
                    Ok(Rc::clone(default))
                }
                None => {
                    self.cache(key, Resolved::Missing);
                    Err(Self::not_found(meta))
                }
            };
        };

        if origin != element {
            log::trace!(
                "design token '{}' on {} inherits from {}",
                meta.name,
                element,
                origin
            );
            let value = self.resolve(meta, origin)?;
            if self.is_cached(EntryKey::new(meta.id, origin)) {
                self.cache(key, Resolved::Value(Rc::clone(&value)));
            }
            return Ok(value);
        }

        let assigned = self
            .elements
            .get(element)?
            .storage
            .get(meta.id)
            .cloned()
            .ok_or_else(|| Self::not_found(meta))?;

        match assigned {
            Assigned::Static(value) => {
                self.cache(key, Resolved::Value(Rc::clone(&value)));
                Ok(value)
            }
            Assigned::Derived(derive) => self.evaluate(meta, key, derive),
        }
    }

    fn evaluate(&mut self, meta: &TokenMeta, key: EntryKey, derive: DeriveFn) -> Result<SharedValue> {
        if let Err(path) = self.stack.push(key) {
            return Err(self.cycle_error(&path));
        }
        self.graph.clear(key);
        log::trace!("evaluating design token '{}' on {}", meta.name, key.element);

        let result = {
            let mut reader = TokenReader {
                resolver: &mut *self,
                element: key.element,
            };
            derive(&mut reader)
        };

        let Some(frame) = self.stack.pop() else {
            return result;
        };
        self.graph.record(key, frame.reads);

        if let Some(path) = frame.cycle {
            return Err(self.cycle_error(&path));
        }
        let value = result?;
        if frame.stale {
            log::debug!(
                "design token '{}' on {} changed while evaluating; result not cached",
                meta.name,
                key.element
            );
            // The edges to inputs written mid-evaluation did not exist yet
            // when they were invalidated, so dependents are reached from here.
            self.invalidate(vec![key]);
            return Ok(value);
        }
        self.cache(key, Resolved::Value(Rc::clone(&value)));
        Ok(value)
    }

    /// Sets (`Some`) or clears (`None`) the own assignment of a token on `element`.
    pub(crate) fn assign(
        &mut self,
        meta: &Rc<TokenMeta>,
        element: ElementId,
        assigned: Option<Assigned>,
    ) -> Result<()> {
        self.elements.ensure(element)?;
        self.register_token(meta);
        let key = EntryKey::new(meta.id, element);
        let previous_origin = self.find_origin(meta.id, element);
        let is_set = assigned.is_some();

        let storage = &mut self.elements.get_mut(element)?.storage;
        match assigned {
            Some(assigned) => {
                storage.set(meta.id, assigned);
            }
            None => {
                if storage.remove(meta.id).is_none() {
                    return Ok(());
                }
            }
        }
        log::debug!(
            "design token '{}' {} on {}",
            meta.name,
            if is_set { "set" } else { "unset" },
            element
        );

        let mut seeds = vec![key];
        if let Some(members) = self.inherited.get(&(meta.id, previous_origin)) {
            seeds.extend(
                members
                    .iter()
                    .copied()
                    .filter(|member| self.elements.is_inclusive_descendant(*member, element))
                    .map(|member| EntryKey::new(meta.id, member)),
            );
        }
        self.invalidate(seeds);
        self.assignment_events.push((key, is_set));
        Ok(())
    }

    /// Removes cached state for `seeds` and everything that depends on them.
    fn invalidate(&mut self, seeds: Vec<EntryKey>) {
        let mut queue: VecDeque<EntryKey> = seeds.into();
        let mut visited = HashSet::new();

        while let Some(key) = queue.pop_front() {
            if !visited.insert(key) {
                continue;
            }
            self.stack.mark_stale(key);

            if let Some(entry) = self.entries.remove(&key) {
                self.unregister(key, entry.origin);
                if entry.origin == Some(key.element) {
                    if let Some(members) = self.inherited.get(&(key.token, Some(key.element))) {
                        queue.extend(
                            members
                                .iter()
                                .map(|member| EntryKey::new(key.token, *member)),
                        );
                    }
                }
            }

            queue.extend(self.graph.dependents_of(key));
            self.graph.clear(key);
            self.pending.push(key);
        }

        log::debug!("invalidated {} design token entries", visited.len());
    }

    /// Removes `element` and its subtree. Returns the removed ids.
    pub(crate) fn detach(&mut self, element: ElementId) -> Result<Vec<ElementId>> {
        self.elements.ensure(element)?;
        let doomed = self.elements.subtree_post_order(element);
        let doomed_set: HashSet<ElementId> = doomed.iter().copied().collect();

        let keys = self.keys_in(&doomed_set);
        self.invalidate(keys);

        for id in &doomed {
            self.graph.forget_element(*id);
        }
        self.inherited.retain(|(_, origin), members| {
            members.retain(|member| !doomed_set.contains(member));
            !members.is_empty() && origin.is_none_or(|origin| !doomed_set.contains(&origin))
        });
        self.pending.retain(|key| !doomed_set.contains(&key.element));
        self.assignment_events
            .retain(|(key, _)| !doomed_set.contains(&key.element));

        for id in &doomed {
            self.elements.remove(*id)?;
        }
        log::debug!("detached {} elements under {}", doomed.len(), element);
        Ok(doomed)
    }

    /// Re-parents `element`, dropping everything cached in its subtree.
    pub(crate) fn move_to(&mut self, element: ElementId, new_parent: ElementId) -> Result<()> {
        self.elements.ensure(element)?;
        self.elements.ensure(new_parent)?;
        if self.elements.is_inclusive_descendant(new_parent, element) {
            return Err(TokenError::InvalidMove {
                element,
                parent: new_parent,
            });
        }

        let subtree: HashSet<ElementId> = self
            .elements
            .subtree_post_order(element)
            .into_iter()
            .collect();
        let keys = self.keys_in(&subtree);
        self.invalidate(keys);
        self.elements.reparent(element, new_parent)
    }

    fn keys_in(&self, elements: &HashSet<ElementId>) -> Vec<EntryKey> {
        self.entries
            .keys()
            .filter(|key| elements.contains(&key.element))
            .copied()
            .collect()
    }
}

/// Capability handed to derive functions.
///
/// Reads go through [`TokenReader::get`], which resolves tokens for the
/// element the derived value is assigned on and records each read as a
/// dependency. Nothing needs to be declared up front: the next time any
/// token read here changes, the derived value is recomputed.
///
/// ```
/// use design_token::{DesignTokenTree, Token};
///
/// let mut tree = DesignTokenTree::new();
/// let root = tree.create_root();
/// let base = Token::<f64>::create("base");
/// let double = Token::<f64>::create("double");
///
/// base.set_value_for(&mut tree, root, 2.0).unwrap();
/// let input = base.clone();
/// double
///     .set_derived_for(&mut tree, root, move |reader| Ok(reader.get(&input)? * 2.0))
///     .unwrap();
///
/// assert_eq!(double.get_value_for(&mut tree, root).unwrap(), 4.0);
/// base.set_value_for(&mut tree, root, 5.0).unwrap();
/// assert_eq!(double.get_value_for(&mut tree, root).unwrap(), 10.0);
/// ```
pub struct TokenReader<'a> {
    resolver: &'a mut Resolver,
    element: ElementId,
}

impl TokenReader<'_> {
    /// The element the derived value is being computed for.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Resolves `token` for this element and records the dependency.
    pub fn get<T: TokenValue>(&mut self, token: &Token<T>) -> Result<T> {
        self.resolver
            .stack
            .record_read(EntryKey::new(token.id(), self.element));
        let value = self.resolver.resolve(token.meta(), self.element)?;
        token.downcast(&value)
    }

    /// Assigns a token on this element from inside an evaluation.
    ///
    /// Evaluations that already read an affected value finish normally but
    /// their results are not cached.
    pub fn set<T: TokenValue>(&mut self, token: &Token<T>, value: impl Into<Assignment<T>>) -> Result<()> {
        self.resolver
            .assign(token.meta(), self.element, Some(value.into().erase()))
    }

    /// Clears a token's own assignment on this element from inside an evaluation.
    pub fn delete<T: TokenValue>(&mut self, token: &Token<T>) -> Result<()> {
        self.resolver.assign(token.meta(), self.element, None)
    }
}
