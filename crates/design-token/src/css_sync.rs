//! Mirroring resolved token values into CSS custom properties.
//!
//! Each element has a [`StyleScope`] holding the custom properties the engine
//! has written to it. Writes and removals go through the scope first, so a
//! value that serializes the same as what is already declared never reaches
//! the host.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use token_css::{CssError, StyleScope};

use crate::tracker::EntryKey;
use crate::tree::ElementId;

bitflags! {
    /// Why a (token, element) pair is mirrored to CSS.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Subscription: u8 {
        /// The element has assigned a CSS-emitting token. Kept after an unset.
        const ASSIGNED = 0b01;
        /// The host asked for the value to be mirrored even when inherited.
        const OBSERVED = 0b10;
    }
}

/// Receives custom property updates for elements, e.g. a DOM or a
/// stylesheet writer.
///
/// Each call corresponds to an actual change; unchanged values are filtered
/// out before reaching the sink. Errors are logged and do not affect
/// resolution.
pub trait CustomPropertySink {
    fn write_custom_property(
        &mut self,
        element: ElementId,
        property: &str,
        value: &str,
    ) -> Result<(), CssError>;

    fn remove_custom_property(&mut self, element: ElementId, property: &str) -> Result<(), CssError>;
}

/// A change made to an element's custom properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssChange {
    Write {
        element: ElementId,
        property: String,
        value: String,
    },
    Remove {
        element: ElementId,
        property: String,
    },
}

#[derive(Default)]
pub(crate) struct CssSync {
    subscriptions: HashMap<EntryKey, Subscription>,
    scopes: HashMap<ElementId, StyleScope>,
    /// Queued changes, kept only while no sink is installed.
    changes: Vec<CssChange>,
    sink: Option<Box<dyn CustomPropertySink>>,
}

impl CssSync {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_sink(&mut self, sink: Option<Box<dyn CustomPropertySink>>) {
        self.sink = sink;
    }

    pub(crate) fn subscription(&self, key: EntryKey) -> Subscription {
        self.subscriptions.get(&key).copied().unwrap_or_default()
    }

    pub(crate) fn subscribe(&mut self, key: EntryKey, flags: Subscription) {
        *self.subscriptions.entry(key).or_default() |= flags;
    }

    /// Clears `flags`, returning what remains.
    pub(crate) fn unsubscribe(&mut self, key: EntryKey, flags: Subscription) -> Subscription {
        let Some(current) = self.subscriptions.get_mut(&key) else {
            return Subscription::empty();
        };
        current.remove(flags);
        let remaining = *current;
        if remaining.is_empty() {
            self.subscriptions.remove(&key);
        }
        remaining
    }

    pub(crate) fn scope(&self, element: ElementId) -> Option<&StyleScope> {
        self.scopes.get(&element)
    }

    /// Declares `property: value` on `element`. Returns `false` if unchanged.
    pub(crate) fn write(&mut self, element: ElementId, property: &str, value: &str) -> bool {
        if !self.scopes.entry(element).or_default().set(property, value) {
            return false;
        }
        log::debug!("css {}: {}: {}", element, property, value);

        match self.sink.as_mut() {
            Some(sink) => {
                if let Err(err) = sink.write_custom_property(element, property, value) {
                    log::warn!("failed to write {} on {}: {}", property, element, err);
                }
            }
            None => self.changes.push(CssChange::Write {
                element,
                property: property.to_string(),
                value: value.to_string(),
            }),
        }
        true
    }

    /// Removes `property` from `element`. Returns `false` if it was not declared.
    pub(crate) fn remove(&mut self, element: ElementId, property: &str) -> bool {
        let removed = self
            .scopes
            .get_mut(&element)
            .is_some_and(|scope| scope.remove(property));
        if !removed {
            return false;
        }
        log::debug!("css {}: remove {}", element, property);

        match self.sink.as_mut() {
            Some(sink) => {
                if let Err(err) = sink.remove_custom_property(element, property) {
                    log::warn!("failed to remove {} from {}: {}", property, element, err);
                }
            }
            None => self.changes.push(CssChange::Remove {
                element,
                property: property.to_string(),
            }),
        }
        true
    }

    pub(crate) fn take_changes(&mut self) -> Vec<CssChange> {
        std::mem::take(&mut self.changes)
    }

    /// Drops all state for a detached element without notifying the host.
    pub(crate) fn forget_element(&mut self, element: ElementId) {
        self.scopes.remove(&element);
        self.subscriptions.retain(|key, _| key.element != element);
        self.changes.retain(|change| match change {
            CssChange::Write { element: id, .. } | CssChange::Remove { element: id, .. } => {
                *id != element
            }
        });
    }
}

impl fmt::Debug for CssSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssSync")
            .field("subscriptions", &self.subscriptions)
            .field("scopes", &self.scopes)
            .field("changes", &self.changes)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::tree::ElementArena;

    struct FailingSink {
        calls: Rc<RefCell<usize>>,
    }

    impl CustomPropertySink for FailingSink {
        fn write_custom_property(&mut self, _: ElementId, property: &str, _: &str) -> Result<(), CssError> {
            *self.calls.borrow_mut() += 1;
            Err(CssError::ScopeUnavailable(property.to_string()))
        }

        fn remove_custom_property(&mut self, _: ElementId, property: &str) -> Result<(), CssError> {
            *self.calls.borrow_mut() += 1;
            Err(CssError::ScopeUnavailable(property.to_string()))
        }
    }

    fn element() -> ElementId {
        ElementArena::new().insert(None).unwrap()
    }

    #[test]
    fn test_write_skips_unchanged_value() {
        let el = element();
        let mut sync = CssSync::new();
        assert!(sync.write(el, "--gap", "4px"));
        assert!(!sync.write(el, "--gap", "4px"));
        assert!(sync.write(el, "--gap", "8px"));
        assert_eq!(sync.take_changes().len(), 2);
        assert_eq!(sync.scope(el).unwrap().get("--gap"), Some("8px"));
    }

    #[test]
    fn test_remove_only_declared() {
        let el = element();
        let mut sync = CssSync::new();
        assert!(!sync.remove(el, "--gap"));
        sync.write(el, "--gap", "4px");
        assert!(sync.remove(el, "--gap"));
        assert_eq!(
            sync.take_changes(),
            vec![
                CssChange::Write {
                    element: el,
                    property: "--gap".to_string(),
                    value: "4px".to_string(),
                },
                CssChange::Remove {
                    element: el,
                    property: "--gap".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_sink_failure_is_not_fatal() {
        let el = element();
        let calls = Rc::new(RefCell::new(0));
        let mut sync = CssSync::new();
        sync.set_sink(Some(Box::new(FailingSink {
            calls: Rc::clone(&calls),
        })));

        assert!(sync.write(el, "--gap", "4px"));
        assert!(sync.remove(el, "--gap"));
        assert_eq!(*calls.borrow(), 2);
        assert!(sync.take_changes().is_empty());
        assert!(sync.scope(el).unwrap().is_empty());
    }

    #[test]
    fn test_subscription_flags() {
        let el = element();
        let key = EntryKey::new(crate::Token::<f64>::create("gap").id(), el);
        let mut sync = CssSync::new();

        sync.subscribe(key, Subscription::ASSIGNED);
        sync.subscribe(key, Subscription::OBSERVED);
        assert_eq!(sync.subscription(key), Subscription::all());

        assert_eq!(
            sync.unsubscribe(key, Subscription::ASSIGNED),
            Subscription::OBSERVED
        );
        assert!(sync.unsubscribe(key, Subscription::OBSERVED).is_empty());
        assert!(sync.subscription(key).is_empty());
    }
}
