//! Custom property sinks and counters shared by the integration tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use design_token::{CssChange, CustomPropertySink, ElementId};
use token_css::CssError;

/// Records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingSink {
    changes: Rc<RefCell<Vec<CssChange>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the recorded calls.
    pub fn take(&self) -> Vec<CssChange> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }
}

impl CustomPropertySink for RecordingSink {
    fn write_custom_property(
        &mut self,
        element: ElementId,
        property: &str,
        value: &str,
    ) -> Result<(), CssError> {
        self.changes.borrow_mut().push(CssChange::Write {
            element,
            property: property.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_custom_property(&mut self, element: ElementId, property: &str) -> Result<(), CssError> {
        self.changes.borrow_mut().push(CssChange::Remove {
            element,
            property: property.to_string(),
        });
        Ok(())
    }
}

/// Rejects every call.
pub struct FailingSink;

impl CustomPropertySink for FailingSink {
    fn write_custom_property(&mut self, _: ElementId, property: &str, _: &str) -> Result<(), CssError> {
        Err(CssError::ScopeUnavailable(property.to_string()))
    }

    fn remove_custom_property(&mut self, _: ElementId, property: &str) -> Result<(), CssError> {
        Err(CssError::ScopeUnavailable(property.to_string()))
    }
}

pub fn write(element: ElementId, property: &str, value: &str) -> CssChange {
    CssChange::Write {
        element,
        property: property.to_string(),
        value: value.to_string(),
    }
}

pub fn remove(element: ElementId, property: &str) -> CssChange {
    CssChange::Remove {
        element,
        property: property.to_string(),
    }
}

/// A shared call counter for derive functions.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}
