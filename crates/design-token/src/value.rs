//! Token values and assignments.
//!
//! Tokens are typed (`Token<T>`), but one element can hold values of many
//! types, so the engine stores them type-erased behind [`AnyValue`] and the
//! typed [`Token`](crate::Token) API downcasts on the way out.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use token_css::ToCss;

use crate::error::Result;
use crate::resolver::TokenReader;

/// Bound for anything that can be stored in a design token.
///
/// Implemented automatically for every `Clone + PartialEq + Debug + ToCss`
/// type, which covers strings, numbers and the `token_css` value types.
pub trait TokenValue: Clone + PartialEq + fmt::Debug + ToCss + 'static {}

impl<T> TokenValue for T where T: Clone + PartialEq + fmt::Debug + ToCss + 'static {}

pub(crate) trait AnyValue: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn css_text(&self) -> String;
}

impl<T: TokenValue> AnyValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn css_text(&self) -> String {
        self.to_css()
    }
}

pub(crate) type SharedValue = Rc<dyn AnyValue>;

pub(crate) type DeriveFn = Rc<dyn Fn(&mut TokenReader<'_>) -> Result<SharedValue>>;

/// What an element stores for a token, after type erasure.
#[derive(Clone)]
pub(crate) enum Assigned {
    Static(SharedValue),
    Derived(DeriveFn),
}

impl fmt::Debug for Assigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assigned::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Assigned::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// A value to assign to a token on an element: either a literal, or a
/// function of other tokens that is re-evaluated when any token it reads
/// changes.
///
/// Plain values convert with `into()`, so `token.set_value_for(&mut tree, el, 4.0)`
/// works without naming this type.
pub enum Assignment<T> {
    Static(T),
    Derived(Rc<dyn Fn(&mut TokenReader<'_>) -> Result<T>>),
}

impl<T: TokenValue> Assignment<T> {
    /// Wraps a derive function.
    pub fn derived<F>(derive: F) -> Self
    where
        F: Fn(&mut TokenReader<'_>) -> Result<T> + 'static,
    {
        Assignment::Derived(Rc::new(derive))
    }

    pub(crate) fn erase(self) -> Assigned {
        match self {
            Assignment::Static(value) => Assigned::Static(Rc::new(value)),
            Assignment::Derived(derive) => {
                Assigned::Derived(Rc::new(move |reader: &mut TokenReader<'_>| {
                    derive(reader).map(|value| Rc::new(value) as SharedValue)
                }))
            }
        }
    }
}

impl<T: TokenValue> From<T> for Assignment<T> {
    fn from(value: T) -> Self {
        Assignment::Static(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Assignment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Assignment::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}
