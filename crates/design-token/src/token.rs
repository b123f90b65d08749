//! Token definitions.
//!
//! A [`Token`] is an immutable descriptor: a name, whether it is mirrored to
//! a CSS custom property, and an optional default. Identity comes from a
//! process-wide counter, not from the name, so two tokens created with the
//! same name are unrelated. Share one instance (it is cheap to clone) when
//! shared identity is wanted.
//!
//! ```
//! use design_token::{DesignTokenTree, Token};
//!
//! let mut tree = DesignTokenTree::new();
//! let root = tree.create_root();
//!
//! let corner_radius = Token::<f64>::create("corner-radius");
//! assert_eq!(corner_radius.create_css(), "var(--corner-radius)");
//!
//! corner_radius.set_value_for(&mut tree, root, 4.0).unwrap();
//! assert_eq!(corner_radius.get_value_for(&mut tree, root).unwrap(), 4.0);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use token_css::property::{custom_property_name, validate_name, var_reference};

use crate::error::{Result, TokenError};
use crate::resolver::TokenReader;
use crate::token_tree::DesignTokenTree;
use crate::tree::ElementId;
use crate::value::{Assignment, SharedValue, TokenValue};

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

impl TokenId {
    fn next() -> Self {
        TokenId(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Untyped token data shared by every clone of a [`Token`].
#[derive(Debug)]
pub(crate) struct TokenMeta {
    pub(crate) id: TokenId,
    pub(crate) name: String,
    /// `--name`, or empty when the token is not mirrored to CSS.
    pub(crate) custom_property: String,
    css_var: String,
    pub(crate) default: Option<SharedValue>,
}

impl TokenMeta {
    pub(crate) fn emits_custom_property(&self) -> bool {
        !self.custom_property.is_empty()
    }
}

/// A named, typed design token.
pub struct Token<T> {
    meta: Rc<TokenMeta>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TokenValue> Token<T> {
    /// Creates a token that is mirrored to the `--name` custom property.
    pub fn create(name: impl Into<String>) -> Self {
        Self::create_with(name, true)
    }

    /// Creates a token, choosing whether it is mirrored to CSS.
    pub fn create_with(name: impl Into<String>, emits_custom_property: bool) -> Self {
        let name = name.into();
        if emits_custom_property && validate_name(&name).is_err() {
            log::warn!("design token '{}' is not a valid custom property name", name);
        }

        let (custom_property, css_var) = if emits_custom_property {
            (custom_property_name(&name), var_reference(&name))
        } else {
            (String::new(), String::new())
        };

        Self {
            meta: Rc::new(TokenMeta {
                id: TokenId::next(),
                name,
                custom_property,
                css_var,
                default: None,
            }),
            _marker: PhantomData,
        }
    }

    /// Attaches a default used when no element up to the root assigns the token.
    ///
    /// Meant for definition time. Once a tree has seen the returned handle,
    /// lookups through older clones fall back to the default too.
    pub fn with_default(self, value: T) -> Self {
        Self {
            meta: Rc::new(TokenMeta {
                id: self.meta.id,
                name: self.meta.name.clone(),
                custom_property: self.meta.custom_property.clone(),
                css_var: self.meta.css_var.clone(),
                default: Some(Rc::new(value)),
            }),
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> TokenId {
        self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn emits_custom_property(&self) -> bool {
        self.meta.emits_custom_property()
    }

    /// `--name` if the token is mirrored to CSS, otherwise an empty string.
    pub fn css_custom_property(&self) -> &str {
        &self.meta.custom_property
    }

    /// `var(--name)` if the token is mirrored to CSS, otherwise an empty string.
    pub fn create_css(&self) -> &str {
        &self.meta.css_var
    }

    pub fn default_value(&self) -> Option<T> {
        self.meta
            .default
            .as_ref()
            .and_then(|value| value.as_any().downcast_ref::<T>().cloned())
    }

    /// The value for `element`: its own assignment or the nearest ancestor's.
    pub fn get_value_for(&self, tree: &mut DesignTokenTree, element: ElementId) -> Result<T> {
        tree.get(element, self)
    }

    /// Assigns a static value or an [`Assignment::Derived`] function.
    pub fn set_value_for(
        &self,
        tree: &mut DesignTokenTree,
        element: ElementId,
        value: impl Into<Assignment<T>>,
    ) -> Result<()> {
        tree.set(element, self, value)
    }

    /// Assigns a value computed from other tokens read through the [`TokenReader`].
    pub fn set_derived_for<F>(
        &self,
        tree: &mut DesignTokenTree,
        element: ElementId,
        derive: F,
    ) -> Result<()>
    where
        F: Fn(&mut TokenReader<'_>) -> Result<T> + 'static,
    {
        tree.set(element, self, Assignment::derived(derive))
    }

    /// Removes the element's own assignment so it inherits again.
    pub fn delete_value_for(&self, tree: &mut DesignTokenTree, element: ElementId) -> Result<()> {
        tree.delete(element, self)
    }

    pub(crate) fn meta(&self) -> &Rc<TokenMeta> {
        &self.meta
    }

    pub(crate) fn downcast(&self, value: &SharedValue) -> Result<T> {
        value
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| TokenError::TypeMismatch {
                token: self.meta.name.clone(),
            })
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            meta: Rc::clone(&self.meta),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.meta.id)
            .field("name", &self.meta.name)
            .field("emits_custom_property", &self.meta.emits_custom_property())
            .finish()
    }
}

impl<T> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.meta.id == other.meta.id
    }
}

impl<T> Eq for Token<T> {}

impl<T> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.meta.id.hash(state);
    }
}
