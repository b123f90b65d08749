//! Name lookup for configuring tokens from CSS declarations.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use token_css::FromCss;

use crate::error::Result;
use crate::token::{Token, TokenMeta};
use crate::value::{Assigned, Assignment, TokenValue};

type ParseFn = Rc<dyn Fn(&str) -> Result<Assigned>>;

#[derive(Clone)]
pub(crate) struct RegisteredToken {
    pub(crate) meta: Rc<TokenMeta>,
    pub(crate) parse: ParseFn,
}

/// Maps token names to tokens whose values can be parsed from CSS text.
///
/// Used with [`DesignTokenTree::apply_declarations`](crate::DesignTokenTree::apply_declarations):
///
/// ```
/// use design_token::{DesignTokenTree, Token, TokenRegistry};
/// use token_css::Length;
///
/// let gap = Token::<Length>::create("gap");
/// let mut registry = TokenRegistry::new();
/// registry.register(&gap);
///
/// let mut tree = DesignTokenTree::new();
/// let root = tree.create_root();
/// tree.apply_declarations(root, ":root { --gap: 4px; }", &registry).unwrap();
/// assert_eq!(gap.get_value_for(&mut tree, root).unwrap(), Length::px(4.0));
/// ```
#[derive(Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, RegisteredToken>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` under its name. A later registration with the same
    /// name replaces the earlier one.
    pub fn register<T>(&mut self, token: &Token<T>) -> &mut Self
    where
        T: TokenValue + FromCss,
    {
        let parse: ParseFn = Rc::new(|text: &str| -> Result<Assigned> {
            Ok(Assignment::Static(T::from_css(text)?).erase())
        });
        let previous = self.tokens.insert(
            token.name().to_string(),
            RegisteredToken {
                meta: Rc::clone(token.meta()),
                parse,
            },
        );
        if previous.is_some() {
            log::debug!("design token '{}' re-registered", token.name());
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tokens.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredToken> {
        self.tokens.get(name)
    }
}

impl fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("tokens", &self.names())
            .finish()
    }
}
