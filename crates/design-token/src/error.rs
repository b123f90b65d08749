//! Error types for token resolution and tree maintenance.

use thiserror::Error;
use token_css::CssError;

use crate::tree::ElementId;

/// Errors surfaced by [`DesignTokenTree`](crate::DesignTokenTree) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    /// No element from the queried one up to the root assigns the token,
    /// and the token has no default.
    #[error("no value for design token '{token}' on the element or any ancestor")]
    NotFound { token: String },

    /// A derived value (transitively) reads itself.
    ///
    /// `path` lists the token names from the first re-entered token back to itself.
    #[error("cyclic dependency between design tokens: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    /// A derive function reported its own failure.
    #[error("derived value failed: {0}")]
    Derivation(String),

    /// The element handle is stale (detached) or was never issued by this tree.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    /// Re-parenting would make an element its own ancestor.
    #[error("cannot move element {element} under {parent}, which is inside its subtree")]
    InvalidMove {
        element: ElementId,
        parent: ElementId,
    },

    /// A stored value does not have the token's declared type.
    #[error("design token '{token}' does not hold a value of the requested type")]
    TypeMismatch { token: String },

    /// A declaration names a token that is not in the registry.
    #[error("no design token named '{0}' is registered")]
    UnknownToken(String),

    /// CSS text could not be parsed or converted.
    #[error(transparent)]
    Css(#[from] CssError),
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, TokenError>;

impl TokenError {
    /// Builds a [`TokenError::Derivation`] from any message.
    pub fn derivation(message: impl Into<String>) -> Self {
        TokenError::Derivation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TokenError::NotFound { .. })
    }

    pub fn is_cyclic(&self) -> bool {
        matches!(self, TokenError::CyclicDependency { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_lists_path() {
        let err = TokenError::CyclicDependency {
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("cyclic"));
        assert!(msg.contains("a -> b -> a"));
    }

    #[test]
    fn test_not_found_display() {
        let err = TokenError::NotFound {
            token: "accent".to_string(),
        };
        assert!(err.to_string().contains("'accent'"));
        assert!(err.is_not_found());
        assert!(!err.is_cyclic());
    }

    #[test]
    fn test_css_error_is_transparent() {
        let err: TokenError = CssError::InvalidName("a b".to_string()).into();
        assert_eq!(err.to_string(), "invalid custom property name: 'a b'");
    }
}
