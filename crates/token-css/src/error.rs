//! Error types for CSS value parsing and style scope updates.
//!
//! This module defines the errors that can occur when parsing custom property
//! declarations, converting CSS text into typed token values, or forwarding
//! custom property writes to a host style scope.

use thiserror::Error;

/// Errors that can occur while parsing or writing CSS for design tokens.
///
/// # Examples
///
/// ```rust
/// use token_css::parser::parse_declarations;
///
/// // Missing value after the colon
/// let result = parse_declarations("--accent: ;");
/// assert!(result.is_err());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CssError {
    /// Invalid CSS syntax was encountered during parsing.
    ///
    /// The string contains details about what was unexpected and where.
    #[error("CSS syntax error: {0}")]
    InvalidSyntax(String),

    /// A value could not be converted into the requested type.
    #[error("invalid {expected} value: '{found}'")]
    InvalidValue {
        /// What kind of value was expected (e.g. "color", "length").
        expected: &'static str,
        /// The text that failed to parse.
        found: String,
    },

    /// A custom property name is not a valid CSS identifier.
    #[error("invalid custom property name: '{0}'")]
    InvalidName(String),

    /// The host could not apply a custom property to an element's style scope,
    /// for instance because the element is no longer connected.
    #[error("style scope unavailable: {0}")]
    ScopeUnavailable(String),
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, CssError>;

impl CssError {
    pub(crate) fn invalid_value(expected: &'static str, found: impl Into<String>) -> Self {
        CssError::InvalidValue {
            expected,
            found: found.into(),
        }
    }
}
