//! # design-tokens
//!
//! Tree-scoped design tokens mirrored to CSS custom properties.
//!
//! This crate bundles the workspace for applications:
//!
//! - [`design_token`]: tokens, the element tree, derived values
//! - [`token_css`]: CSS value types, declaration parsing, style scopes
//! - [`palette`]: a theme palette built on top of both
//!
//! ```rust
//! use design_tokens::{Color, DesignTokenTree, Palette};
//!
//! let palette = Palette::new();
//! let mut tree = DesignTokenTree::new();
//! let root = tree.create_root();
//!
//! palette.primary.set_value_for(&mut tree, root, Color::rgb(1, 120, 212)).unwrap();
//! palette.install(&mut tree, root).unwrap();
//!
//! let scope = tree.style_scope(root).unwrap();
//! assert!(scope.contains("--primary-darken-1"));
//! ```

pub mod palette;

pub use design_token::{
    Assignment, CssChange, CustomPropertySink, DesignTokenTree, ElementId, Result, Token,
    TokenError, TokenReader, TokenRegistry, TokenValue, log_init,
};
pub use palette::Palette;
pub use token_css::{Color, CssError, FromCss, Length, LengthUnit, StyleScope, ToCss};
