//! # design-token - tree-scoped design tokens
//!
//! Named, typed style values (colors, spacing, radii) resolved per element
//! of a tree. An element either assigns a token itself or inherits the
//! value of its nearest ancestor that does. Values can be *derived* from
//! other tokens; the engine records what a derived value reads and
//! recomputes it when any of those inputs change.
//!
//! ## Quick Start
//!
//! ```rust
//! use design_token::{DesignTokenTree, Token};
//! use token_css::Color;
//!
//! let mut tree = DesignTokenTree::new();
//! let root = tree.create_root();
//! let button = tree.attach(root).unwrap();
//!
//! let accent = Token::<Color>::create("accent");
//! let accent_hover = Token::<Color>::create("accent-hover");
//!
//! accent.set_value_for(&mut tree, root, Color::rgb(1, 120, 212)).unwrap();
//! let base = accent.clone();
//! accent_hover
//!     .set_derived_for(&mut tree, root, move |reader| Ok(reader.get(&base)?.lighten(0.1)))
//!     .unwrap();
//!
//! // Inherited from the root.
//! let hover = accent_hover.get_value_for(&mut tree, button).unwrap();
//! assert_eq!(hover, Color::rgb(1, 120, 212).lighten(0.1));
//!
//! // Mirrored to CSS on the element that assigns it.
//! let scope = tree.style_scope(root).unwrap();
//! assert_eq!(scope.get("--accent"), Some("#0178d4"));
//! assert_eq!(accent.create_css(), "var(--accent)");
//! ```
//!
//! ## Modules
//!
//! - [`token`]: token definitions
//! - [`token_tree`]: the element tree and its public operations
//! - [`resolver`]: resolution, caching and invalidation
//! - [`css_sync`]: custom property mirroring
//! - [`registry`]: configuring tokens from CSS declarations
//! - [`log_init`]: file logger setup

pub mod css_sync;
pub mod error;
pub mod log_init;
pub mod registry;
pub mod resolver;
pub mod token;
pub mod token_tree;
pub mod tree;
pub mod value;

mod storage;
mod tracker;

pub use css_sync::{CssChange, CustomPropertySink, Subscription};
pub use error::{Result, TokenError};
pub use registry::TokenRegistry;
pub use resolver::TokenReader;
pub use token::{Token, TokenId};
pub use token_tree::DesignTokenTree;
pub use tree::ElementId;
pub use value::{Assignment, TokenValue};
