//! # token-css - CSS side of design tokens
//!
//! Everything a design token needs to live as a CSS custom property:
//!
//! - **Naming**: `--name` properties and `var(--name)` references
//! - **Values**: the [`ToCss`]/[`FromCss`] traits plus [`Color`] and [`Length`]
//! - **Declarations**: parsing `--name: value;` lists used to configure tokens
//! - **Scopes**: [`StyleScope`], the custom properties declared on one element
//!
//! ## Quick Start
//!
//! ```rust
//! use token_css::parser::parse_declarations;
//! use token_css::{Color, FromCss, ToCss};
//!
//! let declarations = parse_declarations(":root { --accent: #0178d4; }").unwrap();
//! let accent = Color::from_css(&declarations[0].value).unwrap();
//! assert_eq!(accent.to_css(), "#0178d4");
//! ```
//!
//! ## Modules
//!
//! - [`property`]: custom property names and `var()` references
//! - [`values`]: token value types and conversions
//! - [`parser`]: declaration parsing
//! - [`scope`]: per-element custom property scopes
//! - [`error`]: error types

pub mod error;
pub mod parser;
pub mod property;
pub mod scope;
pub mod values;

pub use error::CssError;
pub use parser::{Declaration, parse_declarations};
pub use property::{custom_property_name, var_reference};
pub use scope::StyleScope;
pub use values::{Color, FromCss, Length, LengthUnit, ToCss};
