//! Custom property naming.
//!
//! A design token named `accent-fill` is exposed to CSS as the custom property
//! `--accent-fill` and referenced from stylesheets as `var(--accent-fill)`.

use crate::error::{CssError, Result};

/// Returns the custom property name for a token name (`accent` → `--accent`).
pub fn custom_property_name(name: &str) -> String {
    format!("--{}", name)
}

/// Returns the `var()` reference for a token name (`accent` → `var(--accent)`).
pub fn var_reference(name: &str) -> String {
    format!("var(--{})", name)
}

/// Strips the leading `--` from a custom property name, if present.
pub fn strip_custom_prefix(property: &str) -> &str {
    property.strip_prefix("--").unwrap_or(property)
}

/// Checks that `name` can be used after `--` in a custom property.
///
/// Accepts ASCII letters, digits, `-` and `_`, plus any non-ASCII character.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii());
    if valid {
        Ok(())
    } else {
        Err(CssError::InvalidName(name.to_string()))
    }
}
