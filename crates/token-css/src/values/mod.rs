//! Token values and their CSS text form.
//!
//! - [`ToCss`]: serializes a value for a custom property declaration
//! - [`FromCss`]: parses a value out of declaration text
//! - [`Color`]: RGBA color with palette helpers
//! - [`Length`]: a number with a CSS unit
//!
//! Primitive types (`String`, `&'static str`, `f64`, `f32`, `i32`, `u32`,
//! `bool`) implement both traits so they can be used as token values directly.

pub mod color;
pub mod length;

pub use color::Color;
pub use length::{Length, LengthUnit};

use crate::error::{CssError, Result};

/// Serializes a value into the text written after `--name:`.
pub trait ToCss {
    fn to_css(&self) -> String;
}

/// Parses a value from the text of a custom property declaration.
pub trait FromCss: Sized {
    fn from_css(input: &str) -> Result<Self>;
}

impl ToCss for String {
    fn to_css(&self) -> String {
        self.clone()
    }
}

impl ToCss for &'static str {
    fn to_css(&self) -> String {
        (*self).to_string()
    }
}

impl FromCss for String {
    fn from_css(input: &str) -> Result<Self> {
        Ok(input.trim().to_string())
    }
}

macro_rules! numeric_css {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl ToCss for $ty {
                fn to_css(&self) -> String {
                    self.to_string()
                }
            }

            impl FromCss for $ty {
                fn from_css(input: &str) -> Result<Self> {
                    let input = input.trim();
                    input
                        .parse()
                        .map_err(|_| CssError::invalid_value($expected, input))
                }
            }
        )*
    };
}

numeric_css! {
    f64 => "number",
    f32 => "number",
    i32 => "integer",
    u32 => "integer",
}

impl ToCss for bool {
    fn to_css(&self) -> String {
        self.to_string()
    }
}

impl FromCss for bool {
    fn from_css(input: &str) -> Result<Self> {
        match input.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(CssError::invalid_value("boolean", other)),
        }
    }
}
