//! RGBA color values for design tokens.
//!
//! Colors are the most common token type. Besides parsing the usual CSS
//! notations, [`Color`] carries the HSL helpers a palette needs to derive
//! shades from a base color:
//!
//! ```
//! use token_css::values::Color;
//!
//! let accent = Color::parse("#0178d4").unwrap();
//! let hover = accent.lighten(0.1);
//! assert!(hover.luminance() > accent.luminance());
//! ```
//!
//! ## Supported Formats
//!
//! - **Hex**: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - **RGB**: `rgb(r, g, b)`, `rgba(r, g, b, a)`
//! - **HSL**: `hsl(h, s%, l%)`, `hsla(h, s%, l%, a)`
//! - **Named**: common CSS color names and `transparent`

use phf::phf_map;

use crate::error::{CssError, Result};
use crate::values::{FromCss, ToCss};

/// CSS named colors accepted by [`Color::parse`].
static NAMED_COLORS: phf::Map<&'static str, (u8, u8, u8)> = phf_map! {
    "black" => (0, 0, 0),
    "white" => (255, 255, 255),
    "red" => (255, 0, 0),
    "green" => (0, 128, 0),
    "lime" => (0, 255, 0),
    "blue" => (0, 0, 255),
    "yellow" => (255, 255, 0),
    "cyan" => (0, 255, 255),
    "aqua" => (0, 255, 255),
    "magenta" => (255, 0, 255),
    "fuchsia" => (255, 0, 255),
    "gray" => (128, 128, 128),
    "grey" => (128, 128, 128),
    "silver" => (192, 192, 192),
    "maroon" => (128, 0, 0),
    "olive" => (128, 128, 0),
    "navy" => (0, 0, 128),
    "purple" => (128, 0, 128),
    "teal" => (0, 128, 128),
    "orange" => (255, 165, 0),
    "coral" => (255, 127, 80),
    "crimson" => (220, 20, 60),
    "gold" => (255, 215, 0),
    "indigo" => (75, 0, 130),
    "pink" => (255, 192, 203),
    "salmon" => (250, 128, 114),
    "tomato" => (255, 99, 71),
    "turquoise" => (64, 224, 208),
    "violet" => (238, 130, 238),
    "whitesmoke" => (245, 245, 245),
    "gainsboro" => (220, 220, 220),
    "rebeccapurple" => (102, 51, 153),
};

/// An sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0.0 = transparent, 1.0 = opaque).
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Returns a fully transparent color.
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0.0)
    }

    /// Returns a copy of this color with the specified alpha value.
    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..*self
        }
    }

    /// Returns true if the color is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Relative luminance (ITU-R BT.709), from 0.0 (black) to 1.0 (white).
    pub fn luminance(&self) -> f32 {
        let r = Self::srgb_to_linear(self.r as f32 / 255.0);
        let g = Self::srgb_to_linear(self.g as f32 / 255.0);
        let b = Self::srgb_to_linear(self.b as f32 / 255.0);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    fn srgb_to_linear(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    /// WCAG contrast ratio between two colors (1.0 to 21.0).
    pub fn contrast_ratio(&self, other: &Color) -> f32 {
        let (a, b) = (self.luminance(), other.luminance());
        let (light, dark) = if a > b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }

    /// Black or white, whichever reads better on top of this color.
    pub fn contrasting_text(&self) -> Self {
        if self.contrast_ratio(&Color::black()) >= self.contrast_ratio(&Color::white()) {
            Color::black()
        } else {
            Color::white()
        }
    }

    /// Increases HSL lightness by `amount` (0.0 - 1.0).
    pub fn lighten(&self, amount: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + amount).clamp(0.0, 1.0), self.a)
    }

    /// Decreases HSL lightness by `amount` (0.0 - 1.0).
    pub fn darken(&self, amount: f32) -> Self {
        self.lighten(-amount)
    }

    /// Linear interpolation towards `other`; `weight` 0.0 keeps `self`.
    pub fn mix(&self, other: &Color, weight: f32) -> Self {
        let w = weight.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * w).round() as u8;
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a + (other.a - self.a) * w,
        }
    }

    /// Parse a color string in any of the supported formats.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CssError::invalid_value("color", input));
        }

        let lower = input.to_ascii_lowercase();
        if lower == "transparent" {
            return Ok(Self::transparent());
        }
        if let Some(hex) = lower.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| CssError::invalid_value("color", input));
        }
        if lower.starts_with("rgb") {
            return Self::parse_rgb_func(&lower).ok_or_else(|| CssError::invalid_value("color", input));
        }
        if lower.starts_with("hsl") {
            return Self::parse_hsl_func(&lower).ok_or_else(|| CssError::invalid_value("color", input));
        }

        NAMED_COLORS
            .get(lower.as_str())
            .map(|&(r, g, b)| Self::rgb(r, g, b))
            .ok_or_else(|| CssError::invalid_value("color", input))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;

        match digits.as_slice() {
            [r, g, b] => Some(Self::rgb(r * 17, g * 17, b * 17)),
            [r, g, b, a] => Some(Self::rgba(r * 17, g * 17, b * 17, (a * 17) as f32 / 255.0)),
            [r1, r2, g1, g2, b1, b2] => Some(Self::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            [r1, r2, g1, g2, b1, b2, a1, a2] => Some(Self::rgba(
                r1 * 16 + r2,
                g1 * 16 + g2,
                b1 * 16 + b2,
                (a1 * 16 + a2) as f32 / 255.0,
            )),
            _ => None,
        }
    }

    /// Returns the comma-separated arguments of a `name(...)` function.
    fn function_args(input: &str) -> Option<Vec<&str>> {
        let start = input.find('(')?;
        let end = input.rfind(')')?;
        if end < start {
            return None;
        }
        let args: Vec<&str> = input[start + 1..end].split(',').map(str::trim).collect();
        (args.len() == 3 || args.len() == 4).then_some(args)
    }

    fn parse_alpha(args: &[&str]) -> Option<f32> {
        match args.get(3) {
            Some(alpha) => alpha.parse::<f32>().ok().map(|a| a.clamp(0.0, 1.0)),
            None => Some(1.0),
        }
    }

    fn parse_rgb_func(input: &str) -> Option<Self> {
        let args = Self::function_args(input)?;
        let r = args[0].parse::<u8>().ok()?;
        let g = args[1].parse::<u8>().ok()?;
        let b = args[2].parse::<u8>().ok()?;
        Some(Self::rgba(r, g, b, Self::parse_alpha(&args)?))
    }

    fn parse_hsl_func(input: &str) -> Option<Self> {
        let args = Self::function_args(input)?;
        let h = args[0].parse::<f32>().ok()?;
        let s = args[1].strip_suffix('%')?.parse::<f32>().ok()? / 100.0;
        let l = args[2].strip_suffix('%')?.parse::<f32>().ok()? / 100.0;
        Some(Self::from_hsl(h, s, l, Self::parse_alpha(&args)?))
    }

    /// Converts to (hue in degrees, saturation, lightness).
    pub fn to_hsl(&self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s, l)
    }

    /// Creates a color from HSL values (hue in degrees).
    pub fn from_hsl(h: f32, s: f32, l: f32, a: f32) -> Self {
        let h = (h / 360.0).rem_euclid(1.0);
        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                Self::hue_to_rgb(p, q, h + 1.0 / 3.0),
                Self::hue_to_rgb(p, q, h),
                Self::hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Self::rgba(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            a,
        )
    }

    fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }
}

impl ToCss for Color {
    /// Opaque colors serialize as `#rrggbb`, translucent ones as `rgba()`.
    fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = (self.a * 1000.0).round() / 1000.0;
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }
}

impl FromCss for Color {
    fn from_css(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}
