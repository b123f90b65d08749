//! Lengths with CSS units (`4px`, `1.25rem`, `50%`).

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, opt, recognize},
    sequence::{pair, tuple},
};

use crate::error::{CssError, Result};
use crate::values::{FromCss, ToCss};

/// Unit of a [`Length`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Px,
    Rem,
    Em,
    Percent,
    /// A bare number, e.g. a line-height multiplier.
    Number,
}

impl LengthUnit {
    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Rem => "rem",
            LengthUnit::Em => "em",
            LengthUnit::Percent => "%",
            LengthUnit::Number => "",
        }
    }
}

/// A numeric value with a unit.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub const fn px(value: f64) -> Self {
        Self::new(value, LengthUnit::Px)
    }

    pub const fn rem(value: f64) -> Self {
        Self::new(value, LengthUnit::Rem)
    }

    pub const fn percent(value: f64) -> Self {
        Self::new(value, LengthUnit::Percent)
    }

    /// Multiplies the value, keeping the unit.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.value * factor, self.unit)
    }

    /// Adds another length of the same unit. Returns `None` on unit mismatch.
    pub fn checked_add(&self, other: &Length) -> Option<Self> {
        (self.unit == other.unit).then(|| Self::new(self.value + other.value, self.unit))
    }

    /// Parses a length such as `4px` or `-0.5rem`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match parse_length(trimmed) {
            Ok((rest, length)) if rest.trim().is_empty() => Ok(length),
            _ => Err(CssError::invalid_value("length", trimmed)),
        }
    }
}

/// Parse a floating point or integer number (`4`, `-1.5`, `.5`).
fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

fn parse_unit(input: &str) -> IResult<&str, LengthUnit> {
    alt((
        map(tag("px"), |_| LengthUnit::Px),
        map(tag("rem"), |_| LengthUnit::Rem),
        map(tag("em"), |_| LengthUnit::Em),
        map(char('%'), |_| LengthUnit::Percent),
    ))(input)
}

/// Parse a single length value, allowing leading whitespace.
pub fn parse_length(input: &str) -> IResult<&str, Length> {
    let (input, _) = multispace0(input)?;
    let (input, value) = parse_number(input)?;
    let (input, unit) = opt(parse_unit)(input)?;
    Ok((input, Length::new(value, unit.unwrap_or(LengthUnit::Number))))
}

impl ToCss for Length {
    fn to_css(&self) -> String {
        format!("{}{}", self.value, self.unit.suffix())
    }
}

impl FromCss for Length {
    fn from_css(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(Length::parse("4px").unwrap(), Length::px(4.0));
        assert_eq!(Length::parse("1.25rem").unwrap(), Length::rem(1.25));
        assert_eq!(Length::parse("2em").unwrap(), Length::new(2.0, LengthUnit::Em));
        assert_eq!(Length::parse("50%").unwrap(), Length::percent(50.0));
        assert_eq!(Length::parse("1.4").unwrap(), Length::new(1.4, LengthUnit::Number));
    }

    #[test]
    fn test_parse_signs_and_fractions() {
        assert_eq!(Length::parse("-8px").unwrap(), Length::px(-8.0));
        assert_eq!(Length::parse(".5rem").unwrap(), Length::rem(0.5));
        assert_eq!(Length::parse("  3px  ").unwrap(), Length::px(3.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Length::parse("px").is_err());
        assert!(Length::parse("4pt").is_err());
        assert!(Length::parse("4px 2px").is_err());
    }

    #[test]
    fn test_to_css() {
        assert_eq!(Length::px(4.0).to_css(), "4px");
        assert_eq!(Length::rem(0.875).to_css(), "0.875rem");
        assert_eq!(Length::percent(100.0).to_css(), "100%");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Length::px(4.0).scale(2.0), Length::px(8.0));
        assert_eq!(Length::px(4.0).checked_add(&Length::px(2.0)), Some(Length::px(6.0)));
        assert_eq!(Length::px(4.0).checked_add(&Length::rem(1.0)), None);
    }
}
