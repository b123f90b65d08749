//! Custom property declaration parsing.
//!
//! Token values can be configured from CSS text. The accepted input is either
//! a bare list of custom property declarations or one or more `:root` blocks:
//!
//! ```css
//! /* brand palette */
//! :root {
//!     --accent-base: #0178d4;
//!     --design-unit: 4px;
//! }
//! ```
//!
//! ## Processing Steps
//!
//! 1. Block comments (`/* */`) are stripped
//! 2. `:root { ... }` wrappers are unwrapped
//! 3. Each `--name: value;` pair becomes a [`Declaration`]; the trailing
//!    semicolon of the last declaration is optional

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, verify},
    multi::{many0, many1},
    sequence::{delimited, preceded, tuple},
};

use crate::error::{CssError, Result};
use crate::property::custom_property_name;

/// A single `--name: value` pair.
///
/// `name` is stored without the leading `--`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The declaration's property as written in CSS (`--name`).
    pub fn property(&self) -> String {
        custom_property_name(&self.name)
    }
}

/// Parses custom property declarations from CSS text.
pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>> {
    let clean = strip_comments(source);

    let (remaining, declarations) = alt((
        map(many1(parse_root_block), |blocks: Vec<Vec<Declaration>>| {
            blocks.into_iter().flatten().collect()
        }),
        parse_declaration_list,
    ))(clean.as_str())
    .map_err(|e| CssError::InvalidSyntax(e.to_string()))?;

    if !remaining.trim().is_empty() {
        return Err(CssError::InvalidSyntax(format!(
            "Unexpected tokens at end of declarations: {}",
            remaining.trim()
        )));
    }

    Ok(declarations)
}

/// Removes `/* ... */` comments. An unterminated comment runs to the end.
pub fn strip_comments(source: &str) -> String {
    let mut clean = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            while let Some(inner) = chars.next() {
                if inner == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    break;
                }
            }
            continue;
        }
        clean.push(c);
    }
    clean
}

/// Parses `:root { ... }`.
fn parse_root_block(input: &str) -> IResult<&str, Vec<Declaration>> {
    delimited(
        tuple((multispace0, tag(":root"), multispace0, char('{'))),
        parse_declaration_list,
        preceded(multispace0, char('}')),
    )(input)
}

fn parse_declaration_list(input: &str) -> IResult<&str, Vec<Declaration>> {
    many0(parse_declaration)(input)
}

/// Parses `--name` and returns `name`.
fn parse_property_name(input: &str) -> IResult<&str, &str> {
    preceded(
        tag("--"),
        take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_'),
    )(input)
}

/// Everything up to `;` or `}`, trimmed. Must not be empty.
fn parse_value(input: &str) -> IResult<&str, &str> {
    verify(
        map(take_till1(|c: char| c == ';' || c == '}'), str::trim),
        |value: &str| !value.is_empty(),
    )(input)
}

fn parse_declaration(input: &str) -> IResult<&str, Declaration> {
    let (input, _) = multispace0(input)?;
    let (input, name) = parse_property_name(input)?;
    let (input, _) = tuple((multispace0, char(':'), multispace0))(input)?;
    let (input, value) = parse_value(input)?;
    let (input, _) = opt(preceded(multispace0, char(';')))(input)?;
    Ok((input, Declaration::new(name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_declarations() {
        let declarations = parse_declarations("--gap: 4px; --accent: #0178d4;").unwrap();
        assert_eq!(
            declarations,
            vec![
                Declaration::new("gap", "4px"),
                Declaration::new("accent", "#0178d4"),
            ]
        );
    }

    #[test]
    fn test_last_semicolon_optional() {
        let declarations = parse_declarations("--a: 1px;\n--b: 2px").unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1], Declaration::new("b", "2px"));
    }

    #[test]
    fn test_function_values_keep_commas() {
        let declarations = parse_declarations("--shadow: rgba(0, 0, 0, 0.5);").unwrap();
        assert_eq!(declarations[0].value, "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn test_root_blocks() {
        let source = r#"
            :root {
                --accent: red;
            }
            :root { --gap: 2px }
        "#;
        let declarations = parse_declarations(source).unwrap();
        assert_eq!(
            declarations,
            vec![Declaration::new("accent", "red"), Declaration::new("gap", "2px")]
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = "/* spacing */ --gap: 4px; /* --hidden: 1px; */";
        let declarations = parse_declarations(source).unwrap();
        assert_eq!(declarations, vec![Declaration::new("gap", "4px")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_declarations("").unwrap().is_empty());
        assert!(parse_declarations("  /* nothing */  ").unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(parse_declarations("--accent: ;").is_err());
        assert!(parse_declarations("color: red;").is_err());
        assert!(parse_declarations(":root { --a: 1px;").is_err());
        assert!(parse_declarations("--a 1px;").is_err());
    }

    #[test]
    fn test_property() {
        assert_eq!(Declaration::new("gap", "4px").property(), "--gap");
    }
}
