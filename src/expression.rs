//! Binding Expression Parser
//!
//! Splits the body of an `@{...}` attribute into the expression proper and an
//! optional trailing `, default = <constant>` clause, and classifies that
//! constant. The expression itself is only checked for balanced delimiters
//! and terminated string literals; evaluating it is not this crate's job.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref DEFAULT_CLAUSE_RE: Regex = Regex::new(r"(?s)^\s*default\s*=\s*(.*?)\s*$").unwrap();
    static ref INTEGER_RE: Regex = Regex::new(r"^(0[xX][0-9a-fA-F]+|0[bB][01]+|[0-9]+)[lL]?$").unwrap();
    static ref FLOAT_RE: Regex =
        Regex::new(r"^([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?[fFdD]?$").unwrap();
    static ref RESOURCE_RE: Regex = Regex::new(
        r"^@(\([^)]*\))?([A-Za-z_][A-Za-z0-9_.]*:)?[A-Za-z]+/[A-Za-z_][A-Za-z0-9_.]*$"
    )
    .unwrap();
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYNTAX TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Double,
    /// `'...'` or `` `...` ``
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Literal {
    String { quote: QuoteStyle, raw: String },
    Integer,
    Float,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ConstantKind {
    Literal(Literal),
    ResourceReference,
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantValue {
    pub kind: ConstantKind,
    /// Source text of the constant, quotes included.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingSyntax {
    pub expression: String,
    pub default: Option<ConstantValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("unterminated string literal at offset {0}")]
    UnterminatedString(usize),
    #[error("unbalanced '{0}' at offset {1}")]
    Unbalanced(char, usize),
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse the text between `@{` and `}`.
pub fn parse_binding(body: &str) -> Result<BindingSyntax, ExpressionError> {
    let last_comma = scan_top_level_comma(body)?;

    if let Some(comma) = last_comma {
        if let Some(default) = parse_default_clause(&body[comma + 1..]) {
            return Ok(BindingSyntax {
                expression: body[..comma].trim().to_string(),
                default: Some(default),
            });
        }
    }

    Ok(BindingSyntax {
        expression: body.trim().to_string(),
        default: None,
    })
}

/// Byte offset of the last comma outside strings and brackets.
fn scan_top_level_comma(body: &str) -> Result<Option<usize>, ExpressionError> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut last_comma = None;
    let mut chars = body.char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '"' | '\'' | '`' => skip_string(&mut chars, c, offset)?,
            '(' | '[' | '{' => stack.push((c, offset)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => return Err(ExpressionError::Unbalanced(c, offset)),
                }
            }
            ',' if stack.is_empty() => last_comma = Some(offset),
            _ => {}
        }
    }

    if let Some((open, offset)) = stack.pop() {
        return Err(ExpressionError::Unbalanced(open, offset));
    }
    Ok(last_comma)
}

/// Consume a string literal whose opening quote was already read.
fn skip_string(
    chars: &mut std::str::CharIndices<'_>,
    quote: char,
    start: usize,
) -> Result<(), ExpressionError> {
    while let Some((_, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return Ok(());
        }
    }
    Err(ExpressionError::UnterminatedString(start))
}

fn parse_default_clause(tail: &str) -> Option<ConstantValue> {
    let caps = DEFAULT_CLAUSE_RE.captures(tail)?;
    let text = caps.get(1)?.as_str();
    let kind = classify_constant(text)?;
    Some(ConstantValue {
        kind,
        text: text.to_string(),
    })
}

/// Classify a whole string as a single constant, or `None` if it is not one.
pub fn classify_constant(text: &str) -> Option<ConstantKind> {
    let first = text.chars().next()?;
    if matches!(first, '"' | '\'' | '`') {
        let mut chars = text.char_indices();
        chars.next();
        skip_string(&mut chars, first, 0).ok()?;
        if chars.next().is_some() {
            return None;
        }
        let quote = if first == '"' {
            QuoteStyle::Double
        } else {
            QuoteStyle::Single
        };
        return Some(ConstantKind::Literal(Literal::String {
            quote,
            raw: text.to_string(),
        }));
    }

    let kind = match text {
        "true" | "false" => ConstantKind::Literal(Literal::Boolean),
        "null" => ConstantKind::Literal(Literal::Null),
        _ if INTEGER_RE.is_match(text) => ConstantKind::Literal(Literal::Integer),
        _ if FLOAT_RE.is_match(text) => ConstantKind::Literal(Literal::Float),
        _ if RESOURCE_RE.is_match(text) => ConstantKind::ResourceReference,
        _ if IDENTIFIER_RE.is_match(text) => ConstantKind::Identifier,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_of(body: &str) -> Option<ConstantValue> {
        parse_binding(body).unwrap().default
    }

    #[test]
    fn test_no_default_clause() {
        let syntax = parse_binding("user.name").unwrap();
        assert_eq!(syntax.expression, "user.name");
        assert!(syntax.default.is_none());
    }

    #[test]
    fn test_double_quoted_default() {
        let syntax = parse_binding("user.name, default=\"Bob\"").unwrap();
        assert_eq!(syntax.expression, "user.name");
        let default = syntax.default.unwrap();
        assert_eq!(default.text, "\"Bob\"");
        assert_eq!(
            default.kind,
            ConstantKind::Literal(Literal::String {
                quote: QuoteStyle::Double,
                raw: "\"Bob\"".to_string()
            })
        );
    }

    #[test]
    fn test_single_and_backtick_quoted_defaults() {
        for body in ["a , default = 'x'", "a,default=`x`"] {
            match default_of(body).unwrap().kind {
                ConstantKind::Literal(Literal::String { quote, .. }) => {
                    assert_eq!(quote, QuoteStyle::Single)
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_string_constants() {
        assert_eq!(
            default_of("a, default=12").unwrap().kind,
            ConstantKind::Literal(Literal::Integer)
        );
        assert_eq!(
            default_of("a, default=1.5f").unwrap().kind,
            ConstantKind::Literal(Literal::Float)
        );
        assert_eq!(
            default_of("a, default=false").unwrap().kind,
            ConstantKind::Literal(Literal::Boolean)
        );
        assert_eq!(
            default_of("a, default=null").unwrap().kind,
            ConstantKind::Literal(Literal::Null)
        );
        let resource = default_of("a, default=@string/app_name").unwrap();
        assert_eq!(resource.kind, ConstantKind::ResourceReference);
        assert_eq!(resource.text, "@string/app_name");
        assert_eq!(
            default_of("a, default=@android:color/black").unwrap().kind,
            ConstantKind::ResourceReference
        );
        assert_eq!(
            default_of("a, default=gone").unwrap().kind,
            ConstantKind::Identifier
        );
    }

    #[test]
    fn test_commas_inside_calls_and_strings_are_not_clauses() {
        assert!(default_of("f(a, b)").is_none());
        assert!(default_of("m[\"a, default=1\"]").is_none());
        let syntax = parse_binding("f(a, b), default=3").unwrap();
        assert_eq!(syntax.expression, "f(a, b)");
        assert_eq!(syntax.default.unwrap().text, "3");
    }

    #[test]
    fn test_default_must_be_a_single_constant() {
        assert!(default_of("a, default=b + c").is_none());
        assert!(default_of("a, fallback=3").is_none());
        assert!(default_of("a, default=\"x\" \"y\"").is_none());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_binding("a ? \"x : y").unwrap_err(),
            ExpressionError::UnterminatedString(4)
        );
        assert_eq!(
            parse_binding("f(a]").unwrap_err(),
            ExpressionError::Unbalanced(']', 3)
        );
        assert_eq!(
            parse_binding("f(a").unwrap_err(),
            ExpressionError::Unbalanced('(', 1)
        );
    }
}
