//! Default Literal Resolver
//!
//! Decides whether an `@{...}` attribute can be written out as a plain value
//! taken from its `default=` clause instead of being bound at runtime.

use crate::entities::{escape_xml10, unescape_xml};
use crate::expression::{parse_binding, ConstantKind, Literal, QuoteStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReplacement {
    /// The value is not of the `@{...}` form.
    NotExpression,
    /// An expression without a usable `default=` constant.
    NoDefault,
    /// Markup-ready text for the attribute value, without quotes.
    Literal(String),
}

impl DefaultReplacement {
    pub fn literal(&self) -> Option<&str> {
        match self {
            DefaultReplacement::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// Resolve an attribute value as written in the source, quotes included.
pub fn default_replacement(raw_value: &str) -> DefaultReplacement {
    let Some(inner) = strip_quotes(raw_value) else {
        return DefaultReplacement::NotExpression;
    };
    let Some(body) = inner
        .strip_prefix("@{")
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return DefaultReplacement::NotExpression;
    };

    let body = unescape_xml(body);
    let syntax = match parse_binding(&body) {
        Ok(syntax) => syntax,
        Err(e) => {
            tracing::warn!(expression = %body, error = %e, "unparsable binding expression, keeping it bound");
            return DefaultReplacement::NoDefault;
        }
    };

    let Some(constant) = syntax.default else {
        return DefaultReplacement::NoDefault;
    };

    let text = match &constant.kind {
        ConstantKind::Literal(Literal::String { quote, raw }) => {
            let unquoted = strip_quotes(raw).unwrap_or_default();
            match quote {
                QuoteStyle::Double => escape_xml10(unquoted).into_owned(),
                QuoteStyle::Single => {
                    let normalized = unquoted.replace('"', "\\\"").replace("\\`", "`");
                    escape_xml10(&normalized).into_owned()
                }
            }
        }
        _ => constant.text,
    };
    DefaultReplacement::Literal(text)
}

/// Drop the first and last char of a quoted token.
fn strip_quotes(quoted: &str) -> Option<&str> {
    let mut chars = quoted.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    Some(&quoted[first.len_utf8()..quoted.len() - last.len_utf8()])
}
