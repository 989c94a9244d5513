//! XML Entity Handling
//!
//! Decoding of the five predefined entities and character references, and
//! XML 1.0 escaping for literal defaults written back into attribute values.
//!
//! Uses Cow so inputs without anything to change are returned borrowed.

use std::borrow::Cow;

/// Decode entity and character references. Unknown or unterminated
/// references are kept as written.
pub fn unescape_xml(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                result.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let hex = numeric
                .strip_prefix('x')
                .or_else(|| numeric.strip_prefix('X'));
            let code = match hex {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Escape text for an XML 1.0 attribute value.
pub fn escape_xml10(input: &str) -> Cow<'_, str> {
    if !input.chars().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            '\u{7f}'..='\u{84}' | '\u{86}'..='\u{9f}' => {
                result.push_str(&format!("&#{};", c as u32));
            }
            c if is_invalid_xml10(c) => {}
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

fn is_invalid_xml10(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '&' | '<' | '>' | '"' | '\'' | '\u{7f}'..='\u{84}' | '\u{86}'..='\u{9f}'
    ) || is_invalid_xml10(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_named_and_numeric() {
        assert_eq!(
            unescape_xml("a &lt; b &amp;&amp; c &gt; &quot;d&quot; &apos;"),
            "a < b && c > \"d\" '"
        );
        assert_eq!(unescape_xml("&#65;&#x42;&#X43;"), "ABC");
    }

    #[test]
    fn test_unescape_keeps_unknown_references() {
        assert_eq!(unescape_xml("&nbsp; & &amp"), "&nbsp; & &amp");
        assert!(matches!(unescape_xml("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_xml10() {
        assert_eq!(escape_xml10("Tom & \"Jerry\" <3 'x'"), "Tom &amp; &quot;Jerry&quot; &lt;3 &apos;x&apos;");
        assert_eq!(escape_xml10("a\u{1}b\u{7f}c"), "ab&#127;c");
        assert_eq!(escape_xml10("tab\there\n"), "tab\there\n");
        assert!(matches!(escape_xml10("Bob"), Cow::Borrowed(_)));
    }
}
