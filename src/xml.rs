//! XML Tokenizer and Tree Builder
//!
//! A small pull-style parser that keeps the source position of every token the
//! strip pipeline edits: the `<` that opens an element, each attribute name
//! and quoted value, the first char of element content and the token that
//! closes the element. Lines are 1-based, columns are 0-based char offsets.
//!
//! Only elements are kept in the tree. Character data, references, CDATA,
//! comments and processing instructions are validated for termination and
//! skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// TREE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl Token {
    pub fn new(line: usize, column: usize, text: impl Into<String>) -> Self {
        Token {
            line,
            column,
            text: text.into(),
        }
    }

    /// (line, column) just past the token, following any line breaks inside
    /// the token text.
    pub fn end(&self) -> (usize, usize) {
        let mut line = self.line;
        let mut column = self.column;
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    line += 1;
                    column = 0;
                }
                '\n' => {
                    line += 1;
                    column = 0;
                }
                _ => column += 1,
            }
        }
        (line, column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: Token,
    /// Quoted value exactly as written, entities not decoded.
    pub value: Token,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name.text
    }

    pub fn raw_value(&self) -> &str {
        &self.value.text
    }

    /// `name="value"` with any whitespace around `=` dropped.
    pub fn text(&self) -> String {
        format!("{}={}", self.name.text, self.value.text)
    }

    pub fn start(&self) -> &Token {
        &self.name
    }

    pub fn stop(&self) -> &Token {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    pub name_token: Token,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
    /// The `<` opening the start tag.
    pub start: Token,
    /// `/>` for an empty element, otherwise the `>` of the end tag.
    pub stop: Token,
    /// First char after the start tag's `>`. `None` for `<a/>`.
    pub content_start: Option<Token>,
}

impl Element {
    pub fn is_self_closing(&self) -> bool {
        self.content_start.is_none()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Document {
    pub root: Option<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct XmlError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CURSOR
// ═══════════════════════════════════════════════════════════════════════════════

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Cursor {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        match c {
            '\r' if self.peek() == Some('\n') => self.column += 1,
            '\r' | '\n' => {
                self.line += 1;
                self.column = 0;
            }
            _ => self.column += 1,
        }
        Some(c)
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let before = self.pos;
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.bump();
        }
        self.pos > before
    }

    fn text_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// Consume through the next `terminator`.
    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<(), XmlError> {
        let (line, column) = (self.line, self.column);
        while !self.is_eof() {
            if self.starts_with(terminator) {
                self.advance(terminator.chars().count());
                return Ok(());
            }
            self.bump();
        }
        Err(XmlError {
            message: format!("Unterminated {}", what),
            line,
            column,
        })
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSER
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a document. A document with no element at all parses to
/// `root: None`.
pub fn parse_document(source: &str) -> Result<Document, XmlError> {
    let mut cursor = Cursor::new(source);
    if cursor.peek() == Some('\u{feff}') {
        cursor.pos += 1;
    }

    skip_misc(&mut cursor)?;
    let root = if cursor.peek() == Some('<') && cursor.peek_at(1).is_some_and(is_name_start) {
        Some(parse_element(&mut cursor)?)
    } else {
        None
    };
    skip_misc(&mut cursor)?;

    if !cursor.is_eof() {
        let message = if root.is_some() {
            "Unexpected content after the root element"
        } else {
            "Expected a root element"
        };
        return Err(cursor.error(message));
    }
    Ok(Document { root })
}

/// Whitespace, comments, processing instructions and DOCTYPE outside the root.
fn skip_misc(cursor: &mut Cursor) -> Result<(), XmlError> {
    loop {
        cursor.skip_whitespace();
        if cursor.starts_with("<?") {
            cursor.skip_past("?>", "processing instruction")?;
        } else if cursor.starts_with("<!--") {
            cursor.skip_past("-->", "comment")?;
        } else if cursor.starts_with("<!DOCTYPE") {
            skip_doctype(cursor)?;
        } else {
            return Ok(());
        }
    }
}

fn skip_doctype(cursor: &mut Cursor) -> Result<(), XmlError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let err = cursor.error("Unterminated DOCTYPE");
    while let Some(c) = cursor.bump() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Ok(()),
            _ => {}
        }
    }
    Err(err)
}

fn read_name(cursor: &mut Cursor) -> Result<Token, XmlError> {
    let (line, column, start) = (cursor.line, cursor.column, cursor.pos);
    if !cursor.peek().is_some_and(is_name_start) {
        return Err(cursor.error("Expected a name"));
    }
    while cursor.peek().is_some_and(is_name_char) {
        cursor.bump();
    }
    Ok(Token::new(line, column, cursor.text_from(start)))
}

fn parse_attribute(cursor: &mut Cursor) -> Result<Attribute, XmlError> {
    let name = read_name(cursor)?;
    cursor.skip_whitespace();
    if cursor.peek() != Some('=') {
        return Err(cursor.error(format!("Expected '=' after attribute {}", name.text)));
    }
    cursor.bump();
    cursor.skip_whitespace();

    let quote = match cursor.peek() {
        Some(q @ ('"' | '\'')) => q,
        _ => {
            return Err(cursor.error(format!(
                "Attribute {} value must be quoted",
                name.text
            )))
        }
    };
    let (line, column, start) = (cursor.line, cursor.column, cursor.pos);
    cursor.bump();
    loop {
        match cursor.bump() {
            Some(c) if c == quote => break,
            Some('<') => {
                return Err(XmlError {
                    message: format!("'<' not allowed in value of attribute {}", name.text),
                    line,
                    column,
                })
            }
            Some(_) => {}
            None => {
                return Err(XmlError {
                    message: format!("Unterminated value of attribute {}", name.text),
                    line,
                    column,
                })
            }
        }
    }
    let value = Token::new(line, column, cursor.text_from(start));
    Ok(Attribute { name, value })
}

fn parse_element(cursor: &mut Cursor) -> Result<Element, XmlError> {
    let start = Token::new(cursor.line, cursor.column, "<");
    cursor.bump();
    let name_token = read_name(cursor)?;
    let name = name_token.text.clone();
    let mut attributes = Vec::new();

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some('/') if cursor.peek_at(1) == Some('>') => {
                let stop = Token::new(cursor.line, cursor.column, "/>");
                cursor.advance(2);
                return Ok(Element {
                    name,
                    name_token,
                    attributes,
                    children: Vec::new(),
                    start,
                    stop,
                    content_start: None,
                });
            }
            Some('>') => {
                cursor.bump();
                break;
            }
            Some(c) if is_name_start(c) => attributes.push(parse_attribute(cursor)?),
            Some(c) => return Err(cursor.error(format!("Unexpected '{}' in <{}>", c, name))),
            None => return Err(cursor.error(format!("Unterminated start tag <{}>", name))),
        }
    }

    let content_start = {
        let (line, column, from) = (cursor.line, cursor.column, cursor.pos);
        let to = cursor.chars[from..]
            .iter()
            .position(|&c| c == '<')
            .map_or(cursor.chars.len(), |offset| from + offset);
        Token::new(line, column, cursor.chars[from..to].iter().collect::<String>())
    };

    let mut children = Vec::new();
    loop {
        if cursor.starts_with("</") {
            break;
        } else if cursor.starts_with("<!--") {
            cursor.skip_past("-->", "comment")?;
        } else if cursor.starts_with("<![CDATA[") {
            cursor.skip_past("]]>", "CDATA section")?;
        } else if cursor.starts_with("<?") {
            cursor.skip_past("?>", "processing instruction")?;
        } else if cursor.peek() == Some('<') {
            children.push(parse_element(cursor)?);
        } else if cursor.bump().is_none() {
            return Err(XmlError {
                message: format!("Element <{}> is never closed", name),
                line: start.line,
                column: start.column,
            });
        }
    }

    cursor.advance(2);
    let close = read_name(cursor)?;
    if close.text != name {
        return Err(XmlError {
            message: format!("Expected </{}> but found </{}>", name, close.text),
            line: close.line,
            column: close.column,
        });
    }
    cursor.skip_whitespace();
    if cursor.peek() != Some('>') {
        return Err(cursor.error(format!("Unterminated end tag </{}>", name)));
    }
    let stop = Token::new(cursor.line, cursor.column, ">");
    cursor.bump();

    Ok(Element {
        name,
        name_token,
        attributes,
        children,
        start,
        stop,
        content_start: Some(content_start),
    })
}
