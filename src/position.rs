//! Position Model
//!
//! Zero-based (line, column) coordinates into the line buffer. Columns count
//! chars, matching the tokenizer in `xml.rs`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::xml::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Start of a token. Token lines are 1-based.
    pub fn of_token(token: &Token) -> Self {
        Self::new(token.line.saturating_sub(1), token.column)
    }

    /// Position just past the last char of a token.
    pub fn after_token(token: &Token) -> Self {
        let (line, column) = token.end();
        Self::new(line.saturating_sub(1), column)
    }

    /// Pull the column back to the end of `line` if an earlier edit shortened it.
    pub fn clamp_to(&mut self, line: &str) {
        let len = line.chars().count();
        if self.column > len {
            self.column = len;
        }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
