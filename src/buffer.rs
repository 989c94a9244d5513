//! Line Buffer Editor
//!
//! The layout source held as mutable lines. Region edits overwrite in place
//! and pad with spaces so that every position taken from the parse tree stays
//! valid for the edits that come after it. Only `insert` grows a line, and it
//! is reserved for the ordered pass in `pending.rs`.

use crate::position::Position;

/// Split text into lines the way the tokenizer counts them: `\r\n`, `\n` and
/// a lone `\r` each end a line. A trailing terminator does not open an extra
/// empty line.
pub fn split_lines(source: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = source.chars().peekable();
    let mut pending_line = false;

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
                pending_line = false;
            }
            '\n' => {
                lines.push(std::mem::take(&mut current));
                pending_line = false;
            }
            _ => {
                current.push(c);
                pending_line = true;
            }
        }
    }
    if pending_line {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn from_source(source: &str) -> Self {
        Self::new(split_lines(source))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clamp `pos` against the current contents of its line.
    pub fn clamp(&self, pos: &mut Position) {
        if let Some(line) = self.lines.get(pos.line) {
            pos.clamp_to(line);
        }
    }

    /// Replace the region `[start, end)` with `text`.
    ///
    /// Returns `false` when the region is on one line and is shorter than
    /// `text`: the region is blanked but `text` is not written, and the caller
    /// has to place it somewhere else.
    pub fn replace(&mut self, mut start: Position, mut end: Position, text: &str) -> bool {
        self.clamp(&mut start);
        self.clamp(&mut end);
        let text_len = text.chars().count();

        if start.line != end.line {
            if let Some(first) = self.lines.get_mut(start.line) {
                let mut rewritten: String = first.chars().take(start.column).collect();
                rewritten.push_str(text);
                *first = rewritten;
            }
            for index in start.line + 1..end.line {
                if let Some(line) = self.lines.get_mut(index) {
                    let len = line.chars().count();
                    *line = blank_range(line, 0, len);
                }
            }
            if let Some(last) = self.lines.get_mut(end.line) {
                *last = blank_range(last, 0, end.column);
            }
            return true;
        }

        let Some(line) = self.lines.get_mut(start.line) else {
            return false;
        };
        let span = end.column.saturating_sub(start.column);
        if span >= text_len {
            let text_end = start.column + text_len;
            let spliced = splice(line, start.column, text_end, text);
            *line = blank_range(&spliced, text_end, end.column);
            true
        } else {
            *line = blank_range(line, start.column, end.column);
            false
        }
    }

    /// Insert `text` at `at` without consuming anything. Shifts the rest of
    /// the line to the right.
    pub fn insert(&mut self, mut at: Position, text: &str) {
        self.clamp(&mut at);
        if let Some(line) = self.lines.get_mut(at.line) {
            let offset = byte_offset(line, at.column);
            line.insert_str(offset, text);
        }
    }

    /// Scan upward from `from_line` for the last occurrence of `needle` on a
    /// line, returning where it starts.
    pub fn rfind_upward(&self, from_line: usize, needle: &str) -> Option<Position> {
        let top = from_line.min(self.lines.len().checked_sub(1)?);
        (0..=top).rev().find_map(|index| {
            let line = &self.lines[index];
            line.rfind(needle)
                .map(|byte| Position::new(index, line[..byte].chars().count()))
        })
    }

    pub fn join(&self, separator: &str) -> String {
        self.lines.join(separator)
    }
}

fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len())
}

/// `line[..start] + text + line[end..]`, columns in chars.
fn splice(line: &str, start: usize, end: usize, text: &str) -> String {
    let head = byte_offset(line, start);
    let tail = byte_offset(line, end);
    let mut out = String::with_capacity(line.len() + text.len());
    out.push_str(&line[..head]);
    out.push_str(text);
    out.push_str(&line[tail..]);
    out
}

/// Overwrite chars in `[start, end)` with spaces.
fn blank_range(line: &str, start: usize, end: usize) -> String {
    line.chars()
        .enumerate()
        .map(|(i, c)| if i >= start && i < end { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> LineBuffer {
        LineBuffer::from_source(text)
    }

    #[test]
    fn test_split_lines_handles_all_terminators() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_from_source_keeps_every_line() {
        let buf = LineBuffer::from_source("<a>\r\n  <b/>\n</a>");
        assert_eq!(buf.lines(), ["<a>", "  <b/>", "</a>"]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.join("\n"), "<a>\n  <b/>\n</a>");
    }

    #[test]
    fn test_same_line_replace_fits() {
        let mut buf = buffer("<a text=\"@{user.name}\"/>");
        let ok = buf.replace(Position::new(0, 3), Position::new(0, 22), "tag=\"x\"");
        assert!(ok);
        assert_eq!(buf.line(0), Some("<a tag=\"x\"            />"));
        assert_eq!(buf.line(0).unwrap().len(), "<a text=\"@{user.name}\"/>".len());
    }

    #[test]
    fn test_same_line_replace_too_short_blanks_and_reports() {
        let mut buf = buffer("<a t=\"@{a}\"/>");
        let ok = buf.replace(Position::new(0, 3), Position::new(0, 11), "android:tag=\"binding_0\"");
        assert!(!ok);
        assert_eq!(buf.line(0), Some("<a         />"));
    }

    #[test]
    fn test_multi_line_replace_blanks_interior_and_prefix_of_last() {
        let mut buf = buffer("keep<data>\n  <variable/>\n</data>tail");
        let ok = buf.replace(Position::new(0, 4), Position::new(2, 7), "");
        assert!(ok);
        assert_eq!(buf.line(0), Some("keep"));
        assert_eq!(buf.line(1), Some("             "));
        assert_eq!(buf.line(2), Some("       tail"));
    }

    #[test]
    fn test_replace_clamps_stale_columns() {
        let mut buf = buffer("abc");
        let ok = buf.replace(Position::new(0, 1), Position::new(0, 40), "");
        assert!(ok);
        assert_eq!(buf.line(0), Some("a  "));
    }

    #[test]
    fn test_blanking_preserves_char_columns_with_multibyte_text() {
        let mut buf = buffer("<a t=\"é\" b=\"c\"/>");
        buf.replace(Position::new(0, 3), Position::new(0, 8), "");
        assert_eq!(buf.line(0).unwrap().chars().count(), 16);
        assert_eq!(buf.line(0), Some("<a       b=\"c\"/>"));
    }

    #[test]
    fn test_insert_shifts_only_the_tail() {
        let mut buf = buffer("<View/>\n<Other/>");
        buf.insert(Position::new(0, 5), " tag=\"t\"");
        assert_eq!(buf.line(0), Some("<View tag=\"t\"/>"));
        assert_eq!(buf.line(1), Some("<Other/>"));
    }

    #[test]
    fn test_rfind_upward() {
        let buf = buffer("<layout>\n  <a/>\n</layout>\n");
        assert_eq!(buf.rfind_upward(2, "</"), Some(Position::new(2, 0)));
        let buf = buffer("<layout><a/></layout>");
        assert_eq!(buf.rfind_upward(0, "</"), Some(Position::new(0, 12)));
        assert_eq!(buffer("<a/>").rfind_upward(0, "</"), None);
    }
}
