//! Deferred Insertion Scheduler
//!
//! Tags that could not be written over an existing attribute are inserted
//! just before the end of their element's start tag. Insertions run from the
//! last element start to the first: an insertion only shifts columns to its
//! right on the same line, which never holds an earlier element's start tag
//! end that is still waiting.

use crate::buffer::LineBuffer;
use crate::position::Position;
use crate::validate::{CompilerError, ERR_INSERTION_POINT};
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTag<'a> {
    /// Attribute text to insert, without the leading space.
    pub text: String,
    pub element: &'a Element,
}

impl<'a> PendingTag<'a> {
    pub fn new(text: impl Into<String>, element: &'a Element) -> Self {
        PendingTag {
            text: text.into(),
            element,
        }
    }
}

/// Move the wrapper's own attributes (namespace declarations, mostly) onto
/// the content root, which becomes the document root.
pub fn merge_wrapper_attributes<'a>(
    pending: &mut Vec<PendingTag<'a>>,
    content: &'a Element,
    wrapper: &Element,
) {
    let hoisted: String = wrapper
        .attributes
        .iter()
        .map(|attribute| format!(" {}", attribute.text()))
        .collect();

    match pending
        .iter_mut()
        .find(|entry| std::ptr::eq(entry.element, content))
    {
        Some(entry) => entry.text.push_str(&hoisted),
        None => pending.push(PendingTag::new(hoisted, content)),
    }
}

/// Where text is inserted to land inside `element`'s start tag: on the `/`
/// of `/>`, or on the `>` that precedes the element content.
pub fn insertion_point(element: &Element, file: &str) -> Result<Position, CompilerError> {
    let (mut position, step_back) = match &element.content_start {
        None => (Position::after_token(&element.stop), 2),
        Some(content) => (Position::of_token(content), 1),
    };
    if position.column == 0 {
        return Err(CompilerError::at_element(
            ERR_INSERTION_POINT,
            &format!("Cannot place a tag inside <{}>: start tag ends at column 0", element.name),
            file,
            element,
        ));
    }
    position.column = position.column.checked_sub(step_back).ok_or_else(|| {
        CompilerError::at_element(
            ERR_INSERTION_POINT,
            &format!("Cannot place a tag inside <{}>: start tag end is out of range", element.name),
            file,
            element,
        )
    })?;
    Ok(position)
}

/// Insert every pending tag, latest element first.
pub fn apply_pending(
    buffer: &mut LineBuffer,
    mut pending: Vec<PendingTag<'_>>,
    file: &str,
) -> Result<(), CompilerError> {
    pending.sort_by(|a, b| {
        Position::of_token(&b.element.start).cmp(&Position::of_token(&a.element.start))
    });

    for entry in &pending {
        let mut at = insertion_point(entry.element, file)?;
        buffer.clamp(&mut at);
        buffer.insert(at, &format!(" {}", entry.text));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    #[test]
    fn test_insertion_points() {
        let root = parse_document("<a x=\"1\">\n  <b/>\n</a>").unwrap().root.unwrap();
        assert_eq!(insertion_point(&root, "t.xml").unwrap(), Position::new(0, 8));
        assert_eq!(
            insertion_point(&root.children[0], "t.xml").unwrap(),
            Position::new(1, 4)
        );
    }

    #[test]
    fn test_descending_order_keeps_parse_coordinates_valid() {
        let source = "<a>\n\n\n  <b>\n\n    <c/></b></a>";
        let root = parse_document(source).unwrap().root.unwrap();
        let b = &root.children[0];
        let c = &b.children[0];

        // Scheduled in walk order: b (line 4) before c (line 6).
        let mut buffer = LineBuffer::from_source(source);
        apply_pending(
            &mut buffer,
            vec![PendingTag::new("t=\"b\"", b), PendingTag::new("t=\"c\"", c)],
            "t.xml",
        )
        .unwrap();

        let mut expected = LineBuffer::from_source(source);
        let at_c = insertion_point(c, "t.xml").unwrap();
        let at_b = insertion_point(b, "t.xml").unwrap();
        expected.insert(at_c, " t=\"c\"");
        expected.insert(at_b, " t=\"b\"");

        assert_eq!(buffer, expected);
        assert_eq!(buffer.line(3), Some("  <b t=\"b\">"));
        assert_eq!(buffer.line(5), Some("    <c t=\"c\"/></b></a>"));
    }

    #[test]
    fn test_same_line_insertions_do_not_disturb_each_other() {
        let source = "<a><b/><c/></a>";
        let root = parse_document(source).unwrap().root.unwrap();
        let mut buffer = LineBuffer::from_source(source);
        apply_pending(
            &mut buffer,
            vec![
                PendingTag::new("x=\"a\"", &root),
                PendingTag::new("x=\"b\"", &root.children[0]),
                PendingTag::new("x=\"c\"", &root.children[1]),
            ],
            "t.xml",
        )
        .unwrap();
        assert_eq!(buffer.line(0), Some("<a x=\"a\"><b x=\"b\"/><c x=\"c\"/></a>"));
    }

    #[test]
    fn test_merge_wrapper_attributes() {
        let root = parse_document("<layout xmlns:a=\"u\" b='2'><V/></layout>")
            .unwrap()
            .root
            .unwrap();
        let content = &root.children[0];

        let mut pending = Vec::new();
        merge_wrapper_attributes(&mut pending, content, &root);
        assert_eq!(pending, vec![PendingTag::new(" xmlns:a=\"u\" b='2'", content)]);

        let mut pending = vec![PendingTag::new("t=\"x\"", content)];
        merge_wrapper_attributes(&mut pending, content, &root);
        assert_eq!(pending[0].text, "t=\"x\" xmlns:a=\"u\" b='2'");
    }
}
