//! Tag Annotation Walker
//!
//! Walks the content root and rewrites expression attributes in the line
//! buffer. Every element that the runtime must find gets exactly one synthetic
//! tag attribute. The tag is written over the first expression attribute
//! that has room for it; when none has room it is handed to `pending.rs` for
//! insertion after the walk.

use crate::buffer::LineBuffer;
use crate::defaults::{default_replacement, DefaultReplacement};
use crate::options::LayoutVocabulary;
use crate::pending::PendingTag;
use crate::position::Position;
use crate::xml::{Attribute, Element};

/// Role of an element, decided once from its tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Wrapper,
    Metadata,
    Merge,
    Include,
    View,
}

impl NodeKind {
    pub fn classify(name: &str, vocabulary: &LayoutVocabulary) -> Self {
        if name == vocabulary.wrapper {
            NodeKind::Wrapper
        } else if name == vocabulary.metadata {
            NodeKind::Metadata
        } else if name == vocabulary.merge {
            NodeKind::Merge
        } else if name == vocabulary.include {
            NodeKind::Include
        } else {
            NodeKind::View
        }
    }
}

/// Attributes bound at runtime: `@{...}` values in either quote style, and
/// any existing synthetic tag attribute, which the generated tag replaces.
pub fn is_expression_attribute(attribute: &Attribute, vocabulary: &LayoutVocabulary) -> bool {
    let value = attribute.raw_value();
    attribute.name() == vocabulary.tag_attribute
        || (value.starts_with("\"@{") && value.ends_with("}\""))
        || (value.starts_with("'@{") && value.ends_with("}'"))
}

pub fn expression_attributes<'a>(
    element: &'a Element,
    vocabulary: &LayoutVocabulary,
) -> Vec<&'a Attribute> {
    element
        .attributes
        .iter()
        .filter(|a| is_expression_attribute(a, vocabulary))
        .collect()
}

/// A lone tag attribute is not a binding by itself.
fn has_bindings(expressions: &[&Attribute], vocabulary: &LayoutVocabulary) -> bool {
    match expressions {
        [] => false,
        [only] => only.name() != vocabulary.tag_attribute,
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation<'a> {
    /// First binding index not handed out.
    pub binding_count: usize,
    /// Tags that still need to be inserted, in walk order.
    pub pending: Vec<PendingTag<'a>>,
}

/// Annotate `root` and its descendants. `new_tag` overrides the synthetic tag
/// prefix for the root, or for the direct children of a root merge.
pub fn annotate<'a>(
    root: &'a Element,
    buffer: &mut LineBuffer,
    vocabulary: &LayoutVocabulary,
    new_tag: Option<&str>,
) -> Annotation<'a> {
    let mut walker = Walker {
        buffer,
        vocabulary,
        pending: Vec::new(),
    };
    let binding_count = walker.visit(root, 0, new_tag, 0);
    Annotation {
        binding_count,
        pending: walker.pending,
    }
}

struct Walker<'a, 'b> {
    buffer: &'b mut LineBuffer,
    vocabulary: &'b LayoutVocabulary,
    pending: Vec<PendingTag<'a>>,
}

impl<'a, 'b> Walker<'a, 'b> {
    fn visit(
        &mut self,
        node: &'a Element,
        binding_index: usize,
        new_tag: Option<&str>,
        depth: usize,
    ) -> usize {
        let kind = NodeKind::classify(&node.name, self.vocabulary);
        let expressions = expression_attributes(node, self.vocabulary);
        let mut next_index = binding_index;

        let needs_tag = match kind {
            NodeKind::Merge => false,
            NodeKind::Include => true,
            _ => {
                new_tag.is_some()
                    || has_bindings(&expressions, self.vocabulary)
                    || node.children.iter().any(|child| {
                        NodeKind::classify(&child.name, self.vocabulary) == NodeKind::Include
                    })
            }
        };

        if needs_tag {
            // Each emitted name takes its own index, includes too.
            let prefix = new_tag.unwrap_or(&self.vocabulary.default_prefix);
            let tag = self.tag_text(prefix, binding_index);
            next_index += 1;
            self.rewrite_attributes(node, &expressions, tag);
        }

        let child_tag = if depth == 0 && kind == NodeKind::Merge {
            new_tag
        } else {
            None
        };
        for child in &node.children {
            next_index = self.visit(child, next_index, child_tag, depth + 1);
        }
        next_index
    }

    fn tag_text(&self, prefix: &str, index: usize) -> String {
        format!("{}=\"{}_{}\"", self.vocabulary.tag_attribute, prefix, index)
    }

    fn rewrite_attributes(&mut self, node: &'a Element, expressions: &[&Attribute], tag: String) {
        let mut tag = Some(tag);
        let mut overflow = Vec::new();

        for attribute in expressions {
            let start = Position::of_token(attribute.start());
            let end = Position::after_token(attribute.stop());
            match default_replacement(attribute.raw_value()) {
                DefaultReplacement::Literal(value) => {
                    let text = format!("{}=\"{}\"", attribute.name(), value);
                    if !self.buffer.replace(start, end, &text) {
                        overflow.push(text);
                    }
                }
                DefaultReplacement::NoDefault | DefaultReplacement::NotExpression => {
                    let text = tag.as_deref().unwrap_or("");
                    if self.buffer.replace(start, end, text) {
                        if let Some(placed) = tag.take() {
                            tracing::debug!(element = %node.name, line = node.start.line, tag = %placed, "tag written in place");
                        }
                    }
                }
            }
        }

        let deferred: Vec<String> = tag.into_iter().chain(overflow).collect();
        if !deferred.is_empty() {
            let text = deferred.join(" ");
            tracing::debug!(element = %node.name, line = node.start.line, tag = %text, "tag deferred");
            self.pending.push(PendingTag::new(text, node));
        }
    }
}
