//! Strip Pipeline
//!
//! Turns a binding layout into a plain layout the resource toolchain accepts:
//! the data block and the wrapper tags are erased, expression attributes are
//! replaced with literal defaults or synthetic tags, and the wrapper's
//! attributes move onto the new root. Line count never changes, so positions
//! reported against the output still point at the source.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::annotate::annotate;
use crate::buffer::LineBuffer;
use crate::options::StripOptions;
use crate::pending::{apply_pending, merge_wrapper_attributes};
use crate::position::Position;
use crate::validate::{
    to_u32, validate_layout, CompilerError, LayoutStructure, ERR_IO, ERR_MALFORMED_XML,
};
use crate::xml::{parse_document, Element};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrippedLayout {
    pub file_path: String,
    pub xml: String,
    /// Binding indices handed out to the content root's hierarchy.
    pub binding_count: usize,
}

/// Strip a layout held in memory. `Ok(None)` means the document is not a
/// binding layout and should be used as is.
pub fn strip_layout(
    source: &str,
    file_path: &str,
    options: &StripOptions,
) -> Result<Option<StrippedLayout>, CompilerError> {
    // Columns of line 1 must agree between the tokenizer and the buffer.
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let document = parse_document(source).map_err(|e| {
        CompilerError::new(
            ERR_MALFORMED_XML,
            &e.message,
            file_path,
            to_u32(e.line),
            to_u32(e.column),
        )
    })?;

    let Some(root) = document.root.as_ref() else {
        tracing::debug!(file = file_path, "no root element, not a binding layout");
        return Ok(None);
    };
    let Some(structure) = validate_layout(root, &options.vocabulary, file_path)? else {
        tracing::debug!(file = file_path, root = %root.name, "not a binding layout");
        return Ok(None);
    };

    let mut buffer = LineBuffer::from_source(source);
    let binding_count = rewrite(&mut buffer, structure, file_path, options)?;

    tracing::debug!(file = file_path, binding_count, "stripped binding layout");
    Ok(Some(StrippedLayout {
        file_path: file_path.to_string(),
        xml: buffer.join(options.line_separator.as_str()),
        binding_count,
    }))
}

/// Read a layout from disk and strip it.
pub fn strip_file(
    path: impl AsRef<Path>,
    options: &StripOptions,
) -> Result<Option<StrippedLayout>, CompilerError> {
    let path = path.as_ref();
    let file_path = path.to_string_lossy();
    let source = fs::read_to_string(path).map_err(|e| {
        CompilerError::new(
            ERR_IO,
            &format!("Failed to read layout: {}", e),
            &file_path,
            0,
            0,
        )
    })?;
    strip_layout(&source, &file_path, options)
}

fn rewrite(
    buffer: &mut LineBuffer,
    structure: LayoutStructure<'_>,
    file_path: &str,
    options: &StripOptions,
) -> Result<usize, CompilerError> {
    if let Some(data) = structure.metadata {
        buffer.replace(
            Position::of_token(&data.start),
            Position::after_token(&data.stop),
            "",
        );
    }

    let annotation = annotate(
        structure.content,
        buffer,
        &options.vocabulary,
        options.new_tag.as_deref(),
    );

    erase_wrapper_tags(buffer, structure.wrapper);

    let mut pending = annotation.pending;
    merge_wrapper_attributes(&mut pending, structure.content, structure.wrapper);
    apply_pending(buffer, pending, file_path)?;

    Ok(annotation.binding_count)
}

fn erase_wrapper_tags(buffer: &mut LineBuffer, wrapper: &Element) {
    if let Some(content) = &wrapper.content_start {
        buffer.replace(
            Position::of_token(&wrapper.start),
            Position::of_token(content),
            "",
        );
    }

    let end = Position::after_token(&wrapper.stop);
    let stop_line = Position::of_token(&wrapper.stop).line;
    if let Some(start) = buffer.rfind_upward(stop_line, "</") {
        buffer.replace(start, end, "");
    }
}
