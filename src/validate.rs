#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::LayoutVocabulary;
use crate::xml::Element;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_MULTIPLE_DATA: &str = "DB-ERR-MULTIPLE-DATA";
pub const ERR_CONTENT_ROOT: &str = "DB-ERR-CONTENT-ROOT";
pub const ERR_MALFORMED_XML: &str = "DB-ERR-MALFORMED-XML";
pub const ERR_IO: &str = "DB-ERR-IO";
pub const ERR_INSERTION_POINT: &str = "DB-ERR-INSERTION-POINT";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_MULTIPLE_DATA => "A binding layout declares its variables in at most one data block.",
        ERR_CONTENT_ROOT => {
            "A binding layout wraps exactly one view hierarchy next to its optional data block."
        }
        ERR_MALFORMED_XML => "Only well-formed layouts reach the strip pass.",
        ERR_IO => "Layout files are read and written as UTF-8 text.",
        ERR_INSERTION_POINT => {
            "Synthetic tags are inserted inside the start tag they belong to."
        }
        _ => "Unknown invariant.",
    }
}

fn get_error_type(code: &str) -> &'static str {
    match code {
        ERR_MULTIPLE_DATA | ERR_CONTENT_ROOT => "LAYOUT_CONFIGURATION_ERROR",
        ERR_MALFORMED_XML => "PARSE_ERROR",
        ERR_IO => "IO_ERROR",
        ERR_INSERTION_POINT => "INTERNAL_INVARIANT_VIOLATION",
        _ => "COMPILER_INVARIANT_VIOLATION",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi(object))]
#[error("[{code}] {message} ({file}:{line}:{column})")]
pub struct CompilerError {
    pub code: String,
    pub error_type: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(code, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        code: &str,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        CompilerError {
            code: code.to_string(),
            error_type: get_error_type(code).to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }

    /// Error located at an element's start tag.
    pub fn at_element(code: &str, message: &str, file: &str, element: &Element) -> Self {
        Self::with_details(
            code,
            message,
            file,
            to_u32(element.start.line),
            to_u32(element.start.column),
            Some(format!("<{}>", element.name)),
            vec![],
        )
    }
}

pub(crate) fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// The three parts of a binding layout: the wrapper root, its optional data
/// block and the single view hierarchy that becomes the new root.
#[derive(Debug, Clone, Copy)]
pub struct LayoutStructure<'a> {
    pub wrapper: &'a Element,
    pub metadata: Option<&'a Element>,
    pub content: &'a Element,
}

/// Locate the parts of a binding layout. `Ok(None)` means the root is not the
/// wrapper tag, so this is a plain layout and nothing should be stripped.
pub fn validate_layout<'a>(
    root: &'a Element,
    vocabulary: &LayoutVocabulary,
    file: &str,
) -> Result<Option<LayoutStructure<'a>>, CompilerError> {
    if root.name != vocabulary.wrapper {
        return Ok(None);
    }

    let (metadata, content): (Vec<&Element>, Vec<&Element>) = root
        .children
        .iter()
        .partition(|child| child.name == vocabulary.metadata);

    if let Some(extra) = metadata.get(1) {
        return Err(CompilerError::with_details(
            ERR_MULTIPLE_DATA,
            &format!(
                "Multiple binding {} tags. Expecting a maximum of one.",
                vocabulary.metadata
            ),
            file,
            to_u32(extra.start.line),
            to_u32(extra.start.column),
            Some(format!("<{}>", extra.name)),
            vec![format!(
                "Merge the <{}> blocks into a single block.",
                vocabulary.metadata
            )],
        ));
    }

    let &[content] = content.as_slice() else {
        return Err(CompilerError::with_details(
            ERR_CONTENT_ROOT,
            &format!(
                "Only one layout element and one {} element are allowed, found {} layout elements",
                vocabulary.metadata,
                content.len()
            ),
            file,
            to_u32(root.start.line),
            to_u32(root.start.column),
            Some(format!("<{}>", root.name)),
            vec![format!(
                "Wrap the views inside <{}> in a single root view group.",
                vocabulary.wrapper
            )],
        ));
    };

    Ok(Some(LayoutStructure {
        wrapper: root,
        metadata: metadata.first().copied(),
        content,
    }))
}
