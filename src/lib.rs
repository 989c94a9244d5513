//! # Binding Layout Stripper
//!
//! Rewrites data-binding layout files into plain layouts that the stock
//! resource toolchain accepts, recording where the runtime has to reattach.
//!
//! ## Output Invariants
//!
//! 1. **Line Count**: the output has exactly as many lines as the input.
//!    Removed markup is blanked with spaces, so line numbers reported by
//!    later tools still point at the source.
//!
//! 2. **Wrapper Removal**: the `<layout>` start and end tags and the `<data>`
//!    block are erased. The wrapper's attributes move onto the content root.
//!
//! 3. **One Tag Per Element**: every element the runtime must locate carries
//!    exactly one synthetic `android:tag`. `<include>` elements are always
//!    tagged; `<merge>` elements never are.
//!
//! 4. **Literal Defaults**: an expression with a constant `default=` clause is
//!    written out as that constant instead of being bound.
//!
//! ## Pipeline
//!
//! `xml` parse → `validate` structure → erase `<data>` → `annotate` tags →
//! erase wrapper tags → `pending` insertions (latest element first) → join.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod annotate;
mod buffer;
mod cache;
mod defaults;
mod discovery;
mod entities;
mod expression;
mod options;
mod pending;
mod position;
mod strip;
mod validate;
mod xml;

#[cfg(test)]
mod annotate_tests;

pub use annotate::{annotate, Annotation, NodeKind};
pub use buffer::LineBuffer;
pub use cache::{strip_layout_cached, CachedStrip, IncrementalCache};
pub use defaults::{default_replacement, DefaultReplacement};
pub use discovery::{find_layout_files, strip_resource_dir, StripReport};
pub use entities::{escape_xml10, unescape_xml};
pub use expression::{
    parse_binding, BindingSyntax, ConstantKind, ConstantValue, ExpressionError, Literal,
    QuoteStyle,
};
pub use options::{LayoutVocabulary, LineSeparator, StripOptions};
pub use pending::PendingTag;
pub use position::Position;
pub use strip::{strip_file, strip_layout, StrippedLayout};
pub use validate::*;
pub use xml::{parse_document, Attribute, Document, Element, Token, XmlError};

#[cfg(feature = "napi")]
pub use discovery::{find_layout_files_native, strip_resource_dir_native};

/// Strip a layout held in memory. Returns `null` for layouts that are not
/// binding layouts.
#[cfg(feature = "napi")]
#[napi]
pub fn strip_layout_native(
    source: String,
    file_path: String,
    options_json: Option<String>,
) -> napi::Result<Option<String>> {
    let options = StripOptions::from_json(options_json.as_deref().unwrap_or(""))
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    strip_layout(&source, &file_path, &options)
        .map(|stripped| stripped.map(|layout| layout.xml))
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}
