//! Discovery Module
//!
//! Finds layout resources under a `res/` directory and strips them as a
//! batch. Each document is stripped on its own rayon task; nothing is shared
//! between documents except the read-only options and the cache directory.

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cache::{strip_layout_cached, IncrementalCache};
use crate::options::StripOptions;
use crate::strip::strip_layout;
use crate::validate::{CompilerError, ERR_IO};

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StripReport {
    /// Output paths written.
    pub stripped: Vec<String>,
    /// Layouts that are not binding layouts.
    pub skipped: Vec<String>,
    pub errors: Vec<CompilerError>,
}

impl StripReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

enum FileOutcome {
    Stripped(String),
    Skipped(String),
    Failed(CompilerError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYOUT DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Recursively find `*.xml` files inside `layout` / `layout-<qualifier>`
/// directories, sorted by path.
pub fn find_layout_files(res_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(res_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_layout_file(path))
        .collect();
    files.sort();
    files
}

fn is_layout_file(path: &Path) -> bool {
    let is_xml = path.extension().is_some_and(|ext| ext == "xml");
    let in_layout_dir = path
        .parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "layout" || name.starts_with("layout-"));
    is_xml && in_layout_dir
}

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH STRIP
// ═══════════════════════════════════════════════════════════════════════════════

/// Strip every layout under `res_dir`, writing binding layouts to the same
/// relative path under `out_dir`. A failure in one file does not stop the
/// others.
pub fn strip_resource_dir(
    res_dir: &Path,
    out_dir: &Path,
    options: &StripOptions,
    cache: Option<&IncrementalCache>,
) -> StripReport {
    let files = find_layout_files(res_dir);
    tracing::debug!(res_dir = %res_dir.display(), count = files.len(), "discovered layouts");

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| strip_one(file, res_dir, out_dir, options, cache))
        .collect();

    let mut report = StripReport::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Stripped(path) => report.stripped.push(path),
            FileOutcome::Skipped(path) => report.skipped.push(path),
            FileOutcome::Failed(error) => {
                tracing::warn!(file = %error.file, code = %error.code, "{}", error.message);
                report.errors.push(error);
            }
        }
    }
    report
}

fn strip_one(
    file: &Path,
    res_dir: &Path,
    out_dir: &Path,
    options: &StripOptions,
    cache: Option<&IncrementalCache>,
) -> FileOutcome {
    let file_path = file.to_string_lossy().to_string();
    let io_error = |action: &str, e: std::io::Error| {
        FileOutcome::Failed(CompilerError::new(
            ERR_IO,
            &format!("Failed to {}: {}", action, e),
            &file_path,
            0,
            0,
        ))
    };

    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => return io_error("read layout", e),
    };

    let result = match cache {
        Some(cache) => strip_layout_cached(cache, &source, &file_path, options),
        None => strip_layout(&source, &file_path, options),
    };
    let stripped = match result {
        Ok(Some(stripped)) => stripped,
        Ok(None) => return FileOutcome::Skipped(file_path),
        Err(e) => return FileOutcome::Failed(e),
    };

    let relative = file.strip_prefix(res_dir).unwrap_or(file);
    let target = out_dir.join(relative);
    if let Some(parent) = target.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            return io_error("create output directory", e);
        }
    }
    if let Err(e) = fs::write(&target, stripped.xml) {
        return io_error("write stripped layout", e);
    }
    FileOutcome::Stripped(target.to_string_lossy().to_string())
}

#[cfg(feature = "napi")]
#[napi]
pub fn find_layout_files_native(res_dir: String) -> Vec<String> {
    find_layout_files(Path::new(&res_dir))
        .into_iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect()
}

#[cfg(feature = "napi")]
#[napi]
pub fn strip_resource_dir_native(
    res_dir: String,
    out_dir: String,
    options_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let options = StripOptions::from_json(options_json.as_deref().unwrap_or(""))
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let report = strip_resource_dir(Path::new(&res_dir), Path::new(&out_dir), &options, None);
    serde_json::to_value(report).map_err(|e| napi::Error::from_reason(e.to_string()))
}
