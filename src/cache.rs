//! Incremental output cache: one JSON entry per layout path, keyed by a
//! hash of the source and the options that shape the output.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::options::StripOptions;
use crate::strip::{strip_layout, StrippedLayout};
use crate::validate::CompilerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CachedStrip {
    Stripped {
        xml: String,
        #[serde(rename = "bindingCount")]
        binding_count: usize,
    },
    NotBindingLayout,
}

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub result: CachedStrip,
}

pub struct IncrementalCache {
    cache_dir: PathBuf,
}

impl IncrementalCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            if let Err(e) = fs::create_dir_all(&cache_dir) {
                tracing::warn!(dir = %cache_dir.display(), error = %e, "cannot create cache directory");
            }
        }
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn compute_hash(source: &str, options: &StripOptions) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0]);
        hasher.update(options.new_tag.as_deref().unwrap_or("").as_bytes());
        hasher.update([0]);
        hasher.update(options.line_separator.as_str().as_bytes());
        if let Ok(vocabulary) = serde_json::to_string(&options.vocabulary) {
            hasher.update([0]);
            hasher.update(vocabulary.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    fn get_cache_path(&self, file_path: &str) -> PathBuf {
        let safe_name = file_path.replace(['/', '\\', ':'], "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(&self, file_path: &str, source: &str, options: &StripOptions) -> Option<CachedStrip> {
        let cache_path = self.get_cache_path(file_path);
        let data = fs::read_to_string(&cache_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(file = file_path, error = %e, "corrupt cache entry, discarding");
                fs::remove_file(&cache_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(source, options) {
            Some(entry.result)
        } else {
            None
        }
    }

    pub fn set(&self, file_path: &str, source: &str, options: &StripOptions, result: CachedStrip) {
        let cache_path = self.get_cache_path(file_path);
        let entry = CacheEntry {
            hash: Self::compute_hash(source, options),
            result,
        };

        match serde_json::to_string(&entry) {
            Ok(data) => {
                if let Err(e) = fs::write(&cache_path, data) {
                    tracing::warn!(file = file_path, error = %e, "cannot write cache entry");
                }
            }
            Err(e) => tracing::warn!(file = file_path, error = %e, "cannot serialize cache entry"),
        }
    }
}

/// `strip_layout` with a cache in front of it. Failures are not cached.
pub fn strip_layout_cached(
    cache: &IncrementalCache,
    source: &str,
    file_path: &str,
    options: &StripOptions,
) -> Result<Option<StrippedLayout>, CompilerError> {
    if let Some(hit) = cache.get(file_path, source, options) {
        tracing::debug!(file = file_path, "cache hit");
        return Ok(match hit {
            CachedStrip::Stripped { xml, binding_count } => Some(StrippedLayout {
                file_path: file_path.to_string(),
                xml,
                binding_count,
            }),
            CachedStrip::NotBindingLayout => None,
        });
    }

    let stripped = strip_layout(source, file_path, options)?;
    let result = match &stripped {
        Some(layout) => CachedStrip::Stripped {
            xml: layout.xml.clone(),
            binding_count: layout.binding_count,
        },
        None => CachedStrip::NotBindingLayout,
    };
    cache.set(file_path, source, options, result);
    Ok(stripped)
}
