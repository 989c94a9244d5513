//! Strip options and the tag vocabulary they carry.

use serde::{Deserialize, Serialize};

/// Line separator used when the edited lines are joined back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineSeparator {
    Lf,
    CrLf,
    #[default]
    Platform,
}

impl LineSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSeparator::Lf => "\n",
            LineSeparator::CrLf => "\r\n",
            LineSeparator::Platform => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
        }
    }
}

/// Tag and attribute names that give a layout its binding structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutVocabulary {
    /// Root element marking a binding layout.
    pub wrapper: String,
    /// Variable/import declarations, removed from the output.
    pub metadata: String,
    /// Children are promoted into the parent; never tagged.
    pub merge: String,
    /// Always tagged so the runtime can find the included layout.
    pub include: String,
    /// Attribute that carries the synthetic tag.
    pub tag_attribute: String,
    /// Prefix of synthetic tag values when no override is given.
    pub default_prefix: String,
}

impl Default for LayoutVocabulary {
    fn default() -> Self {
        LayoutVocabulary {
            wrapper: "layout".to_string(),
            metadata: "data".to_string(),
            merge: "merge".to_string(),
            include: "include".to_string(),
            tag_attribute: "android:tag".to_string(),
            default_prefix: "binding".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StripOptions {
    /// Override prefix for synthetic tags on the content root.
    pub new_tag: Option<String>,
    pub line_separator: LineSeparator,
    pub vocabulary: LayoutVocabulary,
}

impl StripOptions {
    pub fn with_new_tag(new_tag: impl Into<String>) -> Self {
        StripOptions {
            new_tag: Some(new_tag.into()),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}
