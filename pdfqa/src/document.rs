//! Data types for pages, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to pages and chunks.
///
/// Values are JSON scalars (`page` is a number, `source` a string).
pub type Metadata = HashMap<String, Value>;

/// Metadata key holding the 0-based page index.
pub const PAGE_KEY: &str = "page";

/// Metadata key holding the document source (usually the file path).
pub const SOURCE_KEY: &str = "source";

/// One page of a loaded document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// The extracted page text.
    pub text: String,
    /// Page-level metadata, inherited by every chunk cut from this page.
    pub metadata: Metadata,
}

impl Page {
    /// Create a page with the standard `page` and `source` entries.
    pub fn new(text: impl Into<String>, index: usize, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(PAGE_KEY.to_string(), Value::from(index));
        metadata.insert(SOURCE_KEY.to_string(), Value::String(source.into()));
        Self { text: text.into(), metadata }
    }
}

/// A bounded span of page text, optionally carrying its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Identifier, unique within a collection.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until ingestion attaches one.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the originating page, with empty values removed.
    pub metadata: Metadata,
}

impl Chunk {
    /// The `page` entry, if present.
    pub fn page(&self) -> Option<&Value> {
        self.metadata.get(PAGE_KEY).filter(|v| !is_empty_value(v))
    }

    /// The `source` entry as a string, if present and non-empty.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// Remove entries whose value is `null` or an empty string.
pub fn strip_empty(metadata: &Metadata) -> Metadata {
    metadata.iter().filter(|(_, v)| !is_empty_value(v)).map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
