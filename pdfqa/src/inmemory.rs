//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and small single-document collections.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::provision::{ProvisionOutcome, Provisioner};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    chunks: HashMap<String, Chunk>,
}

/// An in-memory vector store using cosine similarity for search.
///
/// Collections are stored as collection name → chunk ID → chunk. Each
/// collection remembers the dimensionality it was created with and rejects
/// vectors of any other length.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("pdf_manual", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks currently stored in a collection, if it exists.
    pub async fn count(&self, collection: &str) -> Option<usize> {
        self.collections.read().await.get(collection).map(|c| c.chunks.len())
    }
}

fn missing_collection(name: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("collection '{name}' does not exist"),
    }
}

fn dimension_mismatch(name: &str, expected: usize, actual: usize) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!(
            "collection '{name}' expects {expected}-dimensional vectors, got {actual}"
        ),
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, chunks: HashMap::new() });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != store.dimensions) {
            return Err(dimension_mismatch(collection, store.dimensions, bad.embedding.len()));
        }
        for chunk in chunks {
            store.chunks.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;
        for id in ids {
            store.chunks.remove(*id);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        // A collection that was never written holds nothing to retrieve.
        let Some(store) = collections.get(collection) else {
            debug!(collection, "search on missing collection");
            return Ok(Vec::new());
        };
        if embedding.len() != store.dimensions {
            return Err(dimension_mismatch(collection, store.dimensions, embedding.len()));
        }

        let mut scored: Vec<SearchResult> = store
            .chunks
            .values()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        // Ties are broken by id so repeated queries return the same order.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[async_trait]
impl Provisioner for InMemoryVectorStore {
    async fn ensure_vector_extension(&self) -> ProvisionOutcome {
        ProvisionOutcome::AlreadyPresent
    }
}
