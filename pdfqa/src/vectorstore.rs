//! Storage seam for embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// Named collections of embedded [`Chunk`]s with nearest-neighbour lookup.
///
/// Each collection has one vector length, fixed when it is created. Writes
/// or queries with another length fail. Reads from a collection that does
/// not exist return no results rather than an error, so a question asked
/// before ingestion gets the "no information" answer.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("pdf_manual", 1536).await?;
/// store.upsert("pdf_manual", &chunks).await?;
/// let nearest = store.search("pdf_manual", &question_vector, 10).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create `name` for vectors of length `dimensions`. Existing collections
    /// are left as they are.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Drop `name` with everything in it. Missing collections are ignored.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert chunks, replacing any stored chunk with the same id.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Remove the chunks with the given ids.
    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<()>;

    /// Up to `top_k` chunks closest to `embedding`, best match first.
    ///
    /// Returns an empty list when `collection` does not exist.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
