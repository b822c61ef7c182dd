//! Ingestion pipeline: load → chunk → embed → store.
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfqa::{IngestionPipeline, PdfSource, RagConfig, RecursiveChunker};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(store))
//!     .build()?;
//!
//! let report = pipeline.ingest(&PdfSource, Path::new("manual.pdf"), "pdf_manual").await?;
//! println!("{} chunks", report.chunk_count);
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::source::DocumentSource;
use crate::vectorstore::VectorStore;

/// Summary of a successful ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// The collection that was written.
    pub collection: String,
    /// Number of chunks persisted.
    pub chunk_count: usize,
}

/// Identifier of the chunk at `index` within a collection.
///
/// Sequential, so re-ingesting the same document with the same chunking
/// configuration reproduces the same ids.
pub fn chunk_id(index: usize) -> String {
    format!("doc-{index}")
}

/// Longest derived collection name; keeps `rag_<name>` within Postgres'
/// 63-byte identifier limit.
const MAX_COLLECTION_NAME_LEN: usize = 59;

/// Derive a collection name from a document path: `pdf_<stem>`.
///
/// The stem is lowercased and every character outside `[a-z0-9_]` becomes
/// `_`. The result is cut to 59 characters. Returns `None` if the path has
/// no file stem.
pub fn collection_name_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let sanitized = sanitized.trim_matches('_');
    (!sanitized.is_empty()).then(|| {
        let mut name = format!("pdf_{sanitized}");
        name.truncate(MAX_COLLECTION_NAME_LEN);
        name
    })
}

/// Orchestrates populating one collection from one document.
///
/// Construct one via [`IngestionPipeline::builder()`]. Provisioning of the
/// storage backend is not part of the pipeline; run
/// [`Provisioner::ensure_vector_extension`](crate::Provisioner::ensure_vector_extension)
/// once beforehand.
pub struct IngestionPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Load, chunk, embed and store the document at `path` into `collection`.
    ///
    /// With `pre_delete_collection` set, the collection is dropped first so
    /// the result is a full replace. A failed run may leave the collection
    /// partially written.
    ///
    /// # Errors
    ///
    /// - [`RagError::DocumentNotFound`] / [`RagError::DocumentLoad`] from the source
    /// - [`RagError::DocumentEmpty`] if the document yields no text
    /// - [`RagError::EmbeddingError`] if embedding fails or returns vectors of
    ///   differing lengths
    /// - [`RagError::PersistenceError`] if any storage step fails
    pub async fn ingest(
        &self,
        source: &dyn DocumentSource,
        path: &Path,
        collection: &str,
    ) -> Result<IngestReport> {
        let path_str = path.display().to_string();

        // 1. Load pages
        let pages = source.load(path)?;
        info!(path = %path_str, page_count = pages.len(), "loaded document");

        // 2. Chunk
        let mut chunks = self.chunker.chunk(&pages);
        if chunks.is_empty() {
            info!(path = %path_str, "document has no content");
            return Err(RagError::DocumentEmpty { path: path_str });
        }
        info!(path = %path_str, chunk_count = chunks.len(), "chunked document");

        // 3. Assign reproducible ids
        for (index, chunk) in chunks.iter_mut().enumerate() {
            chunk.id = chunk_id(index);
        }

        // 4. Embed
        self.attach_embeddings(&mut chunks).await?;

        // 5. Store
        self.store(collection, &chunks).await?;

        let chunk_count = chunks.len();
        info!(collection, chunk_count, "ingestion complete");

        Ok(IngestReport { collection: collection.to_string(), chunk_count })
    }

    async fn attach_embeddings(&self, chunks: &mut [Chunk]) -> Result<()> {
        for batch in chunks.chunks_mut(self.config.embedding_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(error = %e, "embedding failed during ingestion");
                e
            })?;

            if embeddings.len() != batch.len() {
                return Err(RagError::EmbeddingError {
                    provider: "pipeline".to_string(),
                    message: format!(
                        "expected {} embeddings, provider returned {}",
                        batch.len(),
                        embeddings.len()
                    ),
                });
            }

            for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
                chunk.embedding = embedding;
            }
        }
        Ok(())
    }

    /// Vector size for the collection, taken from the embeddings themselves.
    ///
    /// The provider's advertised size is only a hint: OpenAI-compatible
    /// servers may return another length for the same model name.
    fn stored_dimensions(&self, chunks: &[Chunk]) -> Result<usize> {
        let dimensions = chunks.first().map_or(0, |c| c.embedding.len());
        if dimensions == 0 {
            return Err(RagError::EmbeddingError {
                provider: "pipeline".to_string(),
                message: "provider returned empty embeddings".to_string(),
            });
        }
        if let Some(odd) = chunks.iter().find(|c| c.embedding.len() != dimensions) {
            return Err(RagError::EmbeddingError {
                provider: "pipeline".to_string(),
                message: format!(
                    "chunk '{}' has a {}-dimensional embedding, expected {dimensions}",
                    odd.id,
                    odd.embedding.len()
                ),
            });
        }

        let advertised = self.embedding_provider.dimensions();
        if advertised != dimensions {
            warn!(advertised, actual = dimensions, "embedding size differs from provider default");
        }
        Ok(dimensions)
    }

    async fn store(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let persistence = |e: RagError| {
            error!(collection, error = %e, "failed to persist vectors");
            RagError::PersistenceError { collection: collection.to_string(), message: e.to_string() }
        };

        let dimensions = self.stored_dimensions(chunks)?;
        if self.config.pre_delete_collection {
            self.vector_store.delete_collection(collection).await.map_err(persistence)?;
        }
        self.vector_store.create_collection(collection, dimensions).await.map_err(persistence)?;
        self.vector_store.upsert(collection, chunks).await.map_err(persistence)?;
        Ok(())
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedding_provider` and `vector_store` are required. Without an explicit
/// chunker, a [`RecursiveChunker`] sized from the config is used.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`RagConfig::default`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Override the chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`IngestionPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingConfiguration`] naming every missing field.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config = self.config.unwrap_or_default();
        match (self.embedding_provider, self.vector_store) {
            (Some(embedding_provider), Some(vector_store)) => {
                let chunker = self.chunker.unwrap_or_else(|| {
                    Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
                        as Arc<dyn Chunker>
                });
                Ok(IngestionPipeline { config, embedding_provider, vector_store, chunker })
            }
            (embedding_provider, vector_store) => {
                let mut missing = Vec::new();
                if embedding_provider.is_none() {
                    missing.push("embedding_provider");
                }
                if vector_store.is_none() {
                    missing.push("vector_store");
                }
                Err(RagError::missing(missing))
            }
        }
    }
}
