//! Tuning parameters for chunking, retrieval and generation.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters shared by ingestion and question answering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of nearest chunks retrieved for each question.
    pub top_k: usize,
    /// Sampling temperature passed to the language model.
    pub temperature: f32,
    /// Maximum number of chunk texts sent to the embedder per request.
    pub embedding_batch_size: usize,
    /// Drop the target collection before writing (full replace instead of merge).
    pub pre_delete_collection: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
            top_k: 10,
            temperature: 0.5,
            embedding_batch_size: 64,
            pre_delete_collection: true,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the language model sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set how many chunks are embedded per request.
    pub fn embedding_batch_size(mut self, size: usize) -> Self {
        self.config.embedding_batch_size = size;
        self
    }

    /// Choose between full replace (`true`) and merge (`false`) on ingestion.
    pub fn pre_delete_collection(mut self, pre_delete: bool) -> Self {
        self.config.pre_delete_collection = pre_delete;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `embedding_batch_size == 0`
    /// - `temperature` is outside `0.0..=2.0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.embedding_batch_size == 0 {
            return Err(RagError::ConfigError(
                "embedding_batch_size must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(RagError::ConfigError(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                self.config.temperature
            )));
        }
        Ok(self.config)
    }
}
