//! Error types for the `pdfqa` crate.

use thiserror::Error;

/// Errors that can occur while ingesting a document or answering a question.
#[derive(Debug, Error)]
pub enum RagError {
    /// One or more required configuration entries are absent.
    ///
    /// Every missing key is reported at once so the operator can fix them
    /// in a single pass.
    #[error("Missing required configuration: {}", keys.join(", "))]
    MissingConfiguration {
        /// Names of the missing entries, in the order they were checked.
        keys: Vec<String>,
    },

    /// A configuration value is present but invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No document could be resolved at the given location.
    #[error("Document not found: {path}")]
    DocumentNotFound {
        /// The path that was tried, or a description of the resolvers tried.
        path: String,
    },

    /// The document was resolved but contains no extractable text.
    #[error("Document has no extractable content: {path}")]
    DocumentEmpty {
        /// The document path.
        path: String,
    },

    /// The document exists but could not be read or parsed.
    #[error("Failed to load document {path}: {message}")]
    DocumentLoad {
        /// The document path.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Writing chunks into a collection failed during ingestion.
    ///
    /// The collection may be partially written; retry with a full replace.
    #[error("Failed to persist vectors into collection '{collection}': {message}")]
    PersistenceError {
        /// The target collection.
        collection: String,
        /// A description of the underlying storage failure.
        message: String,
    },

    /// The language model call failed.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The language model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    /// Build a [`RagError::MissingConfiguration`] from any list of key names.
    pub fn missing<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingConfiguration { keys: keys.into_iter().map(Into::into).collect() }
    }
}

/// A convenience result type for pdfqa operations.
pub type Result<T> = std::result::Result<T, RagError>;
