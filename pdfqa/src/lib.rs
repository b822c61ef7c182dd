//! Grounded question answering over a PDF.
//!
//! This crate provides:
//! - Deterministic recursive chunking with overlap ([`RecursiveChunker`])
//! - Embedding and vector store traits with in-memory and pgvector backends
//! - An ingestion pipeline ([`IngestionPipeline`]) that fills one collection per document
//! - An answer engine ([`AnswerEngine`]) that retrieves the top chunks and
//!   asks a language model to answer only from them
//!
//! # Features
//!
//! | Feature    | Enables |
//! |------------|---------|
//! | `openai`   | [`openai::OpenAIEmbeddingProvider`], [`openai::OpenAIChatModel`] |
//! | `pgvector` | [`pgvector::PgVectorStore`] |
//! | `pdf`      | [`PdfSource`] |
//! | `full`     | all of the above |

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod inmemory;
pub mod ingest;
pub mod llm;
pub mod provision;
pub mod settings;
pub mod source;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{NO_INFORMATION_ANSWER, assemble_context, build_prompt};
pub use document::{Chunk, Metadata, Page, SearchResult};
pub use embedding::EmbeddingProvider;
pub use engine::{Answer, AnswerEngine, AnswerEngineBuilder};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use ingest::{IngestReport, IngestionPipeline, IngestionPipelineBuilder, collection_name_for};
pub use llm::LanguageModel;
pub use provision::{ProvisionOutcome, Provisioner};
pub use settings::{ChatSettings, IngestSettings, OpenAISettings, Settings};
#[cfg(feature = "pdf")]
pub use source::PdfSource;
pub use source::{ConfiguredPath, DocumentSource, ExplicitPath, PathResolver, PromptPath, resolve_path};
pub use vectorstore::VectorStore;
