//! Retrieval-and-grounding engine.
//!
//! [`AnswerEngine`] answers one question at a time: embed → search →
//! assemble context → prompt → generate. It never returns an error for a
//! failed dependency call; failures become [`Answer::Failed`] so an
//! interactive session can keep going.
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfqa::{AnswerEngine, RagConfig};
//!
//! let engine = AnswerEngine::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(embedder)
//!     .vector_store(store)
//!     .language_model(model)
//!     .collection("pdf_manual")
//!     .build()?;
//!
//! if let Some(answer) = engine.answer("Qual o prazo de entrega?").await {
//!     println!("{answer}");
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::RagConfig;
use crate::context::{NO_INFORMATION_ANSWER, assemble_context, build_prompt};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;
use crate::vectorstore::VectorStore;

/// Outcome of answering one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Text produced by the language model from the retrieved context.
    Grounded(String),
    /// Nothing relevant was retrieved.
    NoInformation,
    /// A dependency call failed; the message is meant for the operator.
    Failed(String),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grounded(text) => f.write_str(text),
            Self::NoInformation => f.write_str(NO_INFORMATION_ANSWER),
            Self::Failed(reason) => f.write_str(reason),
        }
    }
}

/// Answers questions from one collection under the grounding contract.
///
/// Holds no mutable state; share it behind an `Arc` to answer questions
/// concurrently.
pub struct AnswerEngine {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    language_model: Arc<dyn LanguageModel>,
    collection: String,
}

impl AnswerEngine {
    /// Create a new [`AnswerEngineBuilder`].
    pub fn builder() -> AnswerEngineBuilder {
        AnswerEngineBuilder::default()
    }

    /// The collection this engine reads from.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Answer a question.
    ///
    /// Returns `None` without touching any dependency when the question is
    /// empty or whitespace.
    pub async fn answer(&self, question: &str) -> Option<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        Some(self.answer_nonempty(question).await)
    }

    async fn answer_nonempty(&self, question: &str) -> Answer {
        let collection = self.collection.as_str();

        let query_embedding = match self.embedding_provider.embed(question).await {
            Ok(embedding) => embedding,
            Err(e) => {
                error!(error = %e, "question embedding failed");
                return Answer::Failed(format!("Erro ao consultar o banco vetorial: {e}"));
            }
        };

        let results =
            match self.vector_store.search(collection, &query_embedding, self.config.top_k).await {
                Ok(results) => results,
                Err(e) => {
                    error!(collection, error = %e, "vector store search failed");
                    return Answer::Failed(format!("Erro ao consultar o banco vetorial: {e}"));
                }
            };

        if results.is_empty() {
            warn!(collection, "no chunks retrieved");
            return Answer::NoInformation;
        }

        let context = assemble_context(&results);
        let prompt = build_prompt(&context, question);

        match self.language_model.generate(&prompt, self.config.temperature).await {
            Ok(text) => {
                info!(
                    collection,
                    retrieved = results.len(),
                    model = self.language_model.name(),
                    "answered question"
                );
                if text.trim() == NO_INFORMATION_ANSWER {
                    Answer::NoInformation
                } else {
                    Answer::Grounded(text)
                }
            }
            Err(e) => {
                error!(model = self.language_model.name(), error = %e, "generation failed");
                Answer::Failed(format!("Erro ao gerar resposta: {e}"))
            }
        }
    }
}

/// Builder for constructing an [`AnswerEngine`].
///
/// Every field except `config` is required. [`build()`](AnswerEngineBuilder::build)
/// reports all missing fields in one error.
#[derive(Default)]
pub struct AnswerEngineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    collection: Option<String>,
}

impl AnswerEngineBuilder {
    /// Set the retrieval/generation configuration. Defaults to [`RagConfig::default`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider. Must match the one used at ingestion.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the language model.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the collection to answer from.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Build the [`AnswerEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingConfiguration`] naming every missing field.
    pub fn build(self) -> Result<AnswerEngine> {
        let mut missing = Vec::new();
        if self.embedding_provider.is_none() {
            missing.push("embedding_provider");
        }
        if self.vector_store.is_none() {
            missing.push("vector_store");
        }
        if self.language_model.is_none() {
            missing.push("language_model");
        }
        let collection = self.collection.filter(|c| !c.trim().is_empty());
        if collection.is_none() {
            missing.push("collection");
        }

        match (self.embedding_provider, self.vector_store, self.language_model, collection) {
            (Some(embedding_provider), Some(vector_store), Some(language_model), Some(collection)) => {
                Ok(AnswerEngine {
                    config: self.config.unwrap_or_default(),
                    embedding_provider,
                    vector_store,
                    language_model,
                    collection,
                })
            }
            _ => Err(RagError::missing(missing)),
        }
    }
}
