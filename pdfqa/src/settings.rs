//! Process-level settings read once from the environment.
//!
//! [`Settings`] captures every recognised key at start-up. The binary then
//! asks for the view it needs ([`Settings::ingest`] or [`Settings::chat`]),
//! which fails with [`RagError::MissingConfiguration`] naming all absent keys
//! together.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RagError, Result};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const OPENAI_EMBEDDING_MODEL: &str = "OPENAI_EMBEDDING_MODEL";
pub const OPENAI_LLM_MODEL: &str = "OPENAI_LLM_MODEL";
pub const PGVECTOR_URL: &str = "PGVECTOR_URL";
pub const PGVECTOR_COLLECTION: &str = "PGVECTOR_COLLECTION";
pub const PDF_PATH: &str = "PDF_PATH";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

/// Timeout applied to every embedding, generation and database call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Raw configuration captured from the environment.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub embedding_model: Option<String>,
    pub llm_model: Option<String>,
    pub database_url: Option<String>,
    pub collection: Option<String>,
    pub pdf_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

/// Credentials and endpoint for the OpenAI-compatible API.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAISettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

/// Everything `pdfqa ingest` needs.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSettings {
    pub openai: OpenAISettings,
    pub embedding_model: String,
    pub database_url: String,
    /// Falls back to a name derived from the PDF when absent.
    pub collection: Option<String>,
    pub pdf_path: Option<PathBuf>,
}

/// Everything `pdfqa chat` needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub openai: OpenAISettings,
    pub embedding_model: String,
    pub llm_model: String,
    pub database_url: String,
    pub collection: String,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `REQUEST_TIMEOUT_SECS` is not a
    /// positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let request_timeout = match get(REQUEST_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(RagError::ConfigError(format!(
                        "{REQUEST_TIMEOUT_SECS} must be a positive number of seconds, got '{raw}'"
                    )));
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            openai_api_key: get(OPENAI_API_KEY),
            openai_base_url: get(OPENAI_BASE_URL),
            embedding_model: get(OPENAI_EMBEDDING_MODEL),
            llm_model: get(OPENAI_LLM_MODEL),
            database_url: get(PGVECTOR_URL).map(|url| normalize_database_url(&url)),
            collection: get(PGVECTOR_COLLECTION),
            pdf_path: get(PDF_PATH).map(PathBuf::from),
            request_timeout,
        })
    }

    /// Validate and extract the ingestion view.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingConfiguration`] listing every absent key.
    pub fn ingest(&self) -> Result<IngestSettings> {
        let mut missing = Vec::new();
        let api_key = require(&self.openai_api_key, OPENAI_API_KEY, &mut missing);
        let database_url = require(&self.database_url, PGVECTOR_URL, &mut missing);
        let embedding_model = require(&self.embedding_model, OPENAI_EMBEDDING_MODEL, &mut missing);

        match (api_key, database_url, embedding_model) {
            (Some(api_key), Some(database_url), Some(embedding_model)) => Ok(IngestSettings {
                openai: self.openai_settings(api_key),
                embedding_model,
                database_url,
                collection: self.collection.clone(),
                pdf_path: self.pdf_path.clone(),
            }),
            _ => Err(RagError::missing(missing)),
        }
    }

    /// Validate and extract the chat view.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingConfiguration`] listing every absent key.
    pub fn chat(&self) -> Result<ChatSettings> {
        let mut missing = Vec::new();
        let api_key = require(&self.openai_api_key, OPENAI_API_KEY, &mut missing);
        let database_url = require(&self.database_url, PGVECTOR_URL, &mut missing);
        let collection = require(&self.collection, PGVECTOR_COLLECTION, &mut missing);
        let embedding_model = require(&self.embedding_model, OPENAI_EMBEDDING_MODEL, &mut missing);
        let llm_model = require(&self.llm_model, OPENAI_LLM_MODEL, &mut missing);

        match (api_key, database_url, collection, embedding_model, llm_model) {
            (
                Some(api_key),
                Some(database_url),
                Some(collection),
                Some(embedding_model),
                Some(llm_model),
            ) => Ok(ChatSettings {
                openai: self.openai_settings(api_key),
                embedding_model,
                llm_model,
                database_url,
                collection,
            }),
            _ => Err(RagError::missing(missing)),
        }
    }

    fn openai_settings(&self, api_key: String) -> OpenAISettings {
        OpenAISettings {
            api_key,
            base_url: self.openai_base_url.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

fn require(value: &Option<String>, key: &str, missing: &mut Vec<String>) -> Option<String> {
    if value.is_none() {
        missing.push(key.to_string());
    }
    value.clone()
}

/// Normalize a Postgres URL for use from the host machine.
///
/// `host.docker.internal` is rewritten to `localhost`, and SQLAlchemy-style
/// driver prefixes (`postgresql+psycopg://`) are reduced to `postgresql://`.
pub fn normalize_database_url(url: &str) -> String {
    let url = url.trim().replace("host.docker.internal", "localhost");
    match url.split_once("://") {
        Some((scheme, rest)) if scheme.starts_with("postgresql+") || scheme.starts_with("postgres+") => {
            format!("postgresql://{rest}")
        }
        _ => url,
    }
}
