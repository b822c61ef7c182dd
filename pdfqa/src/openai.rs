//! OpenAI embedding and chat providers over the REST API.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! providers accept an alternate base URL for OpenAI-compatible servers and
//! apply the configured request timeout to every call. Failed calls are not
//! retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;
use crate::settings::{DEFAULT_REQUEST_TIMEOUT, OpenAISettings};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default model for OpenAI embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

const PROVIDER: &str = "OpenAI";

/// Known output sizes of OpenAI embedding models.
fn model_dimensions(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => DEFAULT_DIMENSIONS,
    }
}

fn build_client(timeout: Duration) -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

/// Turn a non-success HTTP response into a readable message.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    format!("API returned {status}: {detail}")
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `base_url` – defaults to [`OPENAI_API_BASE`].
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?.with_model("text-embedding-3-small");
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`), dimensions (1536)
    /// and request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new provider with an explicit request timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = build_client(timeout).map_err(|e| RagError::EmbeddingError {
            provider: PROVIDER.into(),
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a provider from loaded settings and an embedding model name.
    pub fn from_settings(settings: &OpenAISettings, model: &str) -> Result<Self> {
        let provider = Self::with_timeout(settings.api_key.clone(), settings.request_timeout)?
            .with_model(model);
        Ok(match &settings.base_url {
            Some(base_url) => provider.with_base_url(base_url.clone()),
            None => provider,
        })
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    ///
    /// Also updates [`dimensions()`](EmbeddingProvider::dimensions) to the
    /// model's known output size unless an explicit size was requested.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        if self.request_dimensions.is_none() {
            self.dimensions = model_dimensions(&self.model);
        }
        self
    }

    /// Set the output dimensions (Matryoshka support).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn err(message: String) -> RagError {
        RagError::EmbeddingError { provider: PROVIDER.into(), message }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| Self::err("API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                Self::err(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let message = error_detail(response).await;
            error!(provider = PROVIDER, %message, "API error");
            return Err(Self::err(message));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            Self::err(format!("failed to parse response: {e}"))
        })?;

        if embedding_response.data.len() != texts.len() {
            return Err(Self::err(format!(
                "expected {} embeddings, API returned {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`LanguageModel`] backed by the OpenAI chat completions API.
///
/// The prompt is sent as a single user message.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa::openai::OpenAIChatModel;
///
/// let model = OpenAIChatModel::new("sk-...", "gpt-4o-mini")?;
/// let text = model.generate("Say hi", 0.5).await?;
/// ```
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIChatModel {
    /// Create a chat model with the default request timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, model, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a chat model with an explicit request timeout.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Self::err("API key must not be empty".into()));
        }
        let client = build_client(timeout)
            .map_err(|e| Self::err(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_key, base_url: OPENAI_API_BASE.into(), model: model.into() })
    }

    /// Create a chat model from loaded settings and a model name.
    pub fn from_settings(settings: &OpenAISettings, model: &str) -> Result<Self> {
        let chat = Self::with_timeout(settings.api_key.clone(), model, settings.request_timeout)?;
        Ok(match &settings.base_url {
            Some(base_url) => chat.with_base_url(base_url.clone()),
            None => chat,
        })
    }

    /// Point the model at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn err(message: String) -> RagError {
        RagError::GenerationError { provider: PROVIDER.into(), message }
    }
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), temperature, "generating");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                Self::err(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let message = error_detail(response).await;
            error!(provider = PROVIDER, %message, "API error");
            return Err(Self::err(message));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            Self::err(format!("failed to parse response: {e}"))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Self::err("API returned no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("https://example.test/v1/", "embeddings"), "https://example.test/v1/embeddings");
        assert_eq!(endpoint(OPENAI_API_BASE, "chat/completions"), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn model_sets_dimensions_unless_overridden() {
        let provider = OpenAIEmbeddingProvider::new("sk-test").unwrap().with_model("text-embedding-3-large");
        assert_eq!(provider.dimensions(), 3072);

        let provider = OpenAIEmbeddingProvider::new("sk-test")
            .unwrap()
            .with_dimensions(256)
            .with_model("text-embedding-3-large");
        assert_eq!(provider.dimensions(), 256);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(OpenAIEmbeddingProvider::new("").is_err());
        assert!(matches!(
            OpenAIChatModel::new("", "gpt-4o-mini"),
            Err(RagError::GenerationError { .. })
        ));
    }

    #[test]
    fn chat_request_serializes_prompt_as_user_message() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["temperature"], 0.5);
    }
}
