//! Language model trait used for answer generation.

use async_trait::async_trait;

use crate::error::Result;

/// A text-in, text-out language model.
///
/// The engine treats generation as a function from prompt to text; real
/// backends are non-deterministic even at a fixed temperature.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider/model name used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` at the given sampling temperature.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}
