//! Generation capability.

use async_trait::async_trait;

use crate::error::Result;

/// Completes a prompt with generated text.
///
/// The assistant layer builds full prompts (instructions, context, and
/// question already assembled) and only needs the model's text back.
/// Implementations wrap a concrete model API.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
