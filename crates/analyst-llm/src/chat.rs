//! Language model collaborator trait

use crate::Result;
use async_trait::async_trait;

/// Trait for single-turn language model collaborators
///
/// The pipeline only ever needs plain prompt-in, text-out completions: one
/// call for the older-news summary, one for the final report. Providers
/// with richer surfaces (tool calling, multimodal content) are narrowed to
/// this contract at the seam.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt and return the model's text response
    async fn invoke(&self, prompt: &str) -> Result<String>;

    /// Get the provider/model name (e.g. "openai/gpt-4.1")
    fn name(&self) -> &str;
}
