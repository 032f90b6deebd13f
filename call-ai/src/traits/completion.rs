//! LLM completion provider trait.

use crate::types::completion::CompletionOptions;
use crate::Error;
use async_trait::async_trait;

/// Abstraction over a chat-completion capable LLM.
///
/// The classification pipeline makes three kinds of calls through this
/// trait: transcript summarization, category adjudication (JSON mode), and
/// full call analysis (JSON mode). Implementations must support a
/// constrained JSON response mode; callers assume occasional malformed or
/// empty responses and handle them.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run one completion and return the raw response text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, Error>;

    /// Unique lowercase identifier for this provider (e.g. "openai").
    fn provider_id(&self) -> &str;

    /// Validate credentials with a lightweight test request.
    async fn verify_credentials(&self) -> Result<bool, Error>;
}
