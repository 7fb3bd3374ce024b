//! Language model port: the local model proxy used when no command matches.

use std::future::Future;
use std::sync::Arc;

use relayhub_domain::chat::ChatMessage;

/// Why the model could not produce a reply.
#[derive(Debug, thiserror::Error)]
pub enum LanguageModelError {
    /// The proxy could not be reached at all.
    #[error("language model proxy unreachable: {0}")]
    Unreachable(String),

    /// The proxy answered but the model behind it did not.
    #[error("model not responding: {0}")]
    ModelUnavailable(String),

    #[error("language model request timed out")]
    Timeout,

    #[error("language model error: {0}")]
    Other(String),
}

/// Text generation backend.
pub trait LanguageModel {
    /// Single-turn completion of `prompt`.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send;

    /// Multi-turn completion over a message history, oldest first.
    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send;
}

impl<T: LanguageModel + Send + Sync> LanguageModel for Arc<T> {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        (**self).generate(prompt)
    }

    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        (**self).chat(messages)
    }
}
