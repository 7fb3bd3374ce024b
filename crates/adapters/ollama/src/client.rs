use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use relayhub_app::ports::{LanguageModel, LanguageModelError};
use relayhub_domain::chat::ChatMessage;

pub const DEFAULT_MODEL: &str = "phi3:latest";

/// Proxy location and request limits.
#[derive(Debug, Clone)]
pub struct Config {
    /// Proxy root, e.g. `http://localhost:5001`.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Config {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageModelError::Other`] if the HTTP client cannot be
    /// initialised.
    pub fn build(self) -> Result<OllamaClient, LanguageModelError> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| LanguageModelError::Other(err.to_string()))?;
        Ok(OllamaClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self.model,
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ModelResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
}

/// [`LanguageModel`] backed by the proxy.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, LanguageModelError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| classify_transport(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let err = classify_status(status.as_u16(), body.error.as_deref());
            tracing::warn!(%url, status = status.as_u16(), error = %err, "model proxy request failed");
            return Err(err);
        }

        let reply: ModelResponse = response
            .json()
            .await
            .map_err(|err| classify_transport(&err))?;
        Ok(reply.response)
    }
}

impl LanguageModel for OllamaClient {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        let client = self.clone();
        let prompt = prompt.to_string();
        async move {
            let body = GenerateRequest {
                model: &client.model,
                prompt: &prompt,
            };
            client.post("/ollama", &body).await
        }
    }

    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        let client = self.clone();
        let messages = messages.to_vec();
        async move {
            let body = ChatRequest {
                model: &client.model,
                messages: &messages,
            };
            client.post("/ollama/chat", &body).await
        }
    }
}

fn classify_transport(err: &reqwest::Error) -> LanguageModelError {
    if err.is_timeout() {
        LanguageModelError::Timeout
    } else if err.is_connect() {
        LanguageModelError::Unreachable(err.to_string())
    } else {
        LanguageModelError::Other(err.to_string())
    }
}

/// Classify a non-success answer from the proxy by its status and error text.
fn classify_status(status: u16, message: Option<&str>) -> LanguageModelError {
    let message = message.map_or_else(|| format!("HTTP {status}"), str::to_string);
    let lowered = message.to_lowercase();
    if lowered.contains("timeout") || lowered.contains("timed out") || status == 504 {
        LanguageModelError::Timeout
    } else if lowered.contains("ollama") || matches!(status, 502 | 503) {
        LanguageModelError::ModelUnavailable(message)
    } else {
        LanguageModelError::Other(message)
    }
}
