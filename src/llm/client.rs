// LLM provider client
// One outbound call per chat request. Gemini replies are already in the
// widget envelope and pass through verbatim; OpenRouter replies are
// re-wrapped into it.

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm::translate::{to_chat_completion_messages, wrap_reply};
use crate::models::{ChatCompletionResponse, ChatRequest};

/// Default Gemini API base URL
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
/// Default OpenRouter API base URL
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai";

/// Gemini model serving widget chat
const GEMINI_MODEL: &str = "gemini-2.0-flash";
/// OpenRouter model serving widget chat
const OPENROUTER_MODEL: &str = "meta-llama/llama-3.3-70b-instruct";

/// Sampling temperature, not caller-configurable
const TEMPERATURE: f64 = 0.85;
/// Reply length cap, not caller-configurable
const MAX_OUTPUT_TOKENS: u32 = 400;

/// Which upstream LLM API the proxy forwards to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenRouter,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenRouter => "openrouter",
        }
    }
}

/// Failure of a provider call, split by who is at fault
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider answered with a non-success status
    #[error("provider returned {status}: {detail}")]
    Upstream {
        status: reqwest::StatusCode,
        detail: String,
    },
    /// Provider could not be reached
    #[error("failed to reach provider: {0}")]
    Transport(#[from] reqwest::Error),
    /// Provider answered 2xx with a body that cannot be interpreted
    #[error("unusable provider reply: {0}")]
    InvalidReply(String),
}

/// Client for one configured LLM provider
pub struct LlmClient {
    client: Client,
    provider: LlmProvider,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// Client for the Gemini generateContent API
    pub fn gemini(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            provider: LlmProvider::Gemini,
            api_key,
            base_url,
        }
    }

    /// Client for the OpenRouter chat-completions API
    pub fn openrouter(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            provider: LlmProvider::OpenRouter,
            api_key,
            base_url,
        }
    }

    /// Send one chat exchange and return the Gemini-shaped reply envelope.
    /// No retries; the first failure is the final answer.
    pub async fn generate(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        match self.provider {
            LlmProvider::Gemini => self.generate_gemini(request).await,
            LlmProvider::OpenRouter => self.generate_openrouter(request).await,
        }
    }

    async fn generate_gemini(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );
        let payload = json!({
            "systemInstruction": request.system_instruction,
            "contents": request.messages,
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream { status, detail });
        }

        // Already the widget envelope; forward untouched so provider fields survive
        response
            .json::<Value>()
            .await
            .map_err(|e| LlmError::InvalidReply(e.to_string()))
    }

    async fn generate_openrouter(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let messages =
            to_chat_completion_messages(&request.system_instruction, &request.messages);
        let url = format!("{}/api/v1/chat/completions", self.base_url);
        let payload = json!({
            "model": OPENROUTER_MODEL,
            "messages": messages,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_OUTPUT_TOKENS,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream { status, detail });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidReply(e.to_string()))?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidReply("reply contained no choices".to_string()))?;

        let envelope = wrap_reply(choice.message.content);
        serde_json::to_value(envelope).map_err(|e| LlmError::InvalidReply(e.to_string()))
    }
}
