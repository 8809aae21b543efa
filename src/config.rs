// Configuration - Environment variables

use std::env;

use crate::llm::client::{GEMINI_API_URL, OPENROUTER_API_URL};
use crate::llm::LlmProvider;

/// Application configuration loaded from environment
#[derive(Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Which LLM provider the proxy forwards to
    pub provider: LlmProvider,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// OpenRouter API key
    pub openrouter_api_key: Option<String>,
    /// Gemini API base URL (overridable for tests and self-hosted gateways)
    pub gemini_api_url: String,
    /// OpenRouter API base URL (overridable for tests and self-hosted gateways)
    pub openrouter_api_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let provider = match env::var("LLM_PROVIDER").as_deref() {
            Ok("openrouter") => LlmProvider::OpenRouter,
            Ok("gemini") | Err(_) => LlmProvider::Gemini,
            Ok(other) => {
                tracing::warn!("Unknown LLM_PROVIDER '{}', defaulting to gemini", other);
                LlmProvider::Gemini
            }
        };

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            provider,
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").ok(),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| GEMINI_API_URL.to_string()),
            openrouter_api_url: env::var("OPENROUTER_API_URL")
                .unwrap_or_else(|_| OPENROUTER_API_URL.to_string()),
        }
    }

    /// API key for the selected provider; empty values count as unset
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider {
            LlmProvider::Gemini => self.gemini_api_key.as_deref(),
            LlmProvider::OpenRouter => self.openrouter_api_key.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }

    /// Base URL for the selected provider
    pub fn api_url(&self) -> &str {
        match self.provider {
            LlmProvider::Gemini => &self.gemini_api_url,
            LlmProvider::OpenRouter => &self.openrouter_api_url,
        }
    }

    /// Environment variable holding the selected provider's key
    pub fn key_env_var(&self) -> &'static str {
        match self.provider {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// Validate that required configuration is present
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key().is_none() {
            tracing::warn!("{} not set - chat requests will fail", self.key_env_var());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LlmProvider) -> Config {
        Config {
            port: 8080,
            provider,
            gemini_api_key: None,
            openrouter_api_key: None,
            gemini_api_url: GEMINI_API_URL.to_string(),
            openrouter_api_url: OPENROUTER_API_URL.to_string(),
        }
    }

    #[test]
    fn api_key_follows_the_selected_provider() {
        let mut cfg = config(LlmProvider::OpenRouter);
        cfg.gemini_api_key = Some("gem".to_string());
        assert!(cfg.api_key().is_none());

        cfg.openrouter_api_key = Some("router".to_string());
        assert_eq!(cfg.api_key(), Some("router"));
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let mut cfg = config(LlmProvider::Gemini);
        cfg.gemini_api_key = Some(String::new());
        assert!(cfg.api_key().is_none());
    }
}
