//! Centralized model definitions for all LLM providers
//!
//! Adding a model means adding one `ModelDef` entry here.

use super::gemini::GeminiModel;
use super::openai::OpenAIModel;
use super::{GeminiService, LlmService, OpenAIService};
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Gemini => "Google",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gemini-2.5-flash")
    pub id: &'static str,
    pub provider: Provider,
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
    /// Factory function to create the service
    pub factory: fn(&str, Option<&str>) -> Result<Arc<dyn LlmService>, String>,
}

fn openai(
    model: OpenAIModel,
    api_key: &str,
    gateway: Option<&str>,
) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!(
            "{} requires {} or gateway",
            model.model_id(),
            Provider::OpenAI.api_key_env_var()
        ));
    }
    Ok(Arc::new(OpenAIService::new(
        api_key.to_string(),
        model,
        gateway,
    )))
}

fn gemini(
    model: GeminiModel,
    api_key: &str,
    gateway: Option<&str>,
) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!(
            "{} requires {} or gateway",
            model.model_id(),
            Provider::Gemini.api_key_env_var()
        ));
    }
    Ok(Arc::new(GeminiService::new(
        api_key.to_string(),
        model,
        gateway,
    )))
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        // Gemini models
        ModelDef {
            id: "gemini-2.5-flash",
            provider: Provider::Gemini,
            description: "Gemini 2.5 Flash (fast, conversational)",
            context_window: 1_048_576,
            factory: |api_key, gateway| gemini(GeminiModel::Gemini25Flash, api_key, gateway),
        },
        ModelDef {
            id: "gemini-2.5-pro",
            provider: Provider::Gemini,
            description: "Gemini 2.5 Pro (most capable, slower)",
            context_window: 1_048_576,
            factory: |api_key, gateway| gemini(GeminiModel::Gemini25Pro, api_key, gateway),
        },
        // OpenAI models
        ModelDef {
            id: "gpt-5",
            provider: Provider::OpenAI,
            description: "GPT-5 (reasoning model)",
            context_window: 128_000,
            factory: |api_key, gateway| openai(OpenAIModel::GPT5, api_key, gateway),
        },
        ModelDef {
            id: "gpt-5-mini",
            provider: Provider::OpenAI,
            description: "GPT-5 Mini (fast reasoning)",
            context_window: 128_000,
            factory: |api_key, gateway| openai(OpenAIModel::GPT5Mini, api_key, gateway),
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            description: "GPT-4o Mini (fast, efficient)",
            context_window: 128_000,
            factory: |api_key, gateway| openai(OpenAIModel::GPT4oMini, api_key, gateway),
        },
    ]
}
