//! Model registry for managing available LLM providers

use super::{all_models, LlmService, LoggingService, ModelDef, Provider};
use std::collections::HashMap;
use std::sync::Arc;

/// Preferred model for conducting the interview
const PREFERRED_INTERVIEW_MODEL: &str = "gemini-2.5-flash";
/// Preferred model for critiquing answers
const PREFERRED_ANALYSIS_MODEL: &str = "gemini-2.5-pro";

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Gateway URL; when set, every model is routed through it
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
    /// Model used by the interviewer (falls back to the default)
    pub interview_model: Option<String>,
    /// Model used for answer analysis (falls back to the default)
    pub analysis_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gateway: non_empty_var("LLM_GATEWAY"),
            default_model: non_empty_var("DEFAULT_MODEL"),
            interview_model: non_empty_var("INTERVIEW_MODEL"),
            analysis_model: non_empty_var("ANALYSIS_MODEL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
    interview_model: String,
    analysis_model: String,
}

impl ModelRegistry {
    /// Create an empty registry for testing purposes
    #[cfg(test)]
    pub fn new_empty() -> Self {
        Self {
            services: HashMap::new(),
            default_model: "test-model".to_string(),
            interview_model: "test-model".to_string(),
            analysis_model: "test-model".to_string(),
        }
    }

    /// Registry serving every role from one model
    #[cfg(test)]
    pub fn single(service: Arc<dyn LlmService>) -> Self {
        let id = service.model_id().to_string();
        let mut services = HashMap::new();
        services.insert(id.clone(), service);
        Self {
            services,
            default_model: id.clone(),
            interview_model: id.clone(),
            analysis_model: id,
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .or_else(|| Self::first_available(&services, PREFERRED_INTERVIEW_MODEL))
            .unwrap_or_else(|| PREFERRED_INTERVIEW_MODEL.to_string());

        let interview_model = config
            .interview_model
            .clone()
            .unwrap_or_else(|| default_model.clone());

        let analysis_model = config
            .analysis_model
            .clone()
            .or_else(|| {
                // An explicit DEFAULT_MODEL applies to both roles
                let preferred_available = config.default_model.is_none()
                    && services.contains_key(PREFERRED_ANALYSIS_MODEL);
                preferred_available.then(|| PREFERRED_ANALYSIS_MODEL.to_string())
            })
            .unwrap_or_else(|| default_model.clone());

        Self {
            services,
            default_model,
            interview_model,
            analysis_model,
        }
    }

    /// The preferred model when registered, else the first registered in
    /// definition order
    fn first_available(
        services: &HashMap<String, Arc<dyn LlmService>>,
        preferred: &str,
    ) -> Option<String> {
        if services.contains_key(preferred) {
            return Some(preferred.to_string());
        }
        all_models()
            .iter()
            .find(|def| services.contains_key(def.id))
            .map(|def| def.id.to_string())
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode, use "implicit" as the API key
        // The gateway will handle the actual authentication
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            match model_def.provider {
                Provider::OpenAI => config.openai_api_key.as_ref()?,
                Provider::Gemini => config.gemini_api_key.as_ref()?,
            }
            .clone()
        };

        match (model_def.factory)(&api_key, config.gateway.as_deref()) {
            Ok(service) => Some(Arc::new(LoggingService::new(service))),
            Err(e) => {
                tracing::warn!(model = model_def.id, error = %e, "Skipping model");
                None
            }
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    pub fn interview_model_id(&self) -> &str {
        &self.interview_model
    }

    pub fn analysis_model_id(&self) -> &str {
        &self.analysis_model
    }

    /// Model that conducts the interview, if one is configured
    pub fn interview(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.interview_model)
    }

    /// Model that critiques answers, if one is configured
    pub fn analysis(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.analysis_model)
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .map(|def| crate::api::ModelInfo {
                id: def.id.to_string(),
                provider: def.provider.display_name().to_string(),
                description: def.description.to_string(),
                context_window: def.context_window,
            })
            .collect()
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
