use super::base::ProviderConfig;
use anyhow::Result;

pub const API_KEY_VAR: &str = "API_KEY";
pub const BASE_URL_VAR: &str = "BASE_URL";
pub const MODEL_VAR: &str = "LLM_MODEL";

/// Connection details for an OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    /// Base URL including the API version, e.g. `https://api.openai.com/v1`
    pub host: String,
    pub model: String,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: String, host: String, model: String) -> Self {
        Self {
            api_key,
            host,
            model,
        }
    }
}

impl ProviderConfig for OpenAiProviderConfig {
    fn from_env() -> Result<Self> {
        let api_key = Self::require_env(API_KEY_VAR)?;
        let host = Self::require_env(BASE_URL_VAR)?;
        let model = Self::require_env(MODEL_VAR)?;

        Ok(Self::new(api_key, host, model))
    }
}
