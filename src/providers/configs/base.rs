use anyhow::{anyhow, Result};
use std::env;

pub trait ProviderConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self>
    where
        Self: Sized;

    /// Read an environment variable, failing when a required one is missing
    fn get_env(key: &str, required: bool, default: Option<String>) -> Result<Option<String>> {
        match env::var(key) {
            Ok(value) if required && value.trim().is_empty() => Err(anyhow!(
                "Environment variable '{}' is required but empty.",
                key
            )),
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) if !required => Ok(default),
            Err(env::VarError::NotPresent) => Err(anyhow!(
                "Environment variable '{}' is required but not set.",
                key
            )),
            Err(e) => Err(anyhow!("Environment variable '{}' is invalid: {}", key, e)),
        }
    }

    /// Read a variable that must be present
    fn require_env(key: &str) -> Result<String> {
        Self::get_env(key, true, None)?
            .ok_or_else(|| anyhow!("Environment variable '{}' should be present", key))
    }
}
