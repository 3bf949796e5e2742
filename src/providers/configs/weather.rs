use super::base::ProviderConfig;
use anyhow::Result;

pub const WEATHER_API_KEY_VAR: &str = "WEATHER_API_KEY";
pub const WEATHER_API_HOST_VAR: &str = "WEATHER_API_HOST";
pub const DEFAULT_WEATHER_HOST: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherProviderConfig {
    pub api_key: String,
    pub host: String,
}

impl WeatherProviderConfig {
    pub fn new(api_key: String, host: String) -> Self {
        Self { api_key, host }
    }
}

impl ProviderConfig for WeatherProviderConfig {
    fn from_env() -> Result<Self> {
        let api_key = Self::require_env(WEATHER_API_KEY_VAR)?;

        let host = Self::get_env(
            WEATHER_API_HOST_VAR,
            false,
            Some(DEFAULT_WEATHER_HOST.to_string()),
        )?
        .unwrap_or_else(|| DEFAULT_WEATHER_HOST.to_string());

        Ok(Self::new(api_key, host))
    }
}
