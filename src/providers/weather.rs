use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::configs::base::ProviderConfig;
use super::configs::weather::WeatherProviderConfig;

pub const DEFAULT_FORECAST_DAYS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: String,
    pub temperature_c: f64,
    pub temperature_f: f64,
    pub condition: String,
    pub humidity: i64,
    pub wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub condition: String,
    pub chance_of_rain: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: String,
    pub forecast: Vec<ForecastDay>,
}

/// What the weather service answered: data, or the error message it reported
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReport<T> {
    Found(T),
    Rejected(String),
}

// Wire shapes of the weatherapi.com responses

#[derive(Deserialize)]
struct ApiLocation {
    name: String,
}

#[derive(Deserialize)]
struct ApiCondition {
    text: String,
}

#[derive(Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    temp_f: f64,
    condition: ApiCondition,
    humidity: i64,
    wind_kph: f64,
}

#[derive(Deserialize)]
struct CurrentResponse {
    location: ApiLocation,
    current: ApiCurrent,
}

#[derive(Deserialize)]
struct ApiDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: ApiCondition,
    daily_chance_of_rain: i64,
}

#[derive(Deserialize)]
struct ApiForecastDay {
    date: String,
    day: ApiDay,
}

#[derive(Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    location: ApiLocation,
    forecast: ApiForecast,
}

impl From<CurrentResponse> for CurrentWeather {
    fn from(data: CurrentResponse) -> Self {
        CurrentWeather {
            location: data.location.name,
            temperature_c: data.current.temp_c,
            temperature_f: data.current.temp_f,
            condition: data.current.condition.text,
            humidity: data.current.humidity,
            wind_kph: data.current.wind_kph,
        }
    }
}

impl From<ForecastResponse> for Forecast {
    fn from(data: ForecastResponse) -> Self {
        Forecast {
            location: data.location.name,
            forecast: data
                .forecast
                .forecastday
                .into_iter()
                .map(|day| ForecastDay {
                    date: day.date,
                    max_temp_c: day.day.maxtemp_c,
                    min_temp_c: day.day.mintemp_c,
                    condition: day.day.condition.text,
                    chance_of_rain: day.day.daily_chance_of_rain,
                })
                .collect(),
        }
    }
}

/// Blocking client for the weather service; one GET per lookup, no retries
pub struct WeatherClient {
    client: Client,
    config: WeatherProviderConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(None).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(WeatherProviderConfig::from_env()?)
    }

    pub fn current(&self, location: &str) -> Result<WeatherReport<CurrentWeather>> {
        let data = self.get("current.json", &[("q", location.to_string())])?;
        decode::<CurrentResponse, CurrentWeather>(data)
    }

    pub fn forecast(&self, location: &str, days: u32) -> Result<WeatherReport<Forecast>> {
        let data = self.get(
            "forecast.json",
            &[("q", location.to_string()), ("days", days.to_string())],
        )?;
        decode::<ForecastResponse, Forecast>(data)
    }

    fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.config.host.trim_end_matches('/'), endpoint);

        let mut query: Vec<(&str, &str)> = vec![("key", self.config.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
        query.push(("aqi", "no"));

        // The service reports lookup failures as a JSON body on non-2xx statuses,
        // so the body is decoded regardless of status
        let response = self.client.get(&url).query(&query).send()?;
        let status = response.status();
        response
            .json::<Value>()
            .with_context(|| format!("Weather service returned an unreadable body ({})", status))
    }
}

fn decode<W, T>(data: Value) -> Result<WeatherReport<T>>
where
    W: for<'de> Deserialize<'de>,
    T: From<W>,
{
    if let Some(error) = data.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Ok(WeatherReport::Rejected(message));
    }

    let parsed: W = serde_json::from_value(data)
        .map_err(|e| anyhow!("Unexpected weather response: {}", e))?;
    Ok(WeatherReport::Found(parsed.into()))
}
