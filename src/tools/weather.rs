use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{parse_arguments, ToolExecutor, ToolOutput, CURRENT_WEATHER, WEATHER_FORECAST};
use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::{ParamType, ToolSpec};
use crate::providers::weather::{WeatherClient, WeatherReport, DEFAULT_FORECAST_DAYS};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CurrentWeatherArgs {
    location: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ForecastArgs {
    location: String,
    #[serde(default)]
    days: Option<u32>,
}

fn into_output<T: serde::Serialize>(
    report: anyhow::Result<WeatherReport<T>>,
) -> AgentResult<ToolOutput> {
    match report.map_err(|e| AgentError::UpstreamApi(format!("{:#}", e)))? {
        WeatherReport::Found(data) => ToolOutput::json(&data),
        WeatherReport::Rejected(message) => Ok(ToolOutput::failure(message)),
    }
}

pub struct CurrentWeatherTool {
    client: Arc<WeatherClient>,
}

impl CurrentWeatherTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new(CURRENT_WEATHER, "Get the current weather in a given location")
            .required("location", ParamType::String)
            .described("The city name, e.g. London or San Francisco")
    }
}

impl ToolExecutor for CurrentWeatherTool {
    fn execute(&self, arguments: &Value) -> AgentResult<ToolOutput> {
        let args: CurrentWeatherArgs = parse_arguments(arguments)?;
        into_output(self.client.current(&args.location))
    }
}

pub struct ForecastTool {
    client: Arc<WeatherClient>,
}

impl ForecastTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new(WEATHER_FORECAST, "Get the weather forecast for a given location")
            .required("location", ParamType::String)
            .described("The city name, e.g. London or San Francisco")
            .optional("days", ParamType::Integer)
            .described("Number of days to forecast (default 3)")
    }
}

impl ToolExecutor for ForecastTool {
    fn execute(&self, arguments: &Value) -> AgentResult<ToolOutput> {
        let args: ForecastArgs = parse_arguments(arguments)?;
        let days = args.days.unwrap_or(DEFAULT_FORECAST_DAYS);
        if days == 0 {
            return Err(AgentError::MalformedArguments(
                "days must be at least 1".to_string(),
            ));
        }
        into_output(self.client.forecast(&args.location, days))
    }
}
