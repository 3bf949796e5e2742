//! Tools the model can call, and the registry that wires names to implementations.
//!
//! Every tool receives its arguments as the JSON object the model produced and
//! answers with a [`ToolOutput`]. Failures the tool understands (an unknown
//! location, an expression that does not parse) are a `Failure` output, which
//! the model gets to read. An `Err` is left for things that went wrong around
//! the tool, such as transport errors or arguments that do not fit its schema.
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::providers::weather::WeatherClient;

pub mod calculator;
pub mod registry;
pub mod search;
pub mod weather;

pub use registry::ToolRegistry;

pub const CURRENT_WEATHER: &str = "get_current_weather";
pub const WEATHER_FORECAST: &str = "get_weather_forecast";
pub const CALCULATOR: &str = "calculator";
pub const WEB_SEARCH: &str = "web_search";

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Success(Value),
    Failure(String),
}

impl ToolOutput {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ToolOutput::Success(Value::String(text.into()))
    }

    pub fn json<T: Serialize>(value: &T) -> AgentResult<Self> {
        serde_json::to_value(value)
            .map(ToolOutput::Success)
            .map_err(|e| AgentError::Internal(e.to_string()))
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        ToolOutput::Failure(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutput::Failure(_))
    }

    /// The text placed in the tool message
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Success(Value::String(text)) => text.clone(),
            ToolOutput::Success(value) => value.to_string(),
            ToolOutput::Failure(message) => format!("Error: {}", message),
        }
    }
}

/// Something the registry can invoke by name
pub trait ToolExecutor: Send + Sync {
    fn execute(&self, arguments: &Value) -> AgentResult<ToolOutput>;
}

impl<F> ToolExecutor for F
where
    F: Fn(&Value) -> AgentResult<ToolOutput> + Send + Sync,
{
    fn execute(&self, arguments: &Value) -> AgentResult<ToolOutput> {
        self(arguments)
    }
}

/// Decode a tool's typed arguments
pub fn parse_arguments<T: DeserializeOwned>(arguments: &Value) -> AgentResult<T> {
    serde_json::from_value(arguments.clone())
        .map_err(|e| AgentError::MalformedArguments(e.to_string()))
}

/// Build the registry holding all four built-in tools
pub fn builtin_registry(weather: Arc<WeatherClient>) -> AgentResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(
        weather::CurrentWeatherTool::spec(),
        weather::CurrentWeatherTool::new(weather.clone()),
    )?;
    registry.register(
        weather::ForecastTool::spec(),
        weather::ForecastTool::new(weather),
    )?;
    registry.register(calculator::CalculatorTool::spec(), calculator::CalculatorTool)?;
    registry.register(search::WebSearchTool::spec(), search::WebSearchTool)?;
    Ok(registry)
}
