use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::{parse_arguments, ToolExecutor, ToolOutput, WEB_SEARCH};
use crate::errors::AgentResult;
use crate::providers::types::tool::{ParamType, ToolSpec};

pub const NO_RESULTS: &str = "No relevant information found.";

/// Canned search results keyed by phrase. Order matters: on equal scores the
/// earlier entry wins.
pub const KNOWLEDGE_TABLE: &[(&str, &str)] = &[
    (
        "weather forecast",
        "Weather forecasts predict atmospheric conditions for a specific location and time period. They typically include temperature, precipitation, wind, and other variables.",
    ),
    (
        "temperature conversion",
        "To convert Celsius to Fahrenheit: multiply by 9/5 and add 32. To convert Fahrenheit to Celsius: subtract 32 and multiply by 5/9.",
    ),
    (
        "climate change",
        "Climate change refers to significant changes in global temperature, precipitation, wind patterns, and other measures of climate that occur over several decades or longer.",
    ),
    (
        "severe weather",
        "Severe weather includes thunderstorms, tornadoes, hurricanes, blizzards, floods, and high winds that can cause damage, disruption, and loss of life.",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub result: String,
}

fn words(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Number of distinct words the two texts share, ignoring case
pub fn overlap(query: &str, key: &str) -> usize {
    words(query).intersection(&words(key)).count()
}

/// Look the query up in the knowledge table
pub fn web_search(query: &str) -> SearchResult {
    let mut best: Option<&str> = None;
    let mut best_score = 0;

    for &(key, text) in KNOWLEDGE_TABLE {
        let score = overlap(query, key);
        if score > best_score {
            best = Some(text);
            best_score = score;
        }
    }

    SearchResult {
        query: query.to_string(),
        result: best.unwrap_or(NO_RESULTS).to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    query: String,
}

pub struct WebSearchTool;

impl WebSearchTool {
    pub fn spec() -> ToolSpec {
        ToolSpec::new(WEB_SEARCH, "Search for information on the web")
            .required("query", ParamType::String)
            .described("The search query")
    }
}

impl ToolExecutor for WebSearchTool {
    fn execute(&self, arguments: &Value) -> AgentResult<ToolOutput> {
        let args: SearchArgs = parse_arguments(arguments)?;
        ToolOutput::json(&web_search(&args.query))
    }
}
