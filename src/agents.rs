//! The three agent configurations. Each one only differs from the others in its
//! system prompt and the tools it may call, and each tool set extends the
//! previous one.
use crate::tools::{CALCULATOR, CURRENT_WEATHER, WEATHER_FORECAST, WEB_SEARCH};

const BASIC_PROMPT: &str = include_str!("prompts/basic.md");
const CHAIN_OF_THOUGHT_PROMPT: &str = include_str!("prompts/chain_of_thought.md");
const REACT_PROMPT: &str = include_str!("prompts/react.md");

const WEATHER_TOOLS: &[&str] = &[CURRENT_WEATHER, WEATHER_FORECAST];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Basic,
    ChainOfThought,
    React,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Basic, Strategy::ChainOfThought, Strategy::React];
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub system_prompt: String,
    /// Names of the tools offered to the model, in declaration order
    pub tools: Vec<String>,
}

impl AgentConfig {
    fn new(name: &str, prompt: &str, tools: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            system_prompt: prompt.trim_end().to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Weather lookups only
    pub fn basic() -> Self {
        Self::new("Basic", BASIC_PROMPT, WEATHER_TOOLS)
    }

    /// Step-by-step reasoning, adds the calculator
    pub fn chain_of_thought() -> Self {
        let mut config = Self::new("Chain of Thought", CHAIN_OF_THOUGHT_PROMPT, WEATHER_TOOLS);
        config.tools.push(CALCULATOR.to_string());
        config
    }

    /// Thought/Action/Observation prompting, adds search
    pub fn react() -> Self {
        let mut config = Self::chain_of_thought();
        config.name = "ReAct".to_string();
        config.system_prompt = REACT_PROMPT.trim_end().to_string();
        config.tools.push(WEB_SEARCH.to_string());
        config
    }

    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Basic => Self::basic(),
            Strategy::ChainOfThought => Self::chain_of_thought(),
            Strategy::React => Self::react(),
        }
    }

    /// All configurations in comparison order
    pub fn all() -> Vec<Self> {
        Strategy::ALL.into_iter().map(Self::for_strategy).collect()
    }
}
