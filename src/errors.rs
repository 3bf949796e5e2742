use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    /// The weather or model provider failed or reported an error
    #[error("Upstream API error: {0}")]
    UpstreamApi(String),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters: {0}")]
    MalformedArguments(String),

    #[error("Invalid expression: {0}")]
    Evaluation(String),

    #[error("Failed to save results: {0}")]
    Persistence(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool name: {0}")]
    InvalidToolName(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::UnknownTool("teleport".to_string());
        assert_eq!(err.to_string(), "Tool not found: teleport");

        let err = AgentError::MalformedArguments("missing field `location`".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid parameters: missing field `location`"
        );
    }

    #[test]
    fn test_error_serialization() -> anyhow::Result<()> {
        let err = AgentError::Evaluation("division by zero".to_string());
        let serialized = serde_json::to_string(&err)?;
        let deserialized: AgentError = serde_json::from_str(&serialized)?;
        assert_eq!(err, deserialized);
        Ok(())
    }
}
