use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::tool::ToolCall;
use crate::errors::{AgentError, AgentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

/// A tool invocation requested by the model, with its arguments still encoded
/// exactly as the model sent them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolRequest {
    /// Decode the argument payload into a call. An empty payload means no arguments.
    pub fn tool_call(&self) -> AgentResult<ToolCall> {
        let arguments = if self.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str::<Value>(&self.arguments).map_err(|e| {
                AgentError::MalformedArguments(format!(
                    "Could not interpret tool use parameters for id {}: {}",
                    self.id, e
                ))
            })?
        };

        if !arguments.is_object() {
            return Err(AgentError::MalformedArguments(format!(
                "Expected an object of arguments for id {}, got: {}",
                self.id, self.arguments
            )));
        }

        Ok(ToolCall::new(&self.name, arguments))
    }
}

/// The outcome of one tool call, already rendered as text for the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub name: String,
    pub output: String,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageContent {
    Text(TextContent),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        if let MessageContent::ToolResponse(ref tool_response) = self {
            Some(tool_response)
        } else {
            None
        }
    }
}

/// A message to or from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub id: String,
    pub content: Vec<MessageContent>,
}

pub fn create_object_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

impl Message {
    fn new(role: Role) -> Self {
        Message {
            role,
            id: create_object_id("msg"),
            content: Vec::new(),
        }
    }

    pub fn system() -> Self {
        Self::new(Role::System)
    }

    pub fn user() -> Self {
        Self::new(Role::User)
    }

    pub fn assistant() -> Self {
        Self::new(Role::Assistant)
    }

    pub fn tool() -> Self {
        Self::new(Role::Tool)
    }

    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    pub fn with_tool_request<I, N, A>(self, id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        self.with_content(MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }))
    }

    pub fn with_tool_response<I, N, O>(self, id: I, name: N, output: O, is_error: bool) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        O: Into<String>,
    {
        self.with_content(MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            name: name.into(),
            output: output.into(),
            is_error,
        }))
    }

    /// All text content joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when the message carries any text at all, even whitespace
    pub fn has_text(&self) -> bool {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .any(|text| !text.is_empty())
    }

    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.content
            .iter()
            .filter_map(MessageContent::as_tool_request)
            .collect()
    }

    pub fn tool_response(&self) -> Option<&ToolResponse> {
        self.content.iter().find_map(MessageContent::as_tool_response)
    }

    fn has_tool_request(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, MessageContent::ToolRequest(_)))
    }

    fn has_tool_response(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, MessageContent::ToolResponse(_)))
    }

    /// Check that the content fits the role
    pub fn validate(&self) -> AgentResult<()> {
        match self.role {
            Role::System | Role::User => {
                if !self.content.iter().any(|c| c.as_text().is_some()) {
                    return Err(AgentError::InvalidMessage(format!(
                        "{:?} message must include text",
                        self.role
                    )));
                }
                if self.has_tool_request() || self.has_tool_response() {
                    return Err(AgentError::InvalidMessage(format!(
                        "{:?} message does not support tool content",
                        self.role
                    )));
                }
            }
            Role::Assistant => {
                if self.has_tool_response() {
                    return Err(AgentError::InvalidMessage(
                        "Assistant message does not support tool responses".to_string(),
                    ));
                }
            }
            Role::Tool => {
                if self.content.len() != 1 || !self.has_tool_response() {
                    return Err(AgentError::InvalidMessage(
                        "Tool message must contain exactly one tool response".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
