use std::collections::HashSet;

use crate::errors::{AgentError, AgentResult};
use crate::providers::types::message::{Message, Role};

/// Ordered, append-only message log for one session or one comparison run.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with the given system prompt
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Self {
            messages: vec![Message::system().with_text(system_prompt)],
        }
    }

    /// Append a message, checking that it fits the role and, for tool
    /// messages, that it answers a request in the latest assistant turn
    pub fn push(&mut self, message: Message) -> AgentResult<()> {
        message.validate()?;

        if let Some(response) = message.tool_response() {
            if !self.pending_tool_call_ids().contains(response.id.as_str()) {
                return Err(AgentError::InvalidMessage(format!(
                    "tool result {} does not answer a preceding tool call",
                    response.id
                )));
            }
        }

        self.messages.push(message);
        Ok(())
    }

    /// Tool call ids from the most recent assistant message that requested tools
    fn pending_tool_call_ids(&self) -> HashSet<&str> {
        self.messages
            .iter()
            .rev()
            .take_while(|m| m.role != Role::User)
            .find(|m| m.role == Role::Assistant && !m.tool_requests().is_empty())
            .map(|m| m.tool_requests().into_iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended at or after `index`
    pub fn since(&self, index: usize) -> &[Message] {
        &self.messages[index.min(self.messages.len())..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Text of the last assistant message with non-empty content
    pub fn last_response(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && m.has_text())
            .map(Message::text)
    }
}
