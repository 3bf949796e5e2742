use anyhow::Result;
use serde_json::Value;

use crate::providers::types::message::{Message, ToolResponse};

pub mod rustyline;

pub const ASSISTANT_LABEL: &str = "Weather Assistant";

/// Everything the operator sees or types goes through a prompt
pub trait Prompt {
    fn get_input(&mut self) -> Result<Input>;
    /// Ask a one-off question. `None` when the operator ended input.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
    fn render(&mut self, message: &Message);
    fn notice(&mut self, text: &str);
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Nothing to send, read another line
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

impl Input {
    pub fn exit() -> Self {
        Input {
            input_type: InputType::Exit,
            content: None,
        }
    }

    pub fn ask_again() -> Self {
        Input {
            input_type: InputType::AskAgain,
            content: None,
        }
    }
}

/// Sort a line typed at the REPL into a message, an exit, or nothing
pub fn classify_input(line: &str) -> Input {
    let text = line.trim();
    if text.is_empty() {
        return Input::ask_again();
    }

    // Exit words must match the whole line, surrounding spaces included
    if ["exit", "quit", "bye"]
        .iter()
        .any(|word| line.eq_ignore_ascii_case(word))
    {
        return Input::exit();
    }

    Input {
        input_type: InputType::Message,
        content: Some(line.to_string()),
    }
}

/// Tool output, pretty-printed when it is JSON
pub fn format_tool_response(response: &ToolResponse) -> String {
    let body = serde_json::from_str::<Value>(&response.output)
        .ok()
        .and_then(|parsed| serde_json::to_string_pretty(&parsed).ok())
        .unwrap_or_else(|| response.output.clone());
    format!("[Tool Response - {}]: {}", response.name, body)
}
