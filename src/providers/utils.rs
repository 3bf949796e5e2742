use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;

use super::types::{
    message::{Message, MessageContent, Role},
    tool::ToolSpec,
};

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages.iter().map(message_to_openai_spec).collect()
}

fn message_to_openai_spec(message: &Message) -> Value {
    if let (Role::Tool, Some(response)) = (message.role, message.tool_response()) {
        return json!({
            "role": "tool",
            "tool_call_id": response.id,
            "name": response.name,
            "content": response.output,
        });
    }

    let mut converted = json!({ "role": message.role });

    let text = message.text();
    let tool_calls: Vec<Value> = message
        .content
        .iter()
        .filter_map(MessageContent::as_tool_request)
        .map(|request| {
            json!({
                "id": request.id,
                "type": "function",
                "function": {
                    "name": request.name,
                    "arguments": request.arguments,
                }
            })
        })
        .collect();

    // Assistant turns that only request tools carry a null content
    converted["content"] = if text.is_empty() && !tool_calls.is_empty() {
        Value::Null
    } else {
        json!(text)
    };

    if !tool_calls.is_empty() {
        converted["tool_calls"] = json!(tool_calls);
    }

    converted
}

/// Convert tool declarations to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[ToolSpec]) -> Result<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.schema(),
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("Response did not contain a message: {}", response))?;

    let mut message = Message::assistant();

    if let Some(text) = original.get("content").and_then(Value::as_str) {
        message = message.with_text(text);
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(Value::as_array) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default();
            let arguments = match &tool_call["function"]["arguments"] {
                Value::String(arguments) => arguments.clone(),
                Value::Null => String::new(),
                // Some compatible servers send the arguments already decoded
                other => other.to_string(),
            };
            message = message.with_tool_request(id, name, arguments);
        }
    }

    Ok(message)
}

static FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static regex is valid"));

/// Function names accepted by the model API
pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Input message too long. Message: {0}")]
pub struct InitialMessageTooLargeError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<InitialMessageTooLargeError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(InitialMessageTooLargeError(message))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::tool::ParamType;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "get_current_weather",
                        "arguments": "{\"location\": \"London\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let messages = vec![
            Message::system().with_text("You are a helpful weather assistant."),
            Message::user().with_text("Weather in London?"),
            Message::assistant().with_tool_request(
                "call_1",
                "get_current_weather",
                r#"{"location":"London"}"#,
            ),
            Message::tool().with_tool_response("call_1", "get_current_weather", "{}", false),
            Message::assistant().with_text("It is mild."),
        ];

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 5);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[1]["content"], "Weather in London?");
        assert_eq!(spec[2]["role"], "assistant");
        assert!(spec[2]["content"].is_null());
        assert_eq!(spec[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            spec[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"location":"London"}"#
        );
        assert_eq!(spec[3]["role"], "tool");
        assert_eq!(spec[3]["tool_call_id"], "call_1");
        assert_eq!(spec[3]["name"], "get_current_weather");
        assert_eq!(spec[4]["content"], "It is mild.");
        assert!(spec[4].get("tool_calls").is_none());
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<()> {
        let tool = ToolSpec::new("calculator", "Evaluate a mathematical expression")
            .required("expression", ParamType::String);

        let spec = tools_to_openai_spec(&[tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "calculator");
        assert_eq!(
            spec[0]["function"]["parameters"]["required"],
            json!(["expression"])
        );
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let tool = ToolSpec::new("web_search", "Search for information on the web");
        let result = tools_to_openai_spec(&[tool.clone(), tool]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tool name"));
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello there!"}
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.text(), "Hello there!");
        assert_eq!(message.role, Role::Assistant);
        assert!(message.tool_requests().is_empty());
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_tool_calls() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let message = openai_response_to_message(&response)?;

        let requests = message.tool_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "call_1");
        assert_eq!(requests[0].name, "get_current_weather");
        assert_eq!(
            requests[0].tool_call()?.arguments,
            json!({"location": "London"})
        );
        assert!(!message.has_text());
        Ok(())
    }

    #[test]
    fn test_openai_response_keeps_malformed_arguments() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        let message = openai_response_to_message(&response)?;
        let requests = message.tool_requests();
        assert_eq!(requests[0].arguments, "invalid json {");
        assert!(requests[0].tool_call().is_err());
        Ok(())
    }

    #[test]
    fn test_openai_response_without_choices() {
        let result = openai_response_to_message(&json!({"choices": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_is_valid_function_name() {
        assert!(is_valid_function_name("get_current_weather"));
        assert!(is_valid_function_name("web-search"));
        assert!(!is_valid_function_name("web search"));
        assert!(!is_valid_function_name(""));
        // Repeated checks reuse the one compiled pattern
        for _ in 0..3 {
            assert!(is_valid_function_name("calculator"));
            assert!(!is_valid_function_name("calc()"));
        }
    }

    #[test]
    fn test_check_openai_context_length_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });
        let result = check_openai_context_length_error(&error);
        assert_eq!(
            result.map(|e| e.to_string()).as_deref(),
            Some("Input message too long. Message: This message is too long")
        );

        let error = json!({"code": "other_error", "message": "Some other error"});
        assert!(check_openai_context_length_error(&error).is_none());
    }
}
