use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agents::AgentConfig;
use crate::conversation::Conversation;
use crate::errors::AgentError;
use crate::providers::base::Provider;
use crate::providers::types::message::{Message, ToolRequest};
use crate::providers::types::tool::ToolSpec;
use crate::tools::ToolRegistry;

pub const APOLOGY_PREFIX: &str = "I'm sorry, I encountered an error: ";

/// Agent pairs a chat model with the registry of tools it may call
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: Arc<ToolRegistry>,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        Self { provider, registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one dispatch round with the tools of the given configuration
    pub fn reply(&self, conversation: &mut Conversation, config: &AgentConfig) {
        match self.registry.declare(&config.tools) {
            Ok(tools) => self.process(conversation, &tools),
            Err(e) => apologize(conversation, &e.into()),
        }
    }

    /// Run one dispatch round: ask the model, execute whatever tools it requested,
    /// then ask once more for a final answer.
    ///
    /// Never fails. Any error along the way ends the round with an apologetic
    /// assistant message carrying the error text.
    pub fn process(&self, conversation: &mut Conversation, tools: &[ToolSpec]) {
        if let Err(e) = self.exchange(conversation, tools) {
            apologize(conversation, &e);
        }
    }

    fn exchange(&self, conversation: &mut Conversation, tools: &[ToolSpec]) -> Result<()> {
        info!("Sending message to model...");
        let (response, usage) = self.provider.complete(conversation.messages(), tools)?;
        debug!(?usage, "model replied");

        let requests: Vec<ToolRequest> = response.tool_requests().into_iter().cloned().collect();
        conversation.push(response)?;

        if requests.is_empty() {
            return Ok(());
        }

        info!("Tool calls detected: {}", requests.len());

        // Strictly in the order the model listed them
        for request in &requests {
            let (output, is_error) = self.run_tool(request, tools);
            conversation.push(Message::tool().with_tool_response(
                &request.id,
                &request.name,
                output,
                is_error,
            ))?;
        }

        info!("Getting final response after tool calls...");
        let (final_message, usage) = self.provider.complete(conversation.messages(), &[])?;
        debug!(?usage, "model finalized");

        conversation.push(Message::assistant().with_text(final_message.text()))?;
        Ok(())
    }

    /// Execute one requested tool, rendering any failure as text for the model
    fn run_tool(&self, request: &ToolRequest, tools: &[ToolSpec]) -> (String, bool) {
        let result = request.tool_call().and_then(|call| {
            if !tools.iter().any(|spec| spec.name == call.name) {
                return Err(AgentError::UnknownTool(call.name));
            }
            info!("Calling function: {} with args: {}", call.name, call.arguments);
            self.registry.invoke(&call)
        });

        match result {
            Ok(output) => (output.render(), output.is_error()),
            Err(e) => {
                warn!("Tool call {} ({}) failed: {}", request.id, request.name, e);
                (format!("Error: {}", e), true)
            }
        }
    }
}

fn apologize(conversation: &mut Conversation, e: &anyhow::Error) {
    error!("Error in API call: {:#}", e);
    let apology = Message::assistant().with_text(format!("{}{}", APOLOGY_PREFIX, e));
    if let Err(e) = conversation.push(apology) {
        error!("Could not record the error in the conversation: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::weather::WeatherProviderConfig;
    use crate::providers::mock::MockProvider;
    use crate::providers::types::message::Role;
    use crate::providers::weather::WeatherClient;
    use crate::tools::{builtin_registry, CALCULATOR, WEB_SEARCH};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn registry_with_weather_host(host: String) -> Arc<ToolRegistry> {
        let client = WeatherClient::new(WeatherProviderConfig::new("key".to_string(), host))
            .expect("client builds");
        Arc::new(builtin_registry(Arc::new(client)).expect("builtins register"))
    }

    fn registry() -> Arc<ToolRegistry> {
        registry_with_weather_host("http://127.0.0.1:9".to_string())
    }

    /// Shares the mock with the agent so the test can inspect recorded calls
    struct SharedMock(Arc<MockProvider>);

    impl Provider for SharedMock {
        fn from_env() -> Result<Self> {
            Ok(Self(Arc::new(MockProvider::new(Vec::new()))))
        }

        fn complete(
            &self,
            messages: &[Message],
            tools: &[ToolSpec],
        ) -> Result<(Message, crate::providers::base::Usage)> {
            self.0.complete(messages, tools)
        }
    }

    fn agent_with(
        responses: Vec<std::result::Result<Message, String>>,
        registry: Arc<ToolRegistry>,
    ) -> (Agent, Arc<MockProvider>) {
        let mock = Arc::new(MockProvider::with_results(responses));
        let agent = Agent::new(Box::new(SharedMock(mock.clone())), registry);
        (agent, mock)
    }

    fn started(config: &AgentConfig, query: &str) -> Conversation {
        let mut conversation = Conversation::new(&config.system_prompt);
        conversation
            .push(Message::user().with_text(query))
            .expect("user message is valid");
        conversation
    }

    fn tool_outputs(conversation: &Conversation) -> Vec<String> {
        conversation
            .messages()
            .iter()
            .filter_map(|m| m.tool_response().map(|r| r.output.clone()))
            .collect()
    }

    #[test]
    fn test_no_tool_calls_is_terminal() {
        let config = AgentConfig::basic();
        let (agent, mock) = agent_with(
            vec![Ok(Message::assistant().with_text("Hello! Ask me about the weather."))],
            registry(),
        );
        let mut conversation = started(&config, "hello");

        agent.reply(&mut conversation, &config);

        assert_eq!(conversation.len(), 3);
        let appended = conversation.since(2);
        assert_eq!(appended[0].role, Role::Assistant);
        assert!(tool_outputs(&conversation).is_empty());

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_names, config.tools);
    }

    #[test]
    fn test_tool_round_then_single_finalization() {
        let config = AgentConfig::react();
        let (agent, mock) = agent_with(
            vec![
                Ok(Message::assistant()
                    .with_text("Thought: I should calculate and search.")
                    .with_tool_request("call_1", CALCULATOR, r#"{"expression": "2 + 2"}"#)
                    .with_tool_request("call_2", WEB_SEARCH, r#"{"query": "weather forecast"}"#)),
                Ok(Message::assistant().with_text("Final Answer: 4")),
            ],
            registry(),
        );
        let mut conversation = started(&config, "What is 2 + 2, and what is a forecast?");

        agent.reply(&mut conversation, &config);

        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::Tool,
                Role::Tool,
                Role::Assistant
            ]
        );

        let responses: Vec<_> = conversation
            .messages()
            .iter()
            .filter_map(|m| m.tool_response())
            .collect();
        assert_eq!(responses[0].id, "call_1");
        assert_eq!(responses[0].name, CALCULATOR);
        assert_eq!(responses[0].output, "4");
        assert_eq!(responses[1].id, "call_2");
        let search: serde_json::Value = serde_json::from_str(&responses[1].output).unwrap();
        assert_eq!(search["query"], "weather forecast");

        assert_eq!(conversation.last_response().as_deref(), Some("Final Answer: 4"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].tool_names.is_empty());
        assert_eq!(calls[1].messages.len(), 5);
    }

    #[test]
    fn test_every_request_gets_a_tool_message() {
        let config = AgentConfig::basic();
        let (agent, _) = agent_with(
            vec![
                Ok(Message::assistant()
                    .with_tool_request("a", "teleport", r#"{"to": "Mars"}"#)
                    .with_tool_request("b", "get_current_weather", "not json")
                    .with_tool_request("c", "get_current_weather", r#"{"city": "Oslo"}"#)
                    .with_tool_request("d", CALCULATOR, r#"{"expression": "1"}"#)),
                Ok(Message::assistant().with_text("Sorry, those tools failed.")),
            ],
            registry(),
        );
        let mut conversation = started(&config, "do things");

        agent.reply(&mut conversation, &config);

        let outputs = tool_outputs(&conversation);
        assert_eq!(outputs.len(), 4);
        assert_eq!(outputs[0], "Error: Tool not found: teleport");
        assert!(outputs[1].starts_with("Error: Invalid parameters: Could not interpret"));
        assert!(outputs[2].starts_with("Error: Invalid parameters"));
        // The calculator exists but is not part of the basic tool set
        assert_eq!(outputs[3], "Error: Tool not found: calculator");
        assert_eq!(
            conversation.last_response().as_deref(),
            Some("Sorry, those tools failed.")
        );
    }

    #[test]
    fn test_upstream_weather_error_reaches_the_model() {
        let mut server = Server::new();
        server
            .mock("GET", "/current.json")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"error": {"message": "No matching location"}}).to_string())
            .create();

        let config = AgentConfig::basic();
        let (agent, _) = agent_with(
            vec![
                Ok(Message::assistant().with_tool_request(
                    "call_1",
                    "get_current_weather",
                    r#"{"location": "Atlantis"}"#,
                )),
                Ok(Message::assistant().with_text("I could not find Atlantis.")),
            ],
            registry_with_weather_host(server.url()),
        );
        let mut conversation = started(&config, "Weather in Atlantis?");

        agent.reply(&mut conversation, &config);

        let outputs = tool_outputs(&conversation);
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].contains("Error: No matching location"));
        assert_eq!(
            conversation.last_response().as_deref(),
            Some("I could not find Atlantis.")
        );
    }

    #[test]
    fn test_provider_failure_becomes_apology() {
        let config = AgentConfig::basic();
        let (agent, _) = agent_with(vec![Err("connection refused".to_string())], registry());
        let mut conversation = started(&config, "hello");

        agent.reply(&mut conversation, &config);

        assert_eq!(conversation.len(), 3);
        assert_eq!(
            conversation.last_response().as_deref(),
            Some("I'm sorry, I encountered an error: connection refused")
        );
    }

    #[test]
    fn test_finalization_failure_keeps_tool_results() {
        let config = AgentConfig::chain_of_thought();
        let (agent, _) = agent_with(
            vec![
                Ok(Message::assistant().with_tool_request(
                    "call_1",
                    CALCULATOR,
                    r#"{"expression": "3 * 3"}"#,
                )),
                Err("timeout".to_string()),
            ],
            registry(),
        );
        let mut conversation = started(&config, "3 * 3?");

        agent.reply(&mut conversation, &config);

        assert_eq!(tool_outputs(&conversation), vec!["9".to_string()]);
        assert_eq!(
            conversation.last_response().as_deref(),
            Some("I'm sorry, I encountered an error: timeout")
        );
    }

    #[test]
    fn test_undeclarable_tool_set_becomes_apology() {
        let mut config = AgentConfig::basic();
        config.tools.push("stock_prices".to_string());
        let (agent, mock) = agent_with(Vec::new(), registry());
        let mut conversation = started(&config, "hello");

        agent.reply(&mut conversation, &config);

        assert!(mock.calls().is_empty());
        assert_eq!(
            conversation.last_response().as_deref(),
            Some("I'm sorry, I encountered an error: Tool not found: stock_prices")
        );
        assert!(agent.registry().declare(&config.tools).is_err());
    }
}
