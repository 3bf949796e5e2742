use anyhow::Result;

use crate::agent::Agent;
use crate::agents::AgentConfig;
use crate::conversation::Conversation;
use crate::prompt::{InputType, Prompt, ASSISTANT_LABEL};
use crate::providers::types::message::Message;

/// Interactive REPL over one conversation
pub struct Session<'a> {
    agent: &'a Agent,
    config: AgentConfig,
    prompt: &'a mut dyn Prompt,
    conversation: Conversation,
}

impl<'a> Session<'a> {
    pub fn new(agent: &'a Agent, config: AgentConfig, prompt: &'a mut dyn Prompt) -> Self {
        let conversation = Conversation::new(&config.system_prompt);
        Session {
            agent,
            config,
            prompt,
            conversation,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn start(&mut self) -> Result<()> {
        self.prompt.notice(&format!(
            "{}: Hello! I can help you with weather information. Ask me about the weather anywhere!",
            ASSISTANT_LABEL
        ));
        self.prompt
            .notice("(Type 'exit' to end the conversation)\n");

        loop {
            let input = self.prompt.get_input()?;
            let content = match input.input_type {
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
                InputType::Exit => break,
                InputType::AskAgain => continue,
            };

            if let Err(e) = self.turn(content) {
                self.prompt.notice(&format!("\nAn error occurred: {}", e));
            }
        }

        self.prompt.notice(&format!(
            "\n{}: Goodbye! Have a great day!",
            ASSISTANT_LABEL
        ));
        self.prompt.close();
        Ok(())
    }

    fn turn(&mut self, content: String) -> Result<()> {
        self.conversation.push(Message::user().with_text(content))?;
        let before = self.conversation.len();

        self.prompt.show_busy();
        self.agent.reply(&mut self.conversation, &self.config);
        self.prompt.hide_busy();

        for message in self.conversation.since(before) {
            self.prompt.render(message);
        }
        Ok(())
    }
}

/// A single query through a fresh conversation, no REPL
pub fn run_once(agent: &Agent, config: &AgentConfig, query: &str) -> Conversation {
    let mut conversation = Conversation::new(&config.system_prompt);
    match conversation.push(Message::user().with_text(query)) {
        Ok(()) => agent.reply(&mut conversation, config),
        Err(e) => tracing::warn!("Query not sent: {}", e),
    }
    conversation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::mock::ScriptedPrompt;
    use crate::providers::configs::weather::WeatherProviderConfig;
    use crate::providers::mock::MockProvider;
    use crate::providers::types::message::Role;
    use crate::providers::weather::WeatherClient;
    use crate::tools::{builtin_registry, ToolRegistry, CURRENT_WEATHER};
    use std::sync::Arc;

    fn registry() -> Arc<ToolRegistry> {
        let client = WeatherClient::new(WeatherProviderConfig::new(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
        ))
        .unwrap();
        Arc::new(builtin_registry(Arc::new(client)).unwrap())
    }

    fn agent(responses: Vec<Message>) -> Agent {
        Agent::new(Box::new(MockProvider::new(responses)), registry())
    }

    #[test]
    fn test_session_greets_replies_and_says_goodbye() -> Result<()> {
        let agent = agent(vec![Message::assistant().with_text("Hi there!")]);
        let mut prompt = ScriptedPrompt::new(&["", "hello", "   ", "Exit"]);

        let mut session = Session::new(&agent, AgentConfig::basic(), &mut prompt);
        session.start()?;

        let roles: Vec<Role> = session
            .conversation()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);

        assert_eq!(prompt.rendered.len(), 1);
        assert_eq!(prompt.rendered[0].text(), "Hi there!");
        assert!(prompt.notices[0].starts_with("Weather Assistant: Hello!"));
        assert_eq!(
            prompt.notices.last().map(String::as_str),
            Some("\nWeather Assistant: Goodbye! Have a great day!")
        );
        assert!(prompt.closed);
        Ok(())
    }

    #[test]
    fn test_session_renders_tool_messages_and_keeps_going() -> Result<()> {
        let agent = agent(vec![
            Message::assistant().with_tool_request(
                "call_1",
                CURRENT_WEATHER,
                r#"{"location": "Paris", "units": "metric"}"#,
            ),
            Message::assistant().with_text("I could not look that up."),
            Message::assistant().with_text("You're welcome."),
        ]);
        let mut prompt = ScriptedPrompt::new(&["Weather in Paris?", "thanks"]);

        let mut session = Session::new(&agent, AgentConfig::basic(), &mut prompt);
        session.start()?;
        assert_eq!(session.conversation().len(), 7);

        let rendered: Vec<Role> = prompt.rendered.iter().map(|m| m.role).collect();
        assert_eq!(
            rendered,
            vec![Role::Assistant, Role::Tool, Role::Assistant, Role::Assistant]
        );
        let response = prompt.rendered[1].tool_response().unwrap();
        assert!(response.is_error);
        assert!(response.output.starts_with("Error: Invalid parameters"));
        Ok(())
    }

    #[test]
    fn test_run_once() {
        let agent = agent(vec![Message::assistant().with_text("Sunny.")]);
        let config = AgentConfig::react();

        let conversation = run_once(&agent, &config, "Weather in Rome?");

        assert_eq!(conversation.messages()[0].text(), config.system_prompt);
        assert_eq!(conversation.messages()[1].text(), "Weather in Rome?");
        assert_eq!(conversation.last_response().as_deref(), Some("Sunny."));
    }
}
