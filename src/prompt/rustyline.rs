use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::{classify_input, format_tool_response, Input, Prompt, ASSISTANT_LABEL};
use crate::providers::types::message::{Message, Role};

const PROMPT: &str = "You: ";
const THEME: &str = "zenburn";

/// Terminal prompt: line editing with rustyline, markdown through bat
pub struct RustylinePrompt {
    editor: DefaultEditor,
    spinner: cliclack::ProgressBar,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            editor: DefaultEditor::new()?,
            spinner: spinner(),
        })
    }
}

fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();

    if printed.is_err() {
        println!("{}", content);
    }
}

impl Prompt for RustylinePrompt {
    fn get_input(&mut self) -> Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(classify_input(&line))
            }
            // Ctrl-C drops the current line, Ctrl-D ends the session
            Err(ReadlineError::Interrupted) => Ok(Input::ask_again()),
            Err(ReadlineError::Eof) => Ok(Input::exit()),
            Err(e) => Err(e.into()),
        }
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        match self.editor.readline(question) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn render(&mut self, message: &Message) {
        match message.role {
            Role::Assistant if message.has_text() => {
                println!();
                println!("{}", style(format!("{}:", ASSISTANT_LABEL)).cyan().bold());
                print_markdown(&message.text());
                println!();
            }
            Role::Tool => {
                if let Some(response) = message.tool_response() {
                    let line = format_tool_response(response);
                    if response.is_error {
                        println!("\n{}\n", style(line).red());
                    } else {
                        println!("\n{}\n", style(line).dim());
                    }
                }
            }
            // Tool requests alone have nothing to show
            _ => {}
        }
        let _ = io::stdout().flush();
    }

    fn notice(&mut self, text: &str) {
        println!("{}", text);
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("Thinking...");
    }

    fn hide_busy(&mut self) {
        self.spinner.stop("");
    }
}
