use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use weather_agent::agent::Agent;
use weather_agent::agents::{AgentConfig, Strategy};
use weather_agent::compare::compare;
use weather_agent::prompt::rustyline::RustylinePrompt;
use weather_agent::prompt::Prompt;
use weather_agent::providers::base::Provider;
use weather_agent::providers::openai::OpenAiProvider;
use weather_agent::providers::weather::WeatherClient;
use weather_agent::session::Session;
use weather_agent::tools::builtin_registry;

const MENU: &str = "Choose an option:
1: Basic Weather Assistant
2: Chain of Thought Agent
3: ReAct Agent
4: Comparative Evaluation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Basic,
    ChainOfThought,
    React,
    Compare,
}

impl Mode {
    fn from_menu(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Mode::Basic),
            "2" => Some(Mode::ChainOfThought),
            "3" => Some(Mode::React),
            "4" => Some(Mode::Compare),
            _ => None,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Start this mode instead of showing the menu
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Query for the comparative evaluation
    #[arg(short, long)]
    query: Option<String>,

    /// Directory the comparison CSV is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn choose_mode(prompt: &mut dyn Prompt) -> Result<Mode> {
    prompt.notice(MENU);
    let choice = prompt.ask("Your choice: ")?;
    match choice.as_deref().and_then(Mode::from_menu) {
        Some(mode) => Ok(mode),
        None => {
            prompt.notice("Invalid choice. Defaulting to Basic agent.");
            Ok(Mode::Basic)
        }
    }
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let provider = OpenAiProvider::from_env().context("Failed to configure the model API")?;
    info!(model = provider.model(), "model configured");
    let weather = WeatherClient::from_env().context("Failed to configure the weather API")?;

    let registry = Arc::new(builtin_registry(Arc::new(weather))?);
    let agent = Agent::new(Box::new(provider), registry);
    let mut prompt = RustylinePrompt::new()?;

    let mode = match cli.mode {
        Some(mode) => mode,
        None => choose_mode(&mut prompt)?,
    };

    let strategy = match mode {
        Mode::Basic => Strategy::Basic,
        Mode::ChainOfThought => Strategy::ChainOfThought,
        Mode::React => Strategy::React,
        Mode::Compare => {
            let query = match cli.query {
                Some(query) => query,
                None => prompt
                    .ask("\nEnter a query to compare all three agents: ")?
                    .unwrap_or_default(),
            };
            compare(&agent, &query, &mut prompt, &cli.output_dir)?;
            return Ok(());
        }
    };

    Session::new(&agent, AgentConfig::for_strategy(strategy), &mut prompt).start()
}
