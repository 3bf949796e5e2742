//! Runs one query through every agent configuration, asks the operator to rate
//! the answers and saves the lot as CSV.
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::agent::Agent;
use crate::agents::AgentConfig;
use crate::errors::{AgentError, AgentResult};
use crate::prompt::Prompt;
use crate::session::run_once;

pub const NO_RESPONSE: &str = "No response generated";
const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub agent: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub agent: String,
    pub rating: Option<u8>,
}

#[derive(Debug)]
pub struct Comparison {
    pub responses: Vec<AgentResponse>,
    pub ratings: Vec<Rating>,
    /// Where the results were written, if saving worked
    pub saved_to: Option<PathBuf>,
}

#[derive(Serialize)]
struct Row<'a> {
    query: &'a str,
    agent: &'a str,
    response: &'a str,
    rating: Option<u8>,
}

/// A rating must be a whole number from 1 to 5
pub fn parse_rating(input: &str) -> std::result::Result<u8, &'static str> {
    match input.trim().parse::<i64>() {
        Ok(value) if (1..=5).contains(&value) => Ok(value as u8),
        Ok(_) => Err("Invalid rating. Please enter a number between 1 and 5."),
        Err(_) => Err("Invalid input. Please enter a number."),
    }
}

pub fn comparison_filename(timestamp: NaiveDateTime) -> String {
    timestamp
        .format("agent_comparison_%Y%m%d_%H%M%S.csv")
        .to_string()
}

/// Write one row per agent under a `query,agent,response,rating` header
pub fn export_csv(
    path: &Path,
    query: &str,
    responses: &[AgentResponse],
    ratings: &[Rating],
) -> AgentResult<()> {
    let persistence = |e: csv::Error| AgentError::Persistence(e.to_string());

    let mut writer = csv::Writer::from_path(path).map_err(persistence)?;
    for (i, response) in responses.iter().enumerate() {
        writer
            .serialize(Row {
                query,
                agent: &response.agent,
                response: &response.response,
                rating: ratings.get(i).and_then(|r| r.rating),
            })
            .map_err(persistence)?;
    }
    writer
        .flush()
        .map_err(|e| AgentError::Persistence(e.to_string()))
}

pub fn compare(
    agent: &Agent,
    query: &str,
    prompt: &mut dyn Prompt,
    output_dir: &Path,
) -> Result<Comparison> {
    let mut responses = Vec::new();
    for config in AgentConfig::all() {
        prompt.notice(&format!("\nProcessing with {} agent...\n", config.name));

        prompt.show_busy();
        let conversation = run_once(agent, &config, query);
        prompt.hide_busy();

        let response = match conversation.last_response() {
            Some(text) => {
                prompt.notice(&format!("\n{} response: {}\n", config.name, text));
                text
            }
            None => {
                prompt.notice(&format!("\n{}: {}\n", config.name, NO_RESPONSE));
                NO_RESPONSE.to_string()
            }
        };
        responses.push(AgentResponse {
            agent: config.name,
            response,
        });
    }

    let rule = "=".repeat(RULE_WIDTH);
    prompt.notice(&format!("\n{}\nComparative Results:\n{}", rule, rule));
    for response in &responses {
        prompt.notice(&format!(
            "\n{} Agent:\n{}\n",
            response.agent, response.response
        ));
        prompt.notice(&"-".repeat(RULE_WIDTH));
    }

    prompt.notice("\nPlease rate each response on a scale of 1-5 (1=Poor, 5=Excellent):");
    let mut ratings = Vec::new();
    for response in &responses {
        let answer = prompt.ask(&format!("{} Agent rating (1-5): ", response.agent))?;
        let rating = match answer.as_deref().map(parse_rating) {
            Some(Ok(rating)) => Some(rating),
            Some(Err(reason)) => {
                prompt.notice(reason);
                None
            }
            None => None,
        };
        ratings.push(Rating {
            agent: response.agent.clone(),
            rating,
        });
    }

    let path = output_dir.join(comparison_filename(Local::now().naive_local()));
    let saved_to = match export_csv(&path, query, &responses, &ratings) {
        Ok(()) => {
            prompt.notice(&format!("\nResults saved to {}", path.display()));
            Some(path)
        }
        Err(e) => {
            tracing::error!("{}", e);
            prompt.notice(&format!("Error saving CSV: {}", e));
            None
        }
    };

    Ok(Comparison {
        responses,
        ratings,
        saved_to,
    })
}
