//! Ask command implementation.

use super::process_with_progress;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    video: &str,
    question: &str,
    k: Option<usize>,
    language: Option<&str>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = Session::new();

    process_with_progress(&orchestrator, &mut session, video, language).await?;

    let spinner = Output::spinner("Thinking...");

    match orchestrator.ask(&mut session, question, k).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.format_for_display());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
