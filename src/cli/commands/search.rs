//! Search command implementation.

use super::process_with_progress;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    video: &str,
    query: &str,
    limit: usize,
    min_score: Option<f32>,
    language: Option<&str>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = Session::new();

    process_with_progress(&orchestrator, &mut session, video, language).await?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator
        .search(&session, query, Some(limit), min_score)
        .await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) => {
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));

                for chunk in &chunks {
                    Output::search_result(chunk);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
