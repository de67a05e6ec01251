//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::{format_timestamp, Transcript};
use anyhow::Result;

/// Output format for the transcript command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranscriptFormat {
    Text,
    Json,
}

impl std::str::FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(TranscriptFormat::Text),
            "json" => Ok(TranscriptFormat::Json),
            _ => Err(format!("Unknown format '{}'. Use 'text' or 'json'", s)),
        }
    }
}

fn render(transcript: &Transcript, format: TranscriptFormat) -> Result<String> {
    Ok(match format {
        TranscriptFormat::Text => transcript.format_with_timestamps(),
        TranscriptFormat::Json => serde_json::to_string_pretty(transcript)?,
    })
}

/// Run the transcript command.
pub async fn run_transcript(
    video: &str,
    language: Option<&str>,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let format: TranscriptFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    preflight::check(Operation::Transcript, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript...");
    let result = orchestrator.fetch_transcript(video, language).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(transcript) => transcript,
        Err(e) => {
            Output::error(&format!("Failed to fetch transcript: {}", e));
            return Err(e.into());
        }
    };

    if transcript.translated {
        Output::warning("No transcript in a supported language; showing a machine translation.");
    }

    let output_str = render(&transcript, format)?;

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Saved {} transcript to {} ({} segments, {} characters, {} long)",
                transcript.language,
                path,
                transcript.segments.len(),
                transcript.char_count(),
                format_timestamp(transcript.duration_seconds())
            ));
        }
        _ => {
            println!("{}", output_str);
        }
    }

    Ok(())
}
