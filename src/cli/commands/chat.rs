//! Interactive chat about one video.

use super::process_with_progress;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::{export_history, ExportFormat, Session};
use crate::transcript::VideoReference;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Canned questions offered as shortcuts.
const QUICK_QUESTIONS: &[(&str, &str)] = &[
    ("/summary", "Summarize the video"),
    ("/keypoints", "What are the key points?"),
    ("/people", "Who is mentioned?"),
    ("/topics", "What topics are discussed?"),
];

/// A line of REPL input.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Empty,
    Exit,
    Help,
    ToggleSources,
    SetK(usize),
    History,
    Export { path: String, format: ExportFormat },
    Video(String),
    Reset,
    Ask(String),
    Invalid(String),
}

impl ReplCommand {
    fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return ReplCommand::Empty;
        }

        if let Some((_, question)) = QUICK_QUESTIONS.iter().find(|(cmd, _)| input.eq_ignore_ascii_case(cmd)) {
            return ReplCommand::Ask(question.to_string());
        }

        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        match (command.as_str(), args.as_slice()) {
            ("exit" | "quit", []) => ReplCommand::Exit,
            ("help", []) => ReplCommand::Help,
            ("sources", []) => ReplCommand::ToggleSources,
            ("history", []) => ReplCommand::History,
            ("reset", []) => ReplCommand::Reset,
            ("k", [n]) => match n.parse::<usize>() {
                Ok(0) => ReplCommand::Invalid("k must be at least 1".to_string()),
                Ok(k) => ReplCommand::SetK(k),
                Err(_) => ReplCommand::Ask(input.to_string()),
            },
            ("video", [reference]) if VideoReference::parse(reference).is_ok() => {
                ReplCommand::Video(reference.to_string())
            }
            ("export", [path]) => match format_from_path(path) {
                Some(format) => ReplCommand::Export {
                    path: path.to_string(),
                    format,
                },
                None => ReplCommand::Ask(input.to_string()),
            },
            ("export", [path, format]) => match format.parse() {
                Ok(format) => ReplCommand::Export {
                    path: path.to_string(),
                    format,
                },
                Err(_) => ReplCommand::Ask(input.to_string()),
            },
            _ => ReplCommand::Ask(input.to_string()),
        }
    }
}

/// Export format implied by a file extension.
fn format_from_path(path: &str) -> Option<ExportFormat> {
    let (_, extension) = path.rsplit_once('.')?;
    extension.parse().ok()
}

fn print_help() {
    println!("{}", style("Commands:").bold());
    Output::kv("exit, quit", "leave the chat");
    Output::kv("sources", "toggle showing source chunks");
    Output::kv("k <n>", "use n chunks per answer");
    Output::kv("history", "show the conversation so far");
    Output::kv("export <file.json|file.txt> [json|text]", "save the conversation");
    Output::kv("video <url or id>", "switch to another video");
    Output::kv("reset", "drop the video and conversation");
    for (cmd, question) in QUICK_QUESTIONS {
        Output::kv(cmd, question);
    }
}

/// Run the interactive chat command.
pub async fn run_chat(
    video: &str,
    language: Option<&str>,
    k: Option<usize>,
    show_sources: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = Session::new();
    let mut k = k;
    let mut show_sources = show_sources;

    process_with_progress(&orchestrator, &mut session, video, language).await?;

    println!("\n{}", style("vidqa chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the video, 'help' for commands, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match ReplCommand::parse(&input) {
            ReplCommand::Empty => continue,

            ReplCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }

            ReplCommand::Help => print_help(),

            ReplCommand::ToggleSources => {
                show_sources = !show_sources;
                Output::info(if show_sources { "Showing sources." } else { "Hiding sources." });
            }

            ReplCommand::SetK(n) => {
                k = Some(n);
                Output::info(&format!("Using {} chunks per answer.", n));
            }

            ReplCommand::History => {
                if session.history().is_empty() {
                    Output::info("No conversation yet.");
                }
                for (i, turn) in session.history().turns().iter().enumerate() {
                    println!(
                        "{} {}",
                        style(format!("[{}] You:", i + 1)).green().bold(),
                        turn.question
                    );
                    println!("{} {}\n", style("    Assistant:").cyan().bold(), turn.answer);
                }
            }

            ReplCommand::Export { path, format } => match export_history(&session, format) {
                Ok(Some(content)) => match std::fs::write(&path, content) {
                    Ok(()) => Output::success(&format!(
                        "Exported {} turns to {}",
                        session.history().len(),
                        path
                    )),
                    Err(e) => Output::error(&format!("Failed to write {}: {}", path, e)),
                },
                Ok(None) => Output::warning("Nothing to export yet."),
                Err(e) => Output::error(&format!("Export failed: {}", e)),
            },

            ReplCommand::Video(reference) => {
                // Failures keep the current video and conversation
                if process_with_progress(&orchestrator, &mut session, &reference, language)
                    .await
                    .is_ok()
                {
                    Output::info("Conversation cleared for the new video.");
                }
            }

            ReplCommand::Reset => {
                session.reset();
                Output::info("Session reset. Use 'video <url or id>' to load a video.");
            }

            ReplCommand::Ask(question) => {
                let spinner = Output::spinner("Thinking...");
                let result = orchestrator.ask(&mut session, &question, k).await;
                spinner.finish_and_clear();

                match result {
                    Ok(response) => {
                        println!("\n{} {}\n", style("Assistant:").cyan().bold(), response.answer);
                        if show_sources {
                            Output::sources(&response.sources);
                            println!();
                        }
                    }
                    Err(e) => {
                        Output::error(&format!("Error: {}", e));
                    }
                }
            }

            ReplCommand::Invalid(message) => Output::warning(&message),
        }
    }

    Ok(())
}
