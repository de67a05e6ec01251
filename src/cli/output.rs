//! CLI output formatting utilities.

use crate::rag::ContextChunk;
use crate::session::VideoInfo;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print what was indexed for a processed video.
    pub fn video_info(info: &VideoInfo) {
        let title = info.title.as_deref().unwrap_or(&info.video_id);
        let mut language = info.language.clone();
        if info.translated {
            language.push_str(", translated");
        }
        println!(
            "  {} {} ({}, {}, {} chunks, {} characters)",
            style("*").cyan(),
            style(title).bold(),
            style(&info.video_id).dim(),
            language,
            info.chunk_count,
            info.transcript_chars
        );
    }

    /// Print a retrieved chunk.
    pub fn search_result(chunk: &ContextChunk) {
        println!(
            "\n{} #{} @ {} (score: {:.2})",
            style(">>").green(),
            chunk.order + 1,
            style(&chunk.timestamp).cyan(),
            chunk.score
        );
        println!("   {}", content_preview(&chunk.content, 200));
        println!("   {}", style(&chunk.url).dim());
    }

    /// Print the sources of an answer.
    pub fn sources(chunks: &[ContextChunk]) {
        if chunks.is_empty() {
            return;
        }
        println!("\n{}", style("Sources:").dim());
        for chunk in chunks {
            println!(
                "  {} @ {} (score: {:.2}) {}",
                style(format!("#{}", chunk.order + 1)).dim(),
                style(&chunk.timestamp).cyan(),
                chunk.score,
                style(&chunk.url).dim()
            );
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
