//! CLI module for vidqa.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// vidqa - Ask questions about YouTube videos
///
/// Fetches a video's transcript, indexes it, and answers questions about it
/// using retrieval-augmented generation.
#[derive(Parser, Debug)]
#[command(name = "vidqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIDQA_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a video and start an interactive chat about it
    Chat {
        /// YouTube URL or video ID
        video: String,

        /// Preferred transcript language (e.g. hi, en)
        #[arg(short, long)]
        language: Option<String>,

        /// Number of transcript chunks used per answer
        #[arg(short)]
        k: Option<usize>,

        /// Show the source chunks after each answer
        #[arg(short, long)]
        show_sources: bool,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube URL or video ID
        video: String,

        /// The question to ask
        question: String,

        /// Number of transcript chunks used for the answer
        #[arg(short)]
        k: Option<usize>,

        /// Preferred transcript language (e.g. hi, en)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Search a video's transcript for relevant passages
    Search {
        /// YouTube URL or video ID
        video: String,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (-1.0 to 1.0)
        #[arg(short, long)]
        min_score: Option<f32>,

        /// Preferred transcript language (e.g. hi, en)
        #[arg(long)]
        language: Option<String>,
    },

    /// Fetch and print a video's transcript
    Transcript {
        /// YouTube URL or video ID
        video: String,

        /// Preferred transcript language (e.g. hi, en)
        #[arg(short, long)]
        language: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "retrieval.top_k")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat() {
        let cli = Cli::try_parse_from(["vidqa", "-vv", "chat", "dQw4w9WgXcQ", "-k", "6", "--show-sources"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Chat {
                video,
                language,
                k,
                show_sources,
            } => {
                assert_eq!(video, "dQw4w9WgXcQ");
                assert_eq!(language, None);
                assert_eq!(k, Some(6));
                assert!(show_sources);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["vidqa", "search", "dQw4w9WgXcQ", "cats"]).unwrap();
        match cli.command {
            Commands::Search { limit, min_score, .. } => {
                assert_eq!(limit, 5);
                assert_eq!(min_score, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
