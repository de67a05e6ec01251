//! vidqa CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidqa::cli::{commands, Cli, Commands};
use vidqa::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidqa={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Execute command
    match &cli.command {
        Commands::Chat {
            video,
            language,
            k,
            show_sources,
        } => {
            commands::run_chat(video, language.as_deref(), *k, *show_sources, settings).await?;
        }

        Commands::Ask {
            video,
            question,
            k,
            language,
        } => {
            commands::run_ask(video, question, *k, language.as_deref(), settings).await?;
        }

        Commands::Search {
            video,
            query,
            limit,
            min_score,
            language,
        } => {
            commands::run_search(video, query, *limit, *min_score, language.as_deref(), settings).await?;
        }

        Commands::Transcript {
            video,
            language,
            output,
            format,
        } => {
            commands::run_transcript(video, language.as_deref(), output.clone(), format, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
