//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod search;
mod serve;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use search::run_search;
pub use serve::{router, run_serve, AppState};
pub use transcript::run_transcript;

use crate::cli::Output;
use crate::orchestrator::Orchestrator;
use crate::session::{Session, VideoInfo};

/// Process a video into the session behind a spinner, reporting the result.
pub(crate) async fn process_with_progress(
    orchestrator: &Orchestrator,
    session: &mut Session,
    video: &str,
    language: Option<&str>,
) -> crate::Result<VideoInfo> {
    let spinner = Output::spinner("Fetching transcript and building the index...");
    let result = orchestrator.process_video(session, video, language).await;
    spinner.finish_and_clear();

    match &result {
        Ok(info) => {
            Output::success("Video processed");
            Output::video_info(info);
            if info.translated {
                Output::warning("No transcript in a supported language; using a machine translation.");
            }
        }
        Err(e) => Output::error(&format!("Failed to process video: {}", e)),
    }

    result
}
