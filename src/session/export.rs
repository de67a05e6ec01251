//! Chat history export.

use super::Session;
use crate::error::{Result, VidQaError};
use crate::rag::ContextChunk;
use chrono::{DateTime, Utc};
use serde::Serialize;

const RULE_WIDTH: usize = 80;

/// Output format for an exported conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Text,
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = VidQaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(VidQaError::InvalidInput(format!(
                "Unknown export format '{}'. Use 'json' or 'text'",
                s
            ))),
        }
    }
}

#[derive(Serialize)]
struct ChatExport<'a> {
    video_id: Option<&'a str>,
    video_title: Option<&'a str>,
    export_date: String,
    messages: Vec<ExportMessage<'a>>,
}

#[derive(Serialize)]
struct ExportMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<&'a [ContextChunk]>,
}

/// Export the session's conversation, or `None` when there is nothing to export.
pub fn export_history(session: &Session, format: ExportFormat) -> Result<Option<String>> {
    export_history_at(session, format, Utc::now())
}

fn export_history_at(
    session: &Session,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    if session.history().is_empty() {
        return Ok(None);
    }

    let info = session.video().map(|v| v.info());
    let video_id = info.map(|i| i.video_id.as_str());
    let video_title = info.and_then(|i| i.title.as_deref());

    let output = match format {
        ExportFormat::Json => {
            let messages: Vec<ExportMessage> = session
                .history()
                .turns()
                .iter()
                .flat_map(|turn| {
                    [
                        ExportMessage {
                            role: "user",
                            content: &turn.question,
                            sources: None,
                        },
                        ExportMessage {
                            role: "assistant",
                            content: &turn.answer,
                            sources: Some(turn.sources.as_slice()),
                        },
                    ]
                })
                .collect();

            serde_json::to_string_pretty(&ChatExport {
                video_id,
                video_title,
                export_date: now.to_rfc3339(),
                messages,
            })?
        }
        ExportFormat::Text => {
            let mut lines = vec![
                "YouTube Video Q&A - Chat History".to_string(),
                format!("Video ID: {}", video_id.unwrap_or("-")),
            ];
            if let Some(title) = video_title {
                lines.push(format!("Title: {}", title));
            }
            lines.push(format!("Date: {}", now.format("%Y-%m-%d %H:%M:%S")));
            lines.push("=".repeat(RULE_WIDTH));
            lines.push(String::new());

            for turn in session.history().turns() {
                for (role, content) in [("You", &turn.question), ("Assistant", &turn.answer)] {
                    lines.push(format!("{}: {}", role, content));
                    lines.push("-".repeat(RULE_WIDTH));
                    lines.push(String::new());
                }
            }

            lines.join("\n")
        }
    };

    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConversationTurn;
    use chrono::TimeZone;

    fn session_with_turn() -> Session {
        let mut session = Session::new();
        session.history.push(ConversationTurn::new(
            "What is it about?".to_string(),
            "Cats.".to_string(),
            vec![],
        ));
        session
    }

    #[test]
    fn test_empty_history_exports_nothing() {
        let session = Session::new();
        assert!(export_history(&session, ExportFormat::Json).unwrap().is_none());
        assert!(export_history(&session, ExportFormat::Text).unwrap().is_none());
    }

    #[test]
    fn test_json_export_alternates_roles() {
        let session = session_with_turn();
        let json = export_history(&session, ExportFormat::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let messages = value["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "What is it about?");
        assert!(messages[0].get("sources").is_none());
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "Cats.");
        assert!(value["export_date"].is_string());
    }

    #[test]
    fn test_text_export_layout() {
        let session = session_with_turn();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let text = export_history_at(&session, ExportFormat::Text, now).unwrap().unwrap();

        assert!(text.starts_with("YouTube Video Q&A - Chat History\nVideo ID: -\n"));
        assert!(text.contains("Date: 2024-03-01 12:30:00"));
        assert!(text.contains(&"=".repeat(80)));
        assert!(text.contains("You: What is it about?\n"));
        assert!(text.contains("Assistant: Cats.\n"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Text.extension(), "txt");
    }
}
