//! YouTube caption transcript fetcher.
//!
//! Resolves caption tracks through the InnerTube player endpoint and downloads
//! the chosen track as timedtext XML.

use super::{Transcript, TranscriptFetcher, TranscriptSegment, VideoReference};
use crate::error::{Result, VidQaError};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

fn api_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key regex")
    })
}

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid markup regex"))
}

/// Fetches caption transcripts from YouTube.
pub struct YoutubeTranscriptFetcher {
    client: reqwest::Client,
    translate_fallback: bool,
    translation_target: String,
}

impl YoutubeTranscriptFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36")
            .build()
            .map_err(|e| VidQaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            translate_fallback: true,
            translation_target: "en".to_string(),
        })
    }

    /// Configure the translation fallback used when no supported language exists.
    pub fn with_translation(mut self, enabled: bool, target: &str) -> Self {
        self.translate_fallback = enabled;
        self.translation_target = target.to_string();
        self
    }

    /// Read the InnerTube API key from the watch page.
    async fn fetch_api_key(&self, video: &VideoReference) -> Result<String> {
        let html = self
            .client
            .get(video.watch_url())
            .header("Accept-Language", "en-US")
            .header("Cookie", "CONSENT=YES+cb")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_api_key(video, &html)
    }

    /// Fetch the InnerTube player response for a video.
    async fn fetch_player(&self, video: &VideoReference, api_key: &str) -> Result<PlayerResponse> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video.video_id(),
        });

        let response = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<PlayerResponse>()
            .await?;

        Ok(response)
    }

    /// Download a caption track and parse its segments.
    async fn fetch_track(&self, base_url: &str) -> Result<Vec<TranscriptSegment>> {
        let url = base_url.replace("&fmt=srv3", "");
        let xml = self
            .client
            .get(url)
            .header("Accept-Language", "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_timedtext(&xml))
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscriptFetcher {
    #[instrument(skip(self, languages), fields(video_id = %video))]
    async fn fetch(&self, video: &VideoReference, languages: &[String]) -> Result<Transcript> {
        let api_key = self.fetch_api_key(video).await?;
        let player = self.fetch_player(video, &api_key).await?;

        check_playability(video, player.playability_status.as_ref())?;

        let title = player.video_details.as_ref().and_then(|d| d.title.clone());
        let tracklist = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .unwrap_or_default();

        let fallback = self.translate_fallback.then_some(self.translation_target.as_str());
        let choice = choose_track(video, &tracklist, languages, fallback)?;
        if choice.translated {
            info!("Translating captions to {}", choice.language_code);
        }

        debug!("Downloading caption track {}", choice.language_code);
        let segments = self.fetch_track(&choice.base_url).await?;
        if segments.is_empty() {
            warn!("Caption track {} for {} was empty", choice.language_code, video);
        }

        Ok(Transcript::new(video.video_id().to_string(), &choice.language_code, segments)
            .with_title(title)
            .with_language_name(choice.language)
            .generated(choice.is_generated)
            .translated(choice.translated))
    }
}

/// Find the InnerTube API key in a watch page.
fn extract_api_key(video: &VideoReference, html: &str) -> Result<String> {
    if let Some(caps) = api_key_regex().captures(html) {
        return Ok(caps[1].to_string());
    }

    if html.contains("class=\"g-recaptcha\"") {
        return Err(VidQaError::Upstream(
            "YouTube is rate limiting requests from this IP (captcha required)".to_string(),
        ));
    }

    Err(VidQaError::InvalidVideoReference(format!(
        "Video {} is unavailable",
        video
    )))
}

/// The caption track to download.
#[derive(Debug)]
struct TrackChoice {
    base_url: String,
    language_code: String,
    language: String,
    is_generated: bool,
    translated: bool,
}

/// Decide which track to download.
///
/// Tracks in `languages` are preferred. Otherwise, when `translate_to` is set,
/// the first track is machine-translated if YouTube allows it.
fn choose_track(
    video: &VideoReference,
    tracklist: &TracklistRenderer,
    languages: &[String],
    translate_to: Option<&str>,
) -> Result<TrackChoice> {
    let Some(first) = tracklist.caption_tracks.first() else {
        return Err(VidQaError::TranscriptUnavailable(format!(
            "Transcripts are disabled for video {}",
            video
        )));
    };

    if let Some(track) = select_track(&tracklist.caption_tracks, languages) {
        return Ok(TrackChoice {
            base_url: track.base_url.clone(),
            language_code: track.language_code.clone(),
            language: track.name.text(),
            is_generated: track.is_generated(),
            translated: false,
        });
    }

    let target = match translate_to {
        Some(target) if first.is_translatable => target,
        _ => {
            return Err(VidQaError::TranscriptUnavailable(format!(
                "No transcript in {} found for video {}, and translation is not available",
                languages.join(", "),
                video
            )))
        }
    };

    let target_name = tracklist
        .translation_languages
        .iter()
        .find(|l| l.language_code == target)
        .map(|l| l.language_name.text())
        .unwrap_or_else(|| target.to_string());

    Ok(TrackChoice {
        base_url: format!("{}&tlang={}", first.base_url, target),
        language_code: target.to_string(),
        language: format!("{} (translated to {})", first.name.text(), target_name),
        is_generated: first.is_generated(),
        translated: true,
    })
}

/// Map a non-playable status to an error.
fn check_playability(video: &VideoReference, status: Option<&PlayabilityStatus>) -> Result<()> {
    let Some(status) = status else {
        return Ok(());
    };

    let reason = status
        .reason
        .clone()
        .unwrap_or_else(|| status.status.to_lowercase());

    match status.status.as_str() {
        "OK" => Ok(()),
        "ERROR" => Err(VidQaError::InvalidVideoReference(format!(
            "Video {} is unavailable: {}",
            video, reason
        ))),
        _ => Err(VidQaError::TranscriptUnavailable(format!(
            "Video {} cannot be played: {}",
            video, reason
        ))),
    }
}

/// Pick a track in preference order; per language, manual captions win over generated ones.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let matching = |generated: bool| {
            tracks
                .iter()
                .find(|t| t.language_code.eq_ignore_ascii_case(lang) && t.is_generated() == generated)
        };
        matching(false).or_else(|| matching(true))
    })
}

/// Parse timedtext XML (`<text start="" dur="">...</text>`) into segments.
pub fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    let fragment = Html::parse_fragment(xml);
    let Ok(selector) = Selector::parse("text") else {
        return Vec::new();
    };

    fragment
        .select(&selector)
        .filter_map(|element| {
            let start = element
                .value()
                .attr("start")
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.0);
            let duration = element
                .value()
                .attr("dur")
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.0);

            let raw: String = element.text().collect();
            let text = markup_regex().replace_all(&raw, "").trim().to_string();

            (!text.is_empty()).then(|| TranscriptSegment::new(start, duration, text))
        })
        .collect()
}

// === InnerTube response types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
    #[serde(default)]
    translation_languages: Vec<TranslationLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    name: TextRuns,
    language_code: String,
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationLanguage {
    language_code: String,
    #[serde(default)]
    language_name: TextRuns,
}

/// InnerTube text: either `simpleText` or a list of `runs`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRuns {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TextRuns {
    fn text(&self) -> String {
        match &self.simple_text {
            Some(text) => text.clone(),
            None => self.runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_JSON: &str = r#"{
        "playabilityStatus": {"status": "OK"},
        "videoDetails": {"title": "All About Cats"},
        "captions": {
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [
                    {"baseUrl": "https://yt/api/timedtext?v=x&lang=en&kind=asr", "name": {"runs": [{"text": "English (auto-generated)"}]}, "languageCode": "en", "kind": "asr", "isTranslatable": true},
                    {"baseUrl": "https://yt/api/timedtext?v=x&lang=en", "name": {"simpleText": "English"}, "languageCode": "en", "isTranslatable": true},
                    {"baseUrl": "https://yt/api/timedtext?v=x&lang=hi&kind=asr", "name": {"simpleText": "Hindi (auto-generated)"}, "languageCode": "hi", "kind": "asr", "isTranslatable": true}
                ],
                "translationLanguages": [
                    {"languageCode": "en", "languageName": {"simpleText": "English"}}
                ]
            }
        }
    }"#;

    fn tracks() -> Vec<CaptionTrack> {
        let player: PlayerResponse = serde_json::from_str(PLAYER_JSON).unwrap();
        player
            .captions
            .unwrap()
            .player_captions_tracklist_renderer
            .unwrap()
            .caption_tracks
    }

    fn tracklist() -> TracklistRenderer {
        let player: PlayerResponse = serde_json::from_str(PLAYER_JSON).unwrap();
        player.captions.unwrap().player_captions_tracklist_renderer.unwrap()
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_player_response_parsing() {
        let player: PlayerResponse = serde_json::from_str(PLAYER_JSON).unwrap();
        assert_eq!(player.video_details.unwrap().title.as_deref(), Some("All About Cats"));

        let tracks = tracks();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].name.text(), "English (auto-generated)");
        assert!(tracks[0].is_generated());
        assert!(!tracks[1].is_generated());
    }

    #[test]
    fn test_select_track_prefers_language_order() {
        let tracks = tracks();

        // Hindi comes first in the preference list, so its generated track wins
        let track = select_track(&tracks, &langs(&["hi", "en"])).unwrap();
        assert_eq!(track.language_code, "hi");

        // Within one language, manual captions beat generated ones
        let track = select_track(&tracks, &langs(&["en", "hi"])).unwrap();
        assert_eq!(track.language_code, "en");
        assert!(!track.is_generated());

        assert!(select_track(&tracks, &langs(&["fr"])).is_none());
    }

    #[test]
    fn test_choose_track_in_supported_language() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        let choice = choose_track(&video, &tracklist(), &langs(&["en"]), Some("en")).unwrap();
        assert!(!choice.translated);
        assert!(!choice.is_generated);
        assert_eq!(choice.language_code, "en");
        assert_eq!(choice.language, "English");
        assert_eq!(choice.base_url, "https://yt/api/timedtext?v=x&lang=en");
    }

    #[test]
    fn test_choose_track_without_tracks() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        let err = choose_track(&video, &TracklistRenderer::default(), &langs(&["en"]), Some("en")).unwrap_err();
        assert!(matches!(err, VidQaError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_choose_track_translates_first_track() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        let choice = choose_track(&video, &tracklist(), &langs(&["fr"]), Some("en")).unwrap();
        assert!(choice.translated);
        assert!(choice.is_generated);
        assert_eq!(choice.language_code, "en");
        assert_eq!(choice.language, "English (auto-generated) (translated to English)");
        assert!(choice.base_url.ends_with("&tlang=en"));
    }

    #[test]
    fn test_choose_track_translation_disabled_or_not_allowed() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        let err = choose_track(&video, &tracklist(), &langs(&["fr"]), None).unwrap_err();
        assert!(matches!(err, VidQaError::TranscriptUnavailable(_)));

        let mut tracklist = tracklist();
        tracklist.caption_tracks[0].is_translatable = false;
        let err = choose_track(&video, &tracklist, &langs(&["fr"]), Some("en")).unwrap_err();
        assert!(matches!(err, VidQaError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_extract_api_key() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaKey_123"});</script>"#;
        assert_eq!(extract_api_key(&video, html).unwrap(), "AIzaKey_123");

        // A captcha page is a transient upstream failure, not a missing transcript
        let captcha = r#"<form><div class="g-recaptcha" data-sitekey="x"></div></form>"#;
        assert!(matches!(extract_api_key(&video, captcha), Err(VidQaError::Upstream(_))));

        assert!(matches!(
            extract_api_key(&video, "<html></html>"),
            Err(VidQaError::InvalidVideoReference(_))
        ));
    }

    #[test]
    fn test_check_playability() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        assert!(check_playability(&video, None).is_ok());

        let ok = PlayabilityStatus { status: "OK".to_string(), reason: None };
        assert!(check_playability(&video, Some(&ok)).is_ok());

        let missing = PlayabilityStatus {
            status: "ERROR".to_string(),
            reason: Some("Video unavailable".to_string()),
        };
        assert!(matches!(
            check_playability(&video, Some(&missing)),
            Err(VidQaError::InvalidVideoReference(_))
        ));

        let restricted = PlayabilityStatus {
            status: "LOGIN_REQUIRED".to_string(),
            reason: None,
        };
        assert!(matches!(
            check_playability(&video, Some(&restricted)),
            Err(VidQaError::TranscriptUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.5" dur="2.1">Hello &amp; welcome</text>
            <text start="2.6" dur="1.9">it&#39;s about &lt;i&gt;cats&lt;/i&gt;</text>
            <text start="4.5" dur="1.0">   </text>
            <text start="5.5">no duration</text>
        </transcript>"#;

        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "Hello & welcome");
        assert_eq!(segments[0].start_seconds, 0.5);
        assert_eq!(segments[0].duration_seconds, 2.1);
        assert_eq!(segments[1].text, "it's about cats");
        assert_eq!(segments[2].duration_seconds, 0.0);
    }

    #[test]
    fn test_parse_timedtext_empty() {
        assert!(parse_timedtext("").is_empty());
        assert!(parse_timedtext("<transcript></transcript>").is_empty());
    }
}
