// Caption transcript fetcher
// Uses the public player endpoint to discover caption tracks, then downloads
// the preferred track in json3 format and flattens it into plain text.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

/// Optional transcript lookup; `None` when captions are missing or disabled
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str) -> Option<String>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    captions: Option<Captions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
}

#[derive(Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Deserialize)]
struct Json3Event {
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptClient {
    client: Client,
    base_url: String,
    languages: Vec<String>,
}

impl TranscriptClient {
    /// Client preferring Russian, then English captions
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), vec!["ru".into(), "en".into()])
    }

    pub fn with_base_url(base_url: String, languages: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            languages,
        }
    }

    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, reqwest::Error> {
        let url = format!("{}/youtubei/v1/player", self.base_url);
        let body = json!({
            "context": { "client": { "clientName": CLIENT_NAME, "clientVersion": CLIENT_VERSION } },
            "videoId": video_id,
        });

        let player: PlayerResponse = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default())
    }

    async fn download_track(&self, track: &CaptionTrack) -> Result<String, reqwest::Error> {
        let transcript: Json3Transcript = self
            .client
            .get(&track.base_url)
            .query(&[("fmt", "json3")])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(flatten_segments(transcript))
    }
}

impl Default for TranscriptClient {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_segments(transcript: Json3Transcript) -> String {
    transcript
        .events
        .into_iter()
        .filter_map(|e| e.segs)
        .flatten()
        .map(|s| s.utf8.replace('\n', " "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First track whose language matches the preference order
fn pick_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages
        .iter()
        .find_map(|lang| tracks.iter().find(|t| &t.language_code == lang))
}

#[async_trait]
impl TranscriptSource for TranscriptClient {
    async fn fetch_transcript(&self, video_id: &str) -> Option<String> {
        let tracks = match self.caption_tracks(video_id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!("Caption lookup failed for {}: {}", video_id, e);
                return None;
            }
        };

        let Some(track) = pick_track(&tracks, &self.languages) else {
            tracing::info!(
                "No {} captions for {} ({} tracks available)",
                self.languages.join("/"),
                video_id,
                tracks.len()
            );
            return None;
        };

        match self.download_track(track).await {
            Ok(text) if !text.is_empty() => {
                tracing::info!("Transcript fetched for {} ({}, {} chars)", video_id, track.language_code, text.chars().count());
                Some(text)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Transcript download failed for {}: {}", video_id, e);
                None
            }
        }
    }
}
