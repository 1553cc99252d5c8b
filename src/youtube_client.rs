// YouTube Data API v3 client for reading comments, replies and video metadata
// Docs: https://developers.google.com/youtube/v3

use crate::error::ProviderError;
use crate::models::{CommentKind, CommentRecord};
use crate::services::harvester::{CommentSource, Page, ThreadItem};
use crate::services::pipeline::VideoMetadataSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Error reasons YouTube uses for quota and rate limiting
const RATE_LIMIT_REASONS: [&str; 3] = ["quotaExceeded", "rateLimitExceeded", "userRateLimitExceeded"];

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// Comment Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CommentThreadsResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThread {
    pub id: String,
    pub snippet: CommentThreadSnippet,
    pub replies: Option<CommentReplies>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    pub top_level_comment: Comment,
    #[serde(rename = "totalReplyCount", default)]
    pub total_reply_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct CommentReplies {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct CommentListResponse {
    #[serde(default)]
    pub items: Vec<Comment>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
pub struct CommentSnippet {
    #[serde(rename = "authorDisplayName", default)]
    pub author_display_name: String,
    #[serde(rename = "textDisplay", default)]
    pub text_display: String,
    #[serde(rename = "likeCount", default)]
    pub like_count: u64,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

// ============================================================================
// Video Metadata Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
}

// ============================================================================
// Error Payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Map a failed response onto the provider error taxonomy.
/// Quota exhaustion comes back as 403 with a reason code, so the body matters.
pub fn classify_error(status: u16, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let rate_reason = parsed.as_ref().and_then(|e| {
        e.error
            .errors
            .iter()
            .find(|d| RATE_LIMIT_REASONS.contains(&d.reason.as_str()))
            .map(|d| d.reason.clone())
    });

    match (status, rate_reason) {
        (429, reason) => ProviderError::RateLimited {
            reason: reason.unwrap_or_else(|| "HTTP 429".to_string()),
        },
        (403, Some(reason)) => ProviderError::RateLimited { reason },
        (404, _) => ProviderError::NotFound(message),
        (status, _) => ProviderError::Api { status, message },
    }
}

impl From<Comment> for CommentRecord {
    fn from(comment: Comment) -> Self {
        let snippet = comment.snippet;
        match snippet.parent_id {
            Some(parent_id) => CommentRecord::reply(
                comment.id,
                parent_id,
                snippet.author_display_name,
                snippet.text_display,
                snippet.like_count,
                snippet.published_at,
            ),
            None => CommentRecord::top_level(
                comment.id,
                snippet.author_display_name,
                snippet.text_display,
                snippet.like_count,
                snippet.published_at,
            ),
        }
    }
}

// ============================================================================
// YouTube Client Implementation
// ============================================================================

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("YouTube {} failed with {}: {}", endpoint, status, body);
            return Err(classify_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch one page of comment threads (top-level comments plus embedded replies)
    pub async fn get_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<CommentThreadsResponse, ProviderError> {
        let max_results = max_results.to_string();
        let mut query = vec![
            ("part", "snippet,replies"),
            ("videoId", video_id),
            ("maxResults", max_results.as_str()),
            ("textFormat", "html"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        self.get_json("commentThreads", &query).await
    }

    /// Fetch one page of replies to a top-level comment
    pub async fn get_comment_replies(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<CommentListResponse, ProviderError> {
        let max_results = max_results.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("parentId", parent_id),
            ("maxResults", max_results.as_str()),
            ("textFormat", "html"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        self.get_json("comments", &query).await
    }

    /// Look up the video title
    pub async fn get_video_title(&self, video_id: &str) -> Result<String, ProviderError> {
        let videos: VideoListResponse = self
            .get_json("videos", &[("part", "snippet"), ("id", video_id)])
            .await?;

        videos
            .items
            .into_iter()
            .next()
            .map(|v| v.snippet.title)
            .ok_or_else(|| ProviderError::NotFound(format!("video {}", video_id)))
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page<ThreadItem>, ProviderError> {
        let response = self.get_comment_threads(video_id, page_token, page_size).await?;

        let items = response
            .items
            .into_iter()
            .map(|thread| {
                let parent_id = thread.id.clone();
                let embedded_replies = thread
                    .replies
                    .map(|r| r.comments)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| {
                        let mut record = CommentRecord::from(c);
                        // embedded replies always belong to this thread
                        record.parent_id = Some(parent_id.clone());
                        record.kind = CommentKind::Reply;
                        record
                    })
                    .collect();

                ThreadItem {
                    top_level: CommentRecord::from(thread.snippet.top_level_comment),
                    total_reply_count: thread.snippet.total_reply_count,
                    embedded_replies,
                }
            })
            .collect();

        Ok(Page {
            items,
            next_page_token: response.next_page_token,
        })
    }

    async fn list_replies(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page<CommentRecord>, ProviderError> {
        let response = self.get_comment_replies(parent_id, page_token, page_size).await?;

        let items = response
            .items
            .into_iter()
            .map(|c| {
                let mut record = CommentRecord::from(c);
                record.parent_id = Some(parent_id.to_string());
                record.kind = CommentKind::Reply;
                record
            })
            .collect();

        Ok(Page {
            items,
            next_page_token: response.next_page_token,
        })
    }
}

#[async_trait]
impl VideoMetadataSource for YouTubeClient {
    async fn video_title(&self, video_id: &str) -> Result<String, ProviderError> {
        self.get_video_title(video_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn comment_json(id: &str, author: &str, parent: Option<&str>) -> serde_json::Value {
        let mut snippet = json!({
            "authorDisplayName": author,
            "textDisplay": format!("text of {}", id),
            "textOriginal": format!("text of {}", id),
            "likeCount": 2,
            "publishedAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        });
        if let Some(p) = parent {
            snippet["parentId"] = json!(p);
        }
        json!({ "id": id, "snippet": snippet })
    }

    #[test]
    fn test_classify_quota_exceeded_as_rate_limit() {
        let body = r#"{"error":{"code":403,"message":"quota","errors":[{"reason":"quotaExceeded"}]}}"#;
        let err = classify_error(403, body);
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_classify_comments_disabled_is_api_error() {
        let body = r#"{"error":{"code":403,"message":"disabled","errors":[{"reason":"commentsDisabled"}]}}"#;
        match classify_error(403, body) {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "disabled");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_404_and_plain_429() {
        assert!(matches!(classify_error(404, "gone"), ProviderError::NotFound(_)));
        assert!(classify_error(429, "slow down").is_rate_limited());
    }

    #[tokio::test]
    async fn test_list_comment_threads_maps_embedded_replies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "dQw4w9WgXcQ"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#commentThreadListResponse",
                "nextPageToken": "NEXT",
                "items": [{
                    "id": "t1",
                    "snippet": {
                        "videoId": "dQw4w9WgXcQ",
                        "topLevelComment": comment_json("t1", "alice", None),
                        "canReply": true,
                        "totalReplyCount": 4
                    },
                    "replies": { "comments": [comment_json("t1.a", "bob", Some("t1"))] }
                }]
            })))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url("test-key".into(), server.uri());
        let page = client.list_comment_threads("dQw4w9WgXcQ", None, 100).await.unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("NEXT"));
        assert_eq!(page.items.len(), 1);
        let thread = &page.items[0];
        assert_eq!(thread.top_level.author, "alice");
        assert_eq!(thread.total_reply_count, 4);
        assert_eq!(thread.embedded_replies.len(), 1);
        assert_eq!(thread.embedded_replies[0].parent_id.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_list_replies_passes_page_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(query_param("parentId", "t1"))
            .and(query_param("pageToken", "P2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [comment_json("t1.b", "carol", Some("t1"))]
            })))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url("k".into(), server.uri());
        let page = client.list_replies("t1", Some("P2"), 100).await.unwrap();

        assert!(page.next_page_token.is_none());
        assert_eq!(page.items[0].author, "carol");
        assert!(page.items[0].is_reply());
    }

    #[tokio::test]
    async fn test_quota_error_surfaces_as_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "quota", "errors": [{ "reason": "quotaExceeded" }] }
            })))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url("k".into(), server.uri());
        let err = client.list_comment_threads("dQw4w9WgXcQ", None, 100).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_get_video_title_not_found_on_empty_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url("k".into(), server.uri());
        let err = client.get_video_title("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
