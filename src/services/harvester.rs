// Comment harvester
// Walks the comment-thread pages of a video and collects top-level comments and
// their replies, charging one quota unit per page request.

use crate::error::ProviderError;
use crate::models::CommentRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Platform maximum for `maxResults` on both comment endpoints
pub const MAX_PAGE_SIZE: u32 = 100;
/// Top-level cap applied by the service configuration when `MAX_COMMENTS` is unset.
/// The library default pages until the platform stops returning a token.
pub const DEFAULT_MAX_TOP_LEVEL: usize = 200;

/// One page returned by the comment provider
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// A comment thread as listed on a thread page
#[derive(Debug, Clone)]
pub struct ThreadItem {
    pub top_level: CommentRecord,
    pub total_reply_count: u32,
    /// Replies bundled in the thread payload (platform-limited, usually a handful)
    pub embedded_replies: Vec<CommentRecord>,
}

/// Source of comment pages. Every call is one quota unit on the platform side.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page<ThreadItem>, ProviderError>;

    async fn list_replies(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page<CommentRecord>, ProviderError>;
}

/// How replies are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPolicy {
    /// Only replies embedded in the thread page, no extra requests
    #[default]
    Lazy,
    /// Page through every reply of every thread that has any
    Exhaustive,
}

impl FromStr for ReplyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(ReplyPolicy::Lazy),
            "exhaustive" | "deep" => Ok(ReplyPolicy::Exhaustive),
            other => Err(format!("unknown reply policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestOptions {
    pub reply_policy: ReplyPolicy,
    pub page_size: u32,
    pub reply_page_size: u32,
    /// Stop requesting thread pages once this many top-level comments are collected
    pub max_top_level: Option<usize>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            reply_policy: ReplyPolicy::Lazy,
            page_size: MAX_PAGE_SIZE,
            reply_page_size: MAX_PAGE_SIZE,
            max_top_level: None,
        }
    }
}

impl HarvestOptions {
    pub fn with_policy(reply_policy: ReplyPolicy) -> Self {
        Self {
            reply_policy,
            ..Self::default()
        }
    }
}

/// Result of harvesting one video. When `error` is set the records are partial.
#[derive(Debug)]
pub struct HarvestOutcome {
    pub video_id: String,
    pub records: Vec<CommentRecord>,
    pub quota_spent: u32,
    pub thread_pages: u32,
    pub reply_pages: u32,
    pub error: Option<ProviderError>,
}

impl HarvestOutcome {
    fn new(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            records: Vec::new(),
            quota_spent: 0,
            thread_pages: 0,
            reply_pages: 0,
            error: None,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }

    pub fn top_level_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_reply()).count()
    }

    pub fn reply_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_reply()).count()
    }
}

/// Harvest every comment of `video_id` according to `options`.
///
/// Never fails: a provider error stops the walk and is stored on the outcome
/// next to whatever was collected before it. Rate limits are not retried.
pub async fn harvest<S>(source: &S, video_id: &str, options: &HarvestOptions) -> HarvestOutcome
where
    S: CommentSource + ?Sized,
{
    let start = std::time::Instant::now();
    let mut outcome = HarvestOutcome::new(video_id);

    tracing::info!(
        video_id = %video_id,
        policy = ?options.reply_policy,
        "starting comment harvest"
    );

    if let Err(e) = collect_threads(source, video_id, options, &mut outcome).await {
        tracing::error!(
            video_id = %video_id,
            category = ?e.category(),
            collected = outcome.records.len(),
            "harvest aborted, keeping partial data: {}",
            e
        );
        outcome.error = Some(e);
    }

    tracing::info!(
        video_id = %video_id,
        top_level = outcome.top_level_count(),
        replies = outcome.reply_count(),
        quota_spent = outcome.quota_spent,
        duration_ms = %start.elapsed().as_millis(),
        "comment harvest finished"
    );

    outcome
}

/// Harvest several videos in order. A failing video keeps its partial data
/// and the batch moves on.
pub async fn harvest_batch<S>(
    source: &S,
    video_ids: &[String],
    options: &HarvestOptions,
) -> Vec<HarvestOutcome>
where
    S: CommentSource + ?Sized,
{
    let mut outcomes = Vec::with_capacity(video_ids.len());
    for video_id in video_ids {
        outcomes.push(harvest(source, video_id, options).await);
    }
    outcomes
}

async fn collect_threads<S>(
    source: &S,
    video_id: &str,
    options: &HarvestOptions,
    outcome: &mut HarvestOutcome,
) -> Result<(), ProviderError>
where
    S: CommentSource + ?Sized,
{
    let page_size = options.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut page_token: Option<String> = None;
    let mut top_level_seen = 0usize;

    loop {
        outcome.quota_spent += 1;
        outcome.thread_pages += 1;
        let page = source
            .list_comment_threads(video_id, page_token.as_deref(), page_size)
            .await?;

        tracing::debug!(
            video_id = %video_id,
            page = outcome.thread_pages,
            threads = page.items.len(),
            "thread page fetched"
        );

        for thread in page.items {
            let parent_id = thread.top_level.id.clone();
            let expected = thread.total_reply_count as usize;
            outcome.records.push(thread.top_level);
            top_level_seen += 1;

            if expected == 0 {
                continue;
            }

            match options.reply_policy {
                ReplyPolicy::Lazy => {
                    outcome
                        .records
                        .extend(thread.embedded_replies.into_iter().take(expected));
                }
                ReplyPolicy::Exhaustive => {
                    collect_replies(source, &parent_id, expected, options, outcome).await?;
                }
            }
        }

        if let Some(max) = options.max_top_level {
            if top_level_seen >= max {
                tracing::debug!(video_id = %video_id, max, "top-level cap reached");
                break;
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(())
}

async fn collect_replies<S>(
    source: &S,
    parent_id: &str,
    expected: usize,
    options: &HarvestOptions,
    outcome: &mut HarvestOutcome,
) -> Result<(), ProviderError>
where
    S: CommentSource + ?Sized,
{
    let page_size = options.reply_page_size.clamp(1, MAX_PAGE_SIZE);
    let mut page_token: Option<String> = None;
    let mut emitted = 0usize;

    loop {
        outcome.quota_spent += 1;
        outcome.reply_pages += 1;
        let page = source
            .list_replies(parent_id, page_token.as_deref(), page_size)
            .await?;

        for reply in page.items {
            if emitted >= expected {
                break;
            }
            outcome.records.push(reply);
            emitted += 1;
        }

        // the reported reply count is an upper bound
        if emitted >= expected {
            break;
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(())
}
