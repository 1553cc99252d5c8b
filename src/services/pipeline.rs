// Run orchestration: URL -> video id -> comments -> export -> verdict -> delivery
// The run returns an immutable report; no step failure escapes to the caller.

use crate::error::{ErrorCategory, ProviderError, ReportedError};
use crate::models::{ModelCandidates, SummaryResult};
use crate::services::delivery::DeliverySink;
use crate::services::export::encode_comments;
use crate::services::harvester::{harvest, harvest_batch, CommentSource, HarvestOptions, HarvestOutcome, ReplyPolicy};
use crate::services::summarizer::{build_verdict_prompt, summarize, PromptInput, TextGenerator, TruncationPolicy};
use crate::transcript_client::TranscriptSource;
use crate::utils::{extract_video_id, report_file_name, DEFAULT_REPORT_NAME};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Video title lookup
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    async fn video_title(&self, video_id: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub harvest: HarvestOptions,
    pub candidates: ModelCandidates,
    pub truncation: TruncationPolicy,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub urls: Vec<String>,
    #[serde(default)]
    pub reply_policy: Option<ReplyPolicy>,
    #[serde(default = "default_true")]
    pub with_transcript: bool,
    #[serde(default = "default_true")]
    pub with_verdict: bool,
    #[serde(default = "default_true")]
    pub deliver: bool,
}

impl RunRequest {
    pub fn for_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            reply_policy: None,
            with_transcript: true,
            with_verdict: true,
            deliver: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub input: String,
    pub video_id: Option<String>,
    pub title: String,
    pub file_name: String,
    pub top_level_count: usize,
    pub reply_count: usize,
    pub quota_spent: u32,
    pub transcript_available: bool,
    pub summary: Option<SummaryResult>,
    pub delivered: Option<bool>,
    pub error: Option<ReportedError>,
    #[serde(skip)]
    pub export: Vec<u8>,
}

impl VideoReport {
    fn skipped(input: &str, video_id: Option<String>, error: ReportedError) -> Self {
        Self {
            input: input.to_string(),
            video_id,
            title: String::new(),
            file_name: DEFAULT_REPORT_NAME.to_string(),
            top_level_count: 0,
            reply_count: 0,
            quota_spent: 0,
            transcript_available: false,
            summary: None,
            delivered: None,
            error: Some(error),
            export: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub videos: Vec<VideoReport>,
    pub total_quota_spent: u32,
}

pub struct Pipeline {
    comments: Arc<dyn CommentSource>,
    metadata: Arc<dyn VideoMetadataSource>,
    transcripts: Option<Arc<dyn TranscriptSource>>,
    generator: Option<Arc<dyn TextGenerator>>,
    delivery: Option<Arc<dyn DeliverySink>>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        comments: Arc<dyn CommentSource>,
        metadata: Arc<dyn VideoMetadataSource>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            comments,
            metadata,
            transcripts: None,
            generator: None,
            delivery: None,
            settings,
        }
    }

    pub fn with_transcripts(mut self, transcripts: Arc<dyn TranscriptSource>) -> Self {
        self.transcripts = Some(transcripts);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn DeliverySink>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn harvest_options(&self, reply_policy: Option<ReplyPolicy>) -> HarvestOptions {
        HarvestOptions {
            reply_policy: reply_policy.unwrap_or(self.settings.harvest.reply_policy),
            ..self.settings.harvest
        }
    }

    /// Harvest comments only, skipping metadata, export, verdict and delivery.
    pub async fn harvest_comments(&self, video_ids: &[String], reply_policy: Option<ReplyPolicy>) -> Vec<HarvestOutcome> {
        let options = self.harvest_options(reply_policy);
        tracing::info!("Harvest-only batch - videos={}, reply_policy={:?}", video_ids.len(), options.reply_policy);
        harvest_batch(self.comments.as_ref(), video_ids, &options).await
    }

    pub fn has_transcripts(&self) -> bool {
        self.transcripts.is_some()
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn has_delivery(&self) -> bool {
        self.delivery.is_some()
    }

    /// Process every input in order; one bad input never stops the others.
    pub async fn run(&self, request: &RunRequest) -> RunReport {
        let pipeline_start = std::time::Instant::now();
        tracing::info!("Pipeline started - inputs={}", request.urls.len());

        let mut videos = Vec::with_capacity(request.urls.len());
        for input in &request.urls {
            videos.push(self.process(input, request).await);
        }

        let total_quota_spent = videos.iter().map(|v| v.quota_spent).sum();
        tracing::info!(
            "Pipeline completed - duration={:.2}s, videos={}, quota_spent={}",
            pipeline_start.elapsed().as_secs_f32(),
            videos.len(),
            total_quota_spent
        );

        RunReport {
            videos,
            total_quota_spent,
        }
    }

    async fn process(&self, input: &str, request: &RunRequest) -> VideoReport {
        let Some(video_id) = extract_video_id(input) else {
            tracing::warn!("Skipping input, no video id found: {}", input);
            return VideoReport::skipped(input, None, ReportedError::bad_input(format!("no video id in '{}'", input)));
        };

        let title = match self.metadata.video_title(&video_id).await {
            Ok(title) => title,
            Err(e) if e.category() == ErrorCategory::NotFoundOrBadInput => {
                tracing::warn!("Skipping {}: {}", video_id, e);
                return VideoReport::skipped(input, Some(video_id), ReportedError::from(&e));
            }
            Err(e) => {
                tracing::warn!("Video metadata unavailable for {}, continuing without title: {}", video_id, e);
                String::new()
            }
        };
        let file_name = report_file_name(&title);

        let transcript = match (&self.transcripts, request.with_transcript) {
            (Some(source), true) => source.fetch_transcript(&video_id).await,
            _ => None,
        };

        let options = self.harvest_options(request.reply_policy);
        let outcome = harvest(self.comments.as_ref(), &video_id, &options).await;

        let mut report = VideoReport {
            input: input.to_string(),
            video_id: Some(video_id.clone()),
            title,
            file_name,
            top_level_count: outcome.top_level_count(),
            reply_count: outcome.reply_count(),
            quota_spent: outcome.quota_spent,
            transcript_available: transcript.is_some(),
            summary: None,
            delivered: None,
            error: outcome.error.as_ref().map(ReportedError::partial),
            export: Vec::new(),
        };

        if outcome.records.is_empty() {
            tracing::warn!("No comments collected for {}, nothing to export", video_id);
            return report;
        }

        match encode_comments(&outcome.records) {
            Ok(bytes) => report.export = bytes,
            Err(e) => {
                tracing::error!("Export failed for {}: {}", video_id, e);
                return report;
            }
        }

        if request.with_verdict {
            if let Some(generator) = &self.generator {
                let truncation = &self.settings.truncation;
                let records = truncation.records(&outcome.records);
                let prompt_input = PromptInput {
                    title: &report.title,
                    transcript: transcript.as_deref().map(|t| truncation.transcript(t)),
                    records: &records,
                };
                let summary = summarize(
                    generator.as_ref(),
                    &prompt_input,
                    &self.settings.candidates,
                    build_verdict_prompt,
                )
                .await;
                report.summary = Some(summary);
            }
        }

        if request.deliver {
            if let Some(sink) = &self.delivery {
                let summary_text = report.summary.as_ref().map(|s| s.text.as_str());
                let delivered = sink.deliver(&report.export, &report.file_name, summary_text).await;
                report.delivered = Some(delivered);
            }
        }

        report
    }
}
