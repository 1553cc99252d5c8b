// Summary generator
// Builds the verdict prompt once and walks the model candidates in priority
// order until one returns text. Failed candidates are skipped, never retried.

use crate::error::GenerationError;
use crate::gemini_client::{GenerationConfig, VERDICT_GENERATION_CONFIG};
use crate::models::{CommentRecord, ModelCandidates, SummaryResult};
use crate::utils::truncate_chars;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError>;
}

/// Everything the prompt builder may look at
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub title: &'a str,
    pub transcript: Option<&'a str>,
    pub records: &'a [CommentRecord],
}

/// How much of a harvest goes into the prompt: at most `max_records`
/// records, each text cut to `max_text_chars` characters, and the transcript
/// cut to `max_transcript_chars` characters. Top-level comments fill the
/// record budget first (in harvest order); replies only take what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    pub max_records: usize,
    pub max_text_chars: usize,
    pub max_transcript_chars: usize,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            max_records: 100,
            max_text_chars: 200,
            max_transcript_chars: 15_000,
        }
    }
}

impl TruncationPolicy {
    pub fn records(&self, records: &[CommentRecord]) -> Vec<CommentRecord> {
        let (top_level, replies): (Vec<&CommentRecord>, Vec<&CommentRecord>) =
            records.iter().partition(|r| !r.is_reply());

        top_level
            .into_iter()
            .chain(replies)
            .take(self.max_records)
            .map(|r| {
                let mut r = r.clone();
                r.text = truncate_chars(&r.text, self.max_text_chars).to_string();
                r
            })
            .collect()
    }

    pub fn transcript<'a>(&self, transcript: &'a str) -> &'a str {
        truncate_chars(transcript, self.max_transcript_chars)
    }
}

const MISSING_TRANSCRIPT: &str = "Subtitles are unavailable (judge by the title only).";

/// Default prompt: compare what the author says with what the audience says
pub fn build_verdict_prompt(input: &PromptInput<'_>) -> String {
    let transcript = input.transcript.unwrap_or(MISSING_TRANSCRIPT);
    let audience_voice = input
        .records
        .iter()
        .map(|r| format!("- {}", r.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a ruthless lie and clickbait detector. Your goal is to decide whether this video is worth anyone's time.

1. WHAT THE AUTHOR SAYS (TRANSCRIPT):
Title: {title}
Words from the video: {transcript}...

2. WHAT THE VIEWERS SAY (COMMENTS):
{audience_voice}

TASK:
Compare the author's words with the audience's reaction. Find inconsistencies.

Write a report (Markdown):
1. 🎯 **VERDICT:** (Watch / Skip / Clickbait). Usefulness score 0-10.
2. ⚖️ **LIE DETECTOR:**
   - The author claims: "..."
   - The audience says: "..." (is there any deception?)
3. 🔥 **GIST (what the video is really about):** A two-sentence summary of the author's words.
4. 👎 **CRITICISM:** The crowd's main complaints.
"#,
        title = input.title,
        transcript = transcript,
        audience_voice = audience_voice,
    )
}

/// Produce a summary with the first model candidate that answers.
///
/// Empty input short-circuits to the "no data" result. At most one call per
/// candidate is made; every failure moves on to the next candidate.
pub async fn summarize<G, F>(
    generator: &G,
    input: &PromptInput<'_>,
    candidates: &ModelCandidates,
    build_prompt: F,
) -> SummaryResult
where
    G: TextGenerator + ?Sized,
    F: Fn(&PromptInput<'_>) -> String,
{
    if input.records.is_empty() {
        tracing::info!("No comments to summarize, skipping generation");
        return SummaryResult::no_data();
    }

    let prompt = build_prompt(input);
    tracing::debug!("Verdict prompt built - chars={}, records={}", prompt.chars().count(), input.records.len());

    let mut attempted = Vec::with_capacity(candidates.len());
    for model in candidates.iter() {
        attempted.push(model.to_string());
        let start = std::time::Instant::now();

        match generator.generate(model, &prompt, &VERDICT_GENERATION_CONFIG).await {
            Ok(text) => {
                tracing::info!(
                    "Summary generated - model={}, duration={:.2}s, chars={}",
                    model,
                    start.elapsed().as_secs_f32(),
                    text.chars().count()
                );
                return SummaryResult::generated(text, model);
            }
            Err(e) => {
                tracing::warn!(
                    "Model {} failed ({:?}), trying next candidate: {}",
                    model,
                    e.category(),
                    e
                );
            }
        }
    }

    tracing::error!("All {} model candidates failed", attempted.len());
    SummaryResult::all_failed(&attempted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Generator whose answer per model is scripted; unknown models fail with 404.
    #[derive(Default)]
    pub(crate) struct ScriptedGenerator {
        pub answers: HashMap<String, Result<String, u16>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn answering(model: &str, text: &str) -> Self {
            let mut g = Self::default();
            g.answers.insert(model.to_string(), Ok(text.to_string()));
            g
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            model: &str,
            _prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push(model.to_string());
            match self.answers.get(model) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(429)) => Err(GenerationError::RateLimited { model: model.to_string() }),
                Some(Err(status)) => Err(GenerationError::Api {
                    model: model.to_string(),
                    status: *status,
                    message: "scripted".into(),
                }),
                None => Err(GenerationError::Api {
                    model: model.to_string(),
                    status: 404,
                    message: "unknown model".into(),
                }),
            }
        }
    }

    fn records(n: usize) -> Vec<CommentRecord> {
        (0..n)
            .map(|i| CommentRecord::top_level(format!("c{}", i), "a", format!("comment {}", i), 0, Utc::now()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_records_never_call_generator() {
        let generator = ScriptedGenerator::answering("m1", "text");
        let input = PromptInput { title: "t", transcript: None, records: &[] };

        let result = summarize(&generator, &input, &ModelCandidates::new(["m1"]), build_verdict_prompt).await;

        assert_eq!(result, SummaryResult::no_data());
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skips_rate_limited_candidates() {
        let mut generator = ScriptedGenerator::answering("m3", "the verdict");
        generator.answers.insert("m1".into(), Err(429));
        generator.answers.insert("m2".into(), Err(429));
        let recs = records(3);
        let input = PromptInput { title: "t", transcript: Some("words"), records: &recs };

        let result = summarize(&generator, &input, &ModelCandidates::new(["m1", "m2", "m3", "m4"]), build_verdict_prompt).await;

        assert_eq!(result.model_used.as_deref(), Some("m3"));
        assert_eq!(result.text, "the verdict");
        assert_eq!(generator.calls(), vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_transport_and_api_errors_also_skip() {
        let mut generator = ScriptedGenerator::answering("m2", "ok");
        generator.answers.insert("m1".into(), Err(500));
        let recs = records(1);
        let input = PromptInput { title: "t", transcript: None, records: &recs };

        let result = summarize(&generator, &input, &ModelCandidates::new(["m1", "m2"]), build_verdict_prompt).await;
        assert_eq!(result.model_used.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let generator = ScriptedGenerator::default();
        let recs = records(2);
        let input = PromptInput { title: "t", transcript: None, records: &recs };
        let candidates = ModelCandidates::new(["a", "b", "c"]);

        let result = summarize(&generator, &input, &candidates, build_verdict_prompt).await;

        assert!(result.model_used.is_none());
        assert!(!result.text.is_empty());
        assert_eq!(generator.calls().len(), candidates.len());
    }

    #[tokio::test]
    async fn test_prompt_built_once_with_custom_builder() {
        let generator = ScriptedGenerator::answering("m1", "x");
        let recs = records(2);
        let input = PromptInput { title: "t", transcript: None, records: &recs };
        let builds = Mutex::new(0);

        summarize(&generator, &input, &ModelCandidates::new(["m0", "m1"]), |i| {
            *builds.lock().unwrap() += 1;
            format!("{} records", i.records.len())
        })
        .await;

        assert_eq!(*builds.lock().unwrap(), 1);
    }

    #[test]
    fn test_prompt_mentions_title_transcript_and_comments() {
        let recs = records(2);
        let prompt = build_verdict_prompt(&PromptInput {
            title: "My Video",
            transcript: Some("hello from the author"),
            records: &recs,
        });
        assert!(prompt.contains("Title: My Video"));
        assert!(prompt.contains("hello from the author"));
        assert!(prompt.contains("- comment 1"));

        let no_transcript = build_verdict_prompt(&PromptInput { title: "x", transcript: None, records: &recs });
        assert!(no_transcript.contains(MISSING_TRANSCRIPT));
    }

    #[test]
    fn test_truncation_policy() {
        let mut recs = records(150);
        recs[0].text = "x".repeat(500);
        let policy = TruncationPolicy::default();

        let cut = policy.records(&recs);
        assert_eq!(cut.len(), 100);
        assert_eq!(cut[0].text.chars().count(), 200);
        assert_eq!(policy.transcript(&"y".repeat(20_000)).len(), 15_000);
    }

    #[test]
    fn test_truncation_prefers_top_level_comments() {
        let mut recs = vec![CommentRecord::top_level("busy", "a", "busy thread", 0, Utc::now())];
        recs.extend((0..120).map(|i| {
            CommentRecord::reply(format!("busy.r{}", i), "busy", "b", format!("reply {}", i), 0, Utc::now())
        }));
        recs.extend(records(10));
        let policy = TruncationPolicy {
            max_records: 20,
            ..TruncationPolicy::default()
        };

        let cut = policy.records(&recs);
        assert_eq!(cut.len(), 20);
        assert_eq!(cut.iter().filter(|r| !r.is_reply()).count(), 11);
        assert_eq!(cut[0].id, "busy");
        assert_eq!(cut[1].id, "c0");
        assert_eq!(cut[11].id, "busy.r0");
    }
}
