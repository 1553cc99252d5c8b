// Environment configuration
// Values come from the process environment (optionally seeded from .env by main).

use crate::error::ConfigError;
use crate::models::ModelCandidates;
use crate::services::harvester::{HarvestOptions, ReplyPolicy, DEFAULT_MAX_TOP_LEVEL};
use crate::services::pipeline::PipelineSettings;
use crate::services::summarizer::TruncationPolicy;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub youtube_api_key: String,
    pub gemini_api_key: Option<String>,
    pub telegram: Option<TelegramConfig>,
    pub models: ModelCandidates,
    pub reply_policy: ReplyPolicy,
    /// `None` means no cap on top-level comments
    pub max_comments: Option<usize>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let youtube_api_key = get("YOUTUBE_API_KEY")
            .or_else(|| get("GOOGLE_API_KEY"))
            .ok_or(ConfigError::Missing("YOUTUBE_API_KEY"))?;

        let telegram = match (get("TELEGRAM_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig { token, chat_id }),
            _ => None,
        };

        let models = get("GEMINI_MODELS")
            .map(|raw| ModelCandidates::parse(&raw))
            .unwrap_or_default();

        let reply_policy = match get("REPLY_POLICY") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "REPLY_POLICY",
                value: raw,
            })?,
            None => ReplyPolicy::default(),
        };

        let max_comments = match get("MAX_COMMENTS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_COMMENTS",
                        value: raw,
                    })
                }
            },
            None => Some(DEFAULT_MAX_TOP_LEVEL),
        };

        Ok(Self {
            youtube_api_key,
            gemini_api_key: get("GEMINI_API_KEY"),
            telegram,
            models,
            reply_policy,
            max_comments,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            harvest: HarvestOptions {
                reply_policy: self.reply_policy,
                max_top_level: self.max_comments,
                ..HarvestOptions::default()
            },
            candidates: self.models.clone(),
            truncation: TruncationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "yt")])).unwrap();
        assert_eq!(config.youtube_api_key, "yt");
        assert!(config.gemini_api_key.is_none());
        assert!(config.telegram.is_none());
        assert_eq!(config.models, ModelCandidates::default());
        assert_eq!(config.reply_policy, ReplyPolicy::Lazy);
        assert_eq!(config.max_comments, Some(DEFAULT_MAX_TOP_LEVEL));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_missing_youtube_key_fails() {
        let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "g")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("YOUTUBE_API_KEY")));
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_lookup(lookup(&[
            ("YOUTUBE_API_KEY", "yt"),
            ("GEMINI_API_KEY", "g"),
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("GEMINI_MODELS", "gemini-2.0-flash,gemini-1.5-flash"),
            ("REPLY_POLICY", "exhaustive"),
            ("MAX_COMMENTS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.telegram.as_ref().unwrap().chat_id, "42");
        assert_eq!(config.models.as_slice(), &["gemini-2.0-flash", "gemini-1.5-flash"]);
        let settings = config.pipeline_settings();
        assert_eq!(settings.harvest.reply_policy, ReplyPolicy::Exhaustive);
        assert_eq!(settings.harvest.max_top_level, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("YOUTUBE_API_KEY", "yt"), ("REPLY_POLICY", "often")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "REPLY_POLICY", .. }));

        let err = AppConfig::from_lookup(lookup(&[("YOUTUBE_API_KEY", "yt"), ("MAX_COMMENTS", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MAX_COMMENTS", .. }));
    }
}
