use serde::{Deserialize, Serialize};

pub const NO_DATA_TEXT: &str = "No comments.";
pub const ALL_MODELS_FAILED_TEXT: &str = "⚠️ AI could not complete the analysis: every model candidate failed.";

/// Outcome of the summary step. `model_used` is `None` when nothing was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub model_used: Option<String>,
}

impl SummaryResult {
    pub fn generated(text: String, model: &str) -> Self {
        Self {
            text,
            model_used: Some(model.to_string()),
        }
    }

    pub fn no_data() -> Self {
        Self {
            text: NO_DATA_TEXT.to_string(),
            model_used: None,
        }
    }

    pub fn all_failed(attempted: &[String]) -> Self {
        Self {
            text: format!("{} Tried: {}", ALL_MODELS_FAILED_TEXT, attempted.join(", ")),
            model_used: None,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.model_used.is_some()
    }
}

/// Ordered list of model identifiers, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidates(Vec<String>);

impl ModelCandidates {
    pub const DEFAULT: [&'static str; 4] = [
        "gemini-2.5-flash",
        "gemini-1.5-pro",
        "gemini-2.0-flash",
        "gemini-1.5-flash",
    ];

    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(models.into_iter().map(Into::into).collect())
    }

    /// Parse a comma separated list, ignoring blanks. Empty input yields the defaults.
    pub fn parse(raw: &str) -> Self {
        let models: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        if models.is_empty() {
            Self::default()
        } else {
            Self(models)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ModelCandidates {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
