// lib.rs - YouTube comment harvesting, AI verdicts and report delivery
pub mod config;
pub mod error;
pub mod gemini_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telegram_client;
pub mod transcript_client;
pub mod utils;
pub mod youtube_client;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{ErrorCategory, GenerationError, ProviderError};
pub use models::{CommentKind, CommentRecord, ModelCandidates, SummaryResult};
pub use services::{harvest, summarize, HarvestOptions, HarvestOutcome, Pipeline, ReplyPolicy};
