// src/services/mod.rs
pub mod delivery;
pub mod export;
pub mod harvester;
pub mod pipeline;
pub mod summarizer;

pub use delivery::DeliverySink;
pub use harvester::{harvest, harvest_batch, CommentSource, HarvestOptions, HarvestOutcome, ReplyPolicy};
pub use pipeline::{Pipeline, PipelineSettings, RunReport, RunRequest, VideoMetadataSource};
pub use summarizer::{summarize, TextGenerator, TruncationPolicy};
