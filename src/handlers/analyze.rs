// Analysis endpoints
// POST /api/analyze runs the full pipeline for the given URLs and returns the report.
// POST /api/harvest only collects comments and reports counts and quota.

use super::AppState;
use crate::error::ReportedError;
use crate::services::harvester::ReplyPolicy;
use crate::services::pipeline::{RunReport, RunRequest};
use crate::utils::extract_video_id;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Upper bound on inputs per request; each video costs API quota
pub const MAX_URLS_PER_REQUEST: usize = 20;

pub fn analyze_routes() -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_videos))
        .route("/api/harvest", post(harvest_videos))
        .route("/api/status", get(api_status))
}

#[derive(Debug, Deserialize)]
pub struct HarvestRequest {
    pub urls: Vec<String>,
    #[serde(default)]
    pub reply_policy: Option<ReplyPolicy>,
}

#[derive(Debug, Serialize)]
pub struct HarvestSummary {
    pub video_id: String,
    pub top_level_count: usize,
    pub reply_count: usize,
    pub quota_spent: u32,
    pub error: Option<ReportedError>,
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "message": message
        })),
    )
}

fn check_url_count(urls: &[String]) -> Result<(), (StatusCode, Json<Value>)> {
    if urls.is_empty() {
        return Err(bad_request("Provide at least one video URL".to_string()));
    }
    if urls.len() > MAX_URLS_PER_REQUEST {
        return Err(bad_request(format!("At most {} URLs per request", MAX_URLS_PER_REQUEST)));
    }
    Ok(())
}

pub async fn analyze_videos(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunReport>, (StatusCode, Json<Value>)> {
    check_url_count(&request.urls)?;

    tracing::info!("🕵️ Analyzing {} video(s)", request.urls.len());
    let report = state.pipeline.run(&request).await;

    Ok(Json(report))
}

pub async fn harvest_videos(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<HarvestRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    check_url_count(&request.urls)?;

    let mut video_ids = Vec::with_capacity(request.urls.len());
    for url in &request.urls {
        match extract_video_id(url) {
            Some(id) => video_ids.push(id),
            None => return Err(bad_request(format!("No video id in '{}'", url))),
        }
    }

    let outcomes = state.pipeline.harvest_comments(&video_ids, request.reply_policy).await;
    let total_quota_spent: u32 = outcomes.iter().map(|o| o.quota_spent).sum();
    let videos: Vec<HarvestSummary> = outcomes
        .iter()
        .map(|o| HarvestSummary {
            video_id: o.video_id.clone(),
            top_level_count: o.top_level_count(),
            reply_count: o.reply_count(),
            quota_spent: o.quota_spent,
            error: o.error.as_ref().map(ReportedError::partial),
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "videos": videos,
        "total_quota_spent": total_quota_spent
    })))
}

pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let configured = |enabled: bool| if enabled { "configured" } else { "not_configured" };
    let settings = state.pipeline.settings();

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "youtube_data_api": "configured",
            "transcripts": configured(state.pipeline.has_transcripts()),
            "gemini_ai": configured(state.pipeline.has_generator()),
            "telegram": configured(state.pipeline.has_delivery())
        },
        "settings": {
            "reply_policy": settings.harvest.reply_policy,
            "max_comments": settings.harvest.max_top_level,
            "models": settings.candidates.as_slice()
        }
    }))
}
