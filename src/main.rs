use std::sync::Arc;
use truth_detector::config::AppConfig;
use truth_detector::gemini_client::GeminiClient;
use truth_detector::handlers::{app_router, AppState};
use truth_detector::services::pipeline::Pipeline;
use truth_detector::telegram_client::TelegramClient;
use truth_detector::transcript_client::TranscriptClient;
use truth_detector::youtube_client::YouTubeClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = AppConfig::from_env()?;
    let settings = config.pipeline_settings();

    tracing::info!(
        "Harvest settings - reply_policy={:?}, max_comments={:?}, models={}",
        settings.harvest.reply_policy,
        settings.harvest.max_top_level,
        settings.candidates.as_slice().join(",")
    );

    let youtube = Arc::new(YouTubeClient::new(config.youtube_api_key.clone()));
    let mut pipeline = Pipeline::new(youtube.clone(), youtube, settings)
        .with_transcripts(Arc::new(TranscriptClient::new()));

    match config.gemini_api_key.clone() {
        Some(api_key) => {
            tracing::info!("Initializing Gemini AI client...");
            pipeline = pipeline.with_generator(Arc::new(GeminiClient::new(api_key)));
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not found. AI verdicts will be disabled.");
        }
    }

    match config.telegram.clone() {
        Some(telegram) => {
            tracing::info!("Initializing Telegram delivery (chat {})...", telegram.chat_id);
            pipeline = pipeline.with_delivery(Arc::new(TelegramClient::new(telegram.token, telegram.chat_id)));
        }
        None => {
            tracing::warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_ID not found. Telegram delivery will be disabled.");
        }
    }

    let state = Arc::new(AppState { pipeline });
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,truth_detector=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,truth_detector=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("⚖️ Truth detector starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
