// Best-effort delivery of the export file and the verdict text.
// Failures are logged and reported as `false`, never raised.

use crate::telegram_client::TelegramClient;
use crate::utils::chunk_chars;
use async_trait::async_trait;

/// Longest message sent in one piece; longer texts are split
pub const MESSAGE_CHUNK_CHARS: usize = 3000;

#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Returns `true` only when every part was delivered
    async fn deliver(&self, blob: &[u8], file_name: &str, summary: Option<&str>) -> bool;
}

pub fn document_caption(file_name: &str, has_summary: bool) -> String {
    let mut caption = format!("📂 {}", file_name);
    if has_summary {
        caption.push_str("\n\n(⬇️ VERDICT BELOW)");
    }
    caption
}

/// Messages to send for a summary: one Markdown message when it fits,
/// otherwise plain chunks (Markdown could break across a split).
pub fn summary_messages(summary: &str) -> Vec<(String, Option<&'static str>)> {
    if summary.chars().count() > MESSAGE_CHUNK_CHARS {
        chunk_chars(summary, MESSAGE_CHUNK_CHARS)
            .into_iter()
            .map(|chunk| (chunk, None))
            .collect()
    } else {
        vec![(summary.to_string(), Some("Markdown"))]
    }
}

#[async_trait]
impl DeliverySink for TelegramClient {
    async fn deliver(&self, blob: &[u8], file_name: &str, summary: Option<&str>) -> bool {
        let mut delivered = true;
        let caption = document_caption(file_name, summary.is_some());

        if let Err(e) = self.send_document(blob.to_vec(), file_name, &caption).await {
            tracing::error!("Telegram sendDocument failed for {}: {}", file_name, e);
            delivered = false;
        }

        if let Some(summary) = summary {
            for (text, parse_mode) in summary_messages(summary) {
                if let Err(e) = self.send_message(&text, parse_mode).await {
                    tracing::error!("Telegram sendMessage failed: {}", e);
                    delivered = false;
                }
            }
        }

        if delivered {
            tracing::info!("Report {} delivered to Telegram", file_name);
        }
        delivered
    }
}
