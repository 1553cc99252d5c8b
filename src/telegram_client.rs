// Telegram Bot API client for pushing reports to a chat
// Docs: https://core.telegram.org/bots/api

use crate::error::DeliveryError;
use reqwest::Client;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: String, chat_id: String) -> Self {
        Self::with_base_url(token, chat_id, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(token: String, chat_id: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            token,
            chat_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn check(response: reqwest::Response) -> Result<(), DeliveryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(DeliveryError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Upload a file as a document with a caption
    pub async fn send_document(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<(), DeliveryError> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part(
                "document",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            );

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        Self::check(response).await
    }

    /// Send a text message, optionally with a parse mode such as `Markdown`
    pub async fn send_message(&self, text: &str, parse_mode: Option<&str>) -> Result<(), DeliveryError> {
        let mut body = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        Self::check(response).await
    }
}
