use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{MAX_MESSAGE_CHARS, Outbox, Update, User, split_message};

const API_ROOT: &str = "https://api.telegram.org";

/// Thin wrapper over the handful of Bot API methods the bot needs.
#[derive(Clone)]
pub struct TelegramApi {
    base: String,
    http: reqwest::Client,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        Self::with_api_root(API_ROOT, token)
    }

    /// Point at a different Bot API server (self-hosted, or a mock in tests).
    pub fn with_api_root(api_root: &str, token: &str) -> Self {
        Self {
            base: format!("{}/bot{}", api_root.trim_end_matches('/'), token),
            http: reqwest::Client::new(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        // Strip the URL from transport errors; it contains the bot token.
        let resp = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(&params)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("failed to reach Telegram API ({method})"))?;

        let status = resp.status();
        let body: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("failed to parse {method} response (HTTP {status})"))?;

        if !body.ok {
            let reason = body.description.unwrap_or_else(|| format!("HTTP {status}"));
            bail!("Telegram {method} failed: {reason}");
        }
        body.result
            .ok_or_else(|| anyhow!("Telegram {method} returned no result"))
    }

    /// Verify the token and fetch the bot's own account.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", json!({})).await
    }

    /// Long-poll for new messages starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: Value = self
            .call("sendMessage", json!({"chat_id": chat_id, "text": text}))
            .await?;
        Ok(())
    }

    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<()> {
        let _: Value = self
            .call("sendChatAction", json!({"chat_id": chat_id, "action": action}))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Outbox for TelegramApi {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.send_message(chat_id, &chunk).await?;
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        self.send_chat_action(chat_id, "typing").await
    }
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}
