//! Telegram front-end: long-polls the Bot API and relays text to the agent.

pub mod api;
pub mod bot;
pub mod handlers;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::BridgeError;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Where replies go. [`api::TelegramApi`] in production, a recorder in tests.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_typing(&self, chat_id: i64) -> Result<()>;
}

/// Decides whether a chat may use the agent.
pub type Authorizer = Arc<dyn Fn(i64) -> bool + Send + Sync>;

/// Allow exactly one chat.
pub fn only_chat(chat_id: i64) -> Authorizer {
    Arc::new(move |id| id == chat_id)
}

/// Short user-facing text for a failed ask.
pub fn error_reply(err: &BridgeError) -> String {
    match err {
        BridgeError::Status { code, .. } => format!("A2A server error: {code}"),
        BridgeError::Unreachable(e) => format!("Couldn't contact agent: {e}"),
        other => format!("Unexpected error: {other}"),
    }
}

/// Split `text` into chunks of at most `limit` characters, preferring to
/// break after a newline.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let Some((hard, _)) = rest.char_indices().nth(limit) else {
            chunks.push(rest.to_string());
            break;
        };
        let cut = rest[..hard]
            .rfind('\n')
            .filter(|&i| i > 0)
            .map(|i| i + 1)
            .unwrap_or(hard);
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    chunks
}

// --- Bot API types (only the fields we read) ---

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_chat_allows_configured_id() {
        let gate = only_chat(123);
        assert!(gate(123));
        assert!(!gate(124));
        assert!(!gate(-123));
    }

    #[test]
    fn error_reply_for_status() {
        let err = BridgeError::Status {
            code: 503,
            body: "down".to_string(),
        };
        assert_eq!(error_reply(&err), "A2A server error: 503");
    }

    #[test]
    fn error_reply_for_task_failure() {
        let err = BridgeError::TaskEnded {
            task_id: "t".to_string(),
            state: crate::a2a::TaskState::Failed,
            message: Some("boom".to_string()),
        };
        let reply = error_reply(&err);
        assert!(reply.starts_with("Unexpected error: "));
        assert!(reply.contains("boom"));
    }

    #[test]
    fn split_short_message_is_one_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello"]);
    }

    #[test]
    fn split_empty_message_is_nothing() {
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn split_prefers_newlines() {
        let chunks = split_message("aaa\nbbbb\ncc", 6);
        assert_eq!(chunks, vec!["aaa\n", "bbbb\n", "cc"]);
    }

    #[test]
    fn split_hard_cuts_long_lines() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn split_counts_characters_not_bytes() {
        let text = "ééééé";
        let chunks = split_message(text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn update_without_message_parses() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 7, "edited_message": {}}"#).unwrap();
        assert_eq!(update.update_id, 7);
        assert!(update.message.is_none());
    }

    #[test]
    fn message_update_parses() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 8, "message": {"message_id": 1, "date": 0,
                "chat": {"id": 456, "type": "private"},
                "from": {"id": 9, "is_bot": false, "first_name": "Ada"},
                "text": "hi"}}"#,
        )
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 456);
        assert_eq!(message.text.as_deref(), Some("hi"));
        assert_eq!(message.from.unwrap().first_name, "Ada");
    }
}
