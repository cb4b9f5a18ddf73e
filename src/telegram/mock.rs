use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use super::Outbox;

/// An outbox for tests that records everything it is asked to send.
#[derive(Default)]
pub struct RecordingOutbox {
    texts: Mutex<Vec<(i64, String)>>,
    typing: Mutex<Vec<i64>>,
}

impl RecordingOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(chat_id, text)` pairs in send order.
    pub fn texts(&self) -> Vec<(i64, String)> {
        self.texts.lock().unwrap().clone()
    }

    /// Chat ids that received a typing action, in order.
    pub fn typing(&self) -> Vec<i64> {
        self.typing.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbox for RecordingOutbox {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        self.typing.lock().unwrap().push(chat_id);
        Ok(())
    }
}
