use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::Bridge;
use crate::error::BridgeError;

/// A scripted bridge for front-end tests. Returns pre-defined outcomes in
/// order and records every prompt it was asked.
pub struct MockBridge {
    replies: Mutex<VecDeque<Result<String, BridgeError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockBridge {
    pub fn new(replies: Vec<Result<String, BridgeError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bridge for MockBridge {
    async fn ask(&self, prompt: &str) -> Result<String, BridgeError> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(BridgeError::Protocol(format!(
                "MockBridge: no more replies (called {call} times)"
            )))
        })
    }
}
