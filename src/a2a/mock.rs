use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Message, TaskClient};
use crate::error::BridgeError;

/// A scripted client for tests. `send_message` answers with `submit`; each
/// `get_task` returns the next entry of `polls` in order.
pub struct ScriptedClient {
    submit: Mutex<Option<Result<Value, BridgeError>>>,
    polls: Vec<Value>,
    index: AtomicUsize,
    sent: Mutex<Vec<Message>>,
    polled_ids: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(submit: Value, polls: Vec<Value>) -> Self {
        Self::with_submit_result(Ok(submit), polls)
    }

    /// Script the submission outcome directly, e.g. to fail with a transport error.
    pub fn with_submit_result(submit: Result<Value, BridgeError>, polls: Vec<Value>) -> Self {
        Self {
            submit: Mutex::new(Some(submit)),
            polls,
            index: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            polled_ids: Mutex::new(Vec::new()),
        }
    }

    /// Number of `get_task` calls so far.
    pub fn poll_count(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Messages passed to `send_message`, in order.
    pub fn sent_messages(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    /// Task ids passed to `get_task`, in order.
    pub fn polled_ids(&self) -> Vec<String> {
        self.polled_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskClient for ScriptedClient {
    async fn send_message(&self, message: &Message) -> Result<Value, BridgeError> {
        self.sent.lock().unwrap().push(message.clone());
        // Scripted once; a second submission replays the same envelope.
        let mut submit = self.submit.lock().unwrap();
        match submit.take() {
            Some(Ok(envelope)) => {
                *submit = Some(Ok(envelope.clone()));
                Ok(envelope)
            }
            Some(Err(err)) => Err(err),
            None => Err(BridgeError::Protocol(
                "ScriptedClient: submission already consumed".to_string(),
            )),
        }
    }

    async fn get_task(&self, task_id: &str) -> Result<Value, BridgeError> {
        self.polled_ids.lock().unwrap().push(task_id.to_string());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.polls.get(i).cloned().ok_or_else(|| {
            BridgeError::Protocol(format!(
                "ScriptedClient: no more snapshots (polled {} times)",
                i + 1
            ))
        })
    }
}
