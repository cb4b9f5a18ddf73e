use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::Bridge;
use crate::a2a::{Artifact, Message, Task, TaskClient, TaskState, decode_task};
use crate::consts::{DEFAULT_POLL_INTERVAL, NO_ARTIFACTS_REPLY, NO_TEXT_REPLY};
use crate::error::BridgeError;
use crate::events::{Event, EventBus};

#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Pause between status polls.
    pub interval: Duration,
    /// Give up after this long. `None` polls until the task is terminal.
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }
}

/// Submits a prompt as an A2A task and polls it to a terminal state.
///
/// Every `ask` owns its own snapshot; the client is the only shared piece.
/// Polls for one task never overlap: each waits for the previous one.
pub struct PollingBridge {
    client: Arc<dyn TaskClient>,
    config: PollConfig,
    events: Option<Arc<EventBus>>,
}

impl PollingBridge {
    pub fn new(client: Arc<dyn TaskClient>, config: PollConfig) -> Self {
        Self {
            client,
            config,
            events: None,
        }
    }

    /// Publish progress on `events` while asking.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// Map a terminal snapshot to the answer or the error it stands for.
    pub fn resolve(task: Task) -> Result<String, BridgeError> {
        match task.status.state {
            TaskState::Completed => Ok(answer_text(&task.artifacts)),
            TaskState::Failed | TaskState::Canceled | TaskState::Rejected => {
                let message = task.status.message_text();
                Err(BridgeError::TaskEnded {
                    task_id: task.id,
                    state: task.status.state,
                    message,
                })
            }
            state => Err(BridgeError::Protocol(format!(
                "task {} is not finished (state '{}')",
                task.id, state
            ))),
        }
    }
}

/// Text of the first part of the first artifact, or a placeholder.
fn answer_text(artifacts: &[Artifact]) -> String {
    let Some(first) = artifacts.first() else {
        return NO_ARTIFACTS_REPLY.to_string();
    };
    match first.parts.first().and_then(|part| part.text.as_deref()) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_TEXT_REPLY.to_string(),
    }
}

#[async_trait]
impl Bridge for PollingBridge {
    async fn ask(&self, prompt: &str) -> Result<String, BridgeError> {
        let message = Message::user_text(prompt);
        let envelope = self.client.send_message(&message).await?;
        let mut task = decode_task(envelope)?;
        let task_id = task.id.clone();

        info!(task_id = %task_id, state = %task.status.state, message_id = %message.message_id, "task submitted");
        self.emit(Event::TaskSubmitted {
            task_id: task_id.clone(),
            state: task.status.state.clone(),
        });

        let started = Instant::now();
        let mut polls = 0;

        while !task.status.state.is_terminal() {
            if let Some(max_wait) = self.config.max_wait
                && started.elapsed() >= max_wait
            {
                return Err(BridgeError::TimedOut {
                    task_id,
                    waited: started.elapsed(),
                });
            }

            tokio::time::sleep(self.config.interval).await;

            let envelope = self.client.get_task(&task_id).await?;
            task = decode_task(envelope)?;
            polls += 1;

            debug!(task_id = %task_id, state = %task.status.state, poll = polls, "task polled");
            self.emit(Event::TaskPolled {
                task_id: task_id.clone(),
                state: task.status.state.clone(),
                poll: polls,
            });
        }

        info!(task_id = %task_id, state = %task.status.state, polls, "task finished");
        self.emit(Event::TaskFinished {
            task_id,
            state: task.status.state.clone(),
        });

        Self::resolve(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::{Part, TaskStatus};
    use serde_json::json;

    fn task(state: TaskState, artifacts: Vec<Artifact>) -> Task {
        Task {
            id: "t1".to_string(),
            context_id: None,
            status: TaskStatus {
                state,
                message: None,
                timestamp: None,
            },
            artifacts,
        }
    }

    fn artifact(parts: Vec<Part>) -> Artifact {
        Artifact {
            artifact_id: None,
            name: None,
            description: None,
            parts,
        }
    }

    #[test]
    fn resolve_returns_first_text() {
        let t = task(
            TaskState::Completed,
            vec![
                artifact(vec![Part::text("first"), Part::text("second")]),
                artifact(vec![Part::text("other")]),
            ],
        );
        assert_eq!(PollingBridge::resolve(t).unwrap(), "first");
    }

    #[test]
    fn resolve_without_artifacts() {
        let t = task(TaskState::Completed, vec![]);
        assert_eq!(PollingBridge::resolve(t).unwrap(), NO_ARTIFACTS_REPLY);
    }

    #[test]
    fn resolve_with_artifact_but_no_parts() {
        let t = task(TaskState::Completed, vec![artifact(vec![])]);
        assert_eq!(PollingBridge::resolve(t).unwrap(), NO_TEXT_REPLY);
    }

    #[test]
    fn resolve_with_non_text_part() {
        let data = Part {
            kind: "data".to_string(),
            text: None,
            metadata: Default::default(),
        };
        let t = task(TaskState::Completed, vec![artifact(vec![data])]);
        assert_eq!(PollingBridge::resolve(t).unwrap(), NO_TEXT_REPLY);
    }

    #[test]
    fn resolve_with_empty_text() {
        let t = task(TaskState::Completed, vec![artifact(vec![Part::text("")])]);
        assert_eq!(PollingBridge::resolve(t).unwrap(), NO_TEXT_REPLY);
    }

    #[test]
    fn placeholders_are_distinct() {
        assert_ne!(NO_TEXT_REPLY, NO_ARTIFACTS_REPLY);
    }

    #[test]
    fn resolve_canceled_carries_status_message() {
        let mut t = task(TaskState::Canceled, vec![]);
        t.status.message = Some(json!("user gave up"));
        let err = PollingBridge::resolve(t).unwrap_err();
        match err {
            BridgeError::TaskEnded {
                task_id,
                state,
                message,
            } => {
                assert_eq!(task_id, "t1");
                assert_eq!(state, TaskState::Canceled);
                assert_eq!(message.as_deref(), Some("user gave up"));
            }
            other => panic!("expected TaskEnded, got {other:?}"),
        }
    }

    #[test]
    fn resolve_non_terminal_is_protocol_error() {
        let t = task(TaskState::Working, vec![]);
        assert!(matches!(
            PollingBridge::resolve(t),
            Err(BridgeError::Protocol(_))
        ));
    }

    #[test]
    fn default_config_polls_forever() {
        let config = PollConfig::default();
        assert_eq!(config.interval, DEFAULT_POLL_INTERVAL);
        assert!(config.max_wait.is_none());
    }
}
