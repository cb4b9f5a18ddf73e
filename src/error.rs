//! Errors raised while relaying a prompt to the agent.

use std::time::Duration;

use thiserror::Error;

use crate::a2a::TaskState;

/// Everything that can go wrong between submitting a prompt and getting an answer.
///
/// Front-ends match on the variant to pick a user-facing message; the bridge
/// itself never recovers from any of these.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The envelope or task did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered with a non-success HTTP status.
    #[error("server returned {code}: {body}")]
    Status { code: u16, body: String },

    /// Connecting failed or the request timed out.
    #[error("could not reach the server: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Any other transport failure (bad body, redirect loop, ...).
    #[error("transport error: {0}")]
    Http(#[source] reqwest::Error),

    /// The task reached `failed`, `canceled`, or `rejected`.
    #[error("Task {task_id} ended in state '{state}'. Message: {}", message.as_deref().unwrap_or("None"))]
    TaskEnded {
        task_id: String,
        state: TaskState,
        message: Option<String>,
    },

    /// Gave up waiting for a terminal state (only with `max_wait` set).
    #[error("Task {task_id} still not finished after {waited:?}")]
    TimedOut { task_id: String, waited: Duration },
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            BridgeError::Unreachable(err)
        } else {
            BridgeError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ended_embeds_state_and_message() {
        let err = BridgeError::TaskEnded {
            task_id: "t2".to_string(),
            state: TaskState::Failed,
            message: Some("tool error".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("'failed'"));
        assert!(text.contains("tool error"));
        assert!(text.contains("t2"));
    }

    #[test]
    fn task_ended_without_message_says_none() {
        let err = BridgeError::TaskEnded {
            task_id: "t3".to_string(),
            state: TaskState::Rejected,
            message: None,
        };
        assert!(err.to_string().ends_with("Message: None"));
    }

    #[test]
    fn status_display_includes_code_and_body() {
        let err = BridgeError::Status {
            code: 422,
            body: "unprocessable".to_string(),
        };
        assert_eq!(err.to_string(), "server returned 422: unprocessable");
    }
}
