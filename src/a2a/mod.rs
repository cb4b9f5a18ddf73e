//! The slice of the A2A task protocol the bridge speaks.
//!
//! Only two JSON-RPC methods are used: `message/send` to create a task and
//! `tasks/get` to read its current snapshot. Wire names are camelCase.

pub mod client;
pub mod mock;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Remote side of the bridge. Implementations must be safe to share across
/// concurrent `ask` calls.
#[async_trait]
pub trait TaskClient: Send + Sync {
    /// Submit a message. Returns the raw JSON-RPC response envelope.
    async fn send_message(&self, message: &Message) -> Result<Value, BridgeError>;

    /// Fetch the current snapshot of a task. Returns the raw envelope.
    async fn get_task(&self, task_id: &str) -> Result<Value, BridgeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One unit of conversational input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
    pub kind: String,
    pub message_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

impl Message {
    /// A user message with a single text part and a fresh id.
    pub fn user_text(text: &str) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
            kind: "message".to_string(),
            message_id: uuid::Uuid::new_v4().to_string(),
            metadata: Map::new(),
        }
    }
}

/// Optional collections: servers send `null` as often as they omit the key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_part_kind() -> String {
    "text".to_string()
}

/// A content part. Only text parts carry `text`; file and data parts leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default = "default_part_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

impl Part {
    pub fn text(text: &str) -> Self {
        Self {
            kind: default_part_kind(),
            text: Some(text.to_string()),
            metadata: Map::new(),
        }
    }
}

/// Lifecycle label of a task.
///
/// Unrecognised labels are kept verbatim in `Other` and treated as
/// non-terminal, so a server that reports e.g. `running` keeps being polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    AuthRequired,
    Completed,
    Failed,
    Canceled,
    Rejected,
    Unknown,
    Other(String),
}

impl TaskState {
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::AuthRequired => "auth-required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Rejected => "rejected",
            TaskState::Unknown => "unknown",
            TaskState::Other(label) => label,
        }
    }

    /// Terminal states never change again; polling stops on them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }
}

impl From<String> for TaskState {
    fn from(label: String) -> Self {
        match label.as_str() {
            "submitted" => TaskState::Submitted,
            "working" => TaskState::Working,
            "input-required" => TaskState::InputRequired,
            "auth-required" => TaskState::AuthRequired,
            "completed" => TaskState::Completed,
            "failed" => TaskState::Failed,
            "canceled" => TaskState::Canceled,
            "rejected" => TaskState::Rejected,
            "unknown" => TaskState::Unknown,
            _ => TaskState::Other(label),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    /// Usually an agent `Message`, but servers also send plain strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TaskStatus {
    /// Render the status message for diagnostics.
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => {
                let texts: Vec<&str> = other
                    .get("parts")
                    .and_then(|p| p.as_array())
                    .map(|parts| {
                        parts
                            .iter()
                            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                            .collect()
                    })
                    .unwrap_or_default();
                if texts.is_empty() {
                    Some(other.to_string())
                } else {
                    Some(texts.join("\n"))
                }
            }
        }
    }
}

/// Result payload, present once a task has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<Part>,
}

/// A snapshot of a remote task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Pull the task out of a `{"result": Task}` envelope.
///
/// Any deviation from that shape is a [`BridgeError::Protocol`]; nothing is
/// defaulted.
pub fn decode_task(envelope: Value) -> Result<Task, BridgeError> {
    let envelope: Envelope = serde_json::from_value(envelope)
        .map_err(|e| BridgeError::Protocol(format!("response is not a JSON-RPC envelope: {e}")))?;

    if let Some(err) = envelope.error {
        return Err(BridgeError::Protocol(format!(
            "agent returned JSON-RPC error {}: {}",
            err.code, err.message
        )));
    }

    let result = match envelope.result {
        Some(Value::Null) | None => {
            return Err(BridgeError::Protocol(
                "response has no 'result' key".to_string(),
            ));
        }
        Some(result) => result,
    };

    serde_json::from_value(result)
        .map_err(|e| BridgeError::Protocol(format!("malformed task in 'result': {e}")))
}
