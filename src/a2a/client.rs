use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{Message, TaskClient};
use crate::error::BridgeError;

const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC client for an A2A agent endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct A2aClient {
    base_url: String,
    http: reqwest::Client,
}

impl A2aClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client (proxies, timeouts, ...).
    pub fn with_http(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<P: Serialize + Send>(&self, method: &str, params: P) -> Result<Value, BridgeError> {
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        };

        let resp = self.http.post(&self.base_url).json(&request).send().await?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            // Keep the status even when the body is lost.
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(code = status.as_u16(), error = %e, "failed to read error response body");
                    String::new()
                }
            };
            return Err(BridgeError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| BridgeError::Protocol(format!("{method} response is not JSON: {e}")))
    }
}

#[async_trait]
impl TaskClient for A2aClient {
    async fn send_message(&self, message: &Message) -> Result<Value, BridgeError> {
        self.call("message/send", SendParams { message }).await
    }

    async fn get_task(&self, task_id: &str) -> Result<Value, BridgeError> {
        self.call("tasks/get", GetParams { id: task_id }).await
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'a str,
    id: String,
    method: &'a str,
    params: P,
}

#[derive(Serialize)]
struct SendParams<'a> {
    message: &'a Message,
}

#[derive(Serialize)]
struct GetParams<'a> {
    id: &'a str,
}
