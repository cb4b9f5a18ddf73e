pub mod mock;
pub mod polling;

use async_trait::async_trait;

use crate::error::BridgeError;

/// The outermost boundary. Front-ends only know this trait.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Relay one prompt and wait for the agent's final answer.
    async fn ask(&self, prompt: &str) -> Result<String, BridgeError>;
}
