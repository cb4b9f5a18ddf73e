use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{Authorizer, IncomingMessage, Outbox, error_reply};
use crate::bridge::Bridge;
use crate::bridge::polling::PollConfig;
use crate::commands::{BotInfo, CommandRegistry, CommandResult};
use crate::consts::UNAUTHORIZED_REPLY;

/// Telegram shows "typing..." for about five seconds per chat action.
const TYPING_REFRESH: Duration = Duration::from_secs(4);

/// Per-message logic, independent of how updates arrive.
pub struct Handlers {
    authorize: Authorizer,
    bridge: Arc<dyn Bridge>,
    outbox: Arc<dyn Outbox>,
    commands: CommandRegistry,
    agent_url: String,
    poll: PollConfig,
}

impl Handlers {
    pub fn new(
        authorize: Authorizer,
        bridge: Arc<dyn Bridge>,
        outbox: Arc<dyn Outbox>,
        agent_url: &str,
        poll: PollConfig,
    ) -> Self {
        Self {
            authorize,
            bridge,
            outbox,
            commands: CommandRegistry::new(),
            agent_url: agent_url.to_string(),
            poll,
        }
    }

    /// Handle one inbound message. Only delivery failures are returned;
    /// a failed ask is reported to the chat instead.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Result<()> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if !(self.authorize)(chat_id) {
            warn!(chat_id, "message from unauthorized chat");
            return self.outbox.send_text(chat_id, UNAUTHORIZED_REPLY).await;
        }

        let info = BotInfo {
            agent_url: &self.agent_url,
            poll_interval: self.poll.interval,
            max_wait: self.poll.max_wait,
        };
        if let CommandResult::Reply(reply) = self.commands.dispatch(text, &info).await {
            return self.outbox.send_text(chat_id, &reply).await;
        }

        self.handle_prompt(chat_id, text).await
    }

    async fn handle_prompt(&self, chat_id: i64, prompt: &str) -> Result<()> {
        let ask = self.bridge.ask(prompt);
        tokio::pin!(ask);
        let mut typing = tokio::time::interval(TYPING_REFRESH);

        let result = loop {
            tokio::select! {
                biased;
                _ = typing.tick() => {
                    if let Err(e) = self.outbox.send_typing(chat_id).await {
                        warn!(chat_id, error = %e, "failed to send typing action");
                    }
                }
                result = &mut ask => break result,
            }
        };

        let reply = match result {
            Ok(answer) => {
                info!(chat_id, chars = answer.chars().count(), "agent answered");
                answer
            }
            Err(e) => {
                error!(chat_id, error = %e, "ask failed");
                error_reply(&e)
            }
        };
        self.outbox.send_text(chat_id, &reply).await
    }
}
