use async_trait::async_trait;

use super::{BotInfo, Command, CommandResult};

pub const GREETING: &str = "Hi! Send me a prompt and I'll forward it to the agent.";

pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    fn name(&self) -> &str {
        "/start"
    }

    fn description(&self) -> &str {
        "say hello"
    }

    async fn execute(&self, _info: &BotInfo<'_>) -> CommandResult {
        CommandResult::Reply(GREETING.to_string())
    }
}
