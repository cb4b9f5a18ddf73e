use async_trait::async_trait;

use super::{BotInfo, Command, CommandResult};

/// Listed in the registry for `/help` output; dispatch is handled by the
/// registry because only it knows every command.
pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "/help"
    }

    fn aliases(&self) -> &[&str] {
        &["/h"]
    }

    fn description(&self) -> &str {
        "list commands"
    }

    async fn execute(&self, _info: &BotInfo<'_>) -> CommandResult {
        CommandResult::Reply(self.description().to_string())
    }
}
