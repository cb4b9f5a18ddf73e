//! Bot commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry handles dispatch, alias resolution,
//! the `@botname` suffix Telegram adds in groups, and help generation.
//! Commands are answered locally and never reach the agent.

mod help;
mod start;
mod status;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// What commands may report about the running bot.
pub struct BotInfo<'a> {
    pub agent_url: &'a str,
    pub poll_interval: Duration,
    pub max_wait: Option<Duration>,
}

/// Outcome of dispatching one line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Not a command; forward the text to the agent.
    NotACommand,
    /// Command handled; send this back to the chat.
    Reply(String),
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/start"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    async fn execute(&self, info: &BotInfo<'_>) -> CommandResult;
}

pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// A registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(start::StartCommand),
            Arc::new(help::HelpCommand),
            Arc::new(status::StatusCommand),
        ];
        Self { commands }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &BotInfo<'_>) -> CommandResult {
        let Some(cmd) = command_word(input) else {
            return CommandResult::NotACommand;
        };

        for command in &self.commands {
            if cmd == command.name() || command.aliases().contains(&cmd) {
                // /help needs the registry itself
                if command.name() == "/help" {
                    return CommandResult::Reply(self.help_text());
                }
                return command.execute(info).await;
            }
        }

        CommandResult::Reply(format!(
            "unknown command: {cmd}\nsend /help for available commands"
        ))
    }

    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.aliases()), c.description()))
            .collect();

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("{label}  {desc}\n"));
        }
        out.push_str("\nAnything else is sent to the agent.");
        out
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `"/start@my_bot hello"` -> `Some("/start")`; plain text -> `None`.
fn command_word(input: &str) -> Option<&str> {
    let word = input.split_whitespace().next()?;
    if !word.starts_with('/') {
        return None;
    }
    Some(word.split_once('@').map_or(word, |(cmd, _bot)| cmd))
}

fn format_label(name: &str, aliases: &[&str]) -> String {
    if aliases.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, aliases.join(", "))
    }
}
