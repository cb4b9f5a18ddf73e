//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Pause between task status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Telegram long-poll timeout in seconds.
pub const DEFAULT_TELEGRAM_POLL_TIMEOUT: u64 = 30;

/// Completed, the first artifact exists, but it carries no text.
pub const NO_TEXT_REPLY: &str = "(No text returned from agent)";

/// Completed without any artifacts at all.
pub const NO_ARTIFACTS_REPLY: &str = "(Agent completed without returning text.)";

/// Reply to chats that are not allowed to use the bot.
pub const UNAUTHORIZED_REPLY: &str = "This bot is restricted to a single chat.";

/// Default database path: `~/.courier/courier.db`.
/// Falls back to the working directory when there is no home.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".courier"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("courier.db")
}
