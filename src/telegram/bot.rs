use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::api::TelegramApi;
use super::handlers::Handlers;
use crate::config::store::{StateStore, TELEGRAM_OFFSET_KEY};

/// Back-off after a failed `getUpdates`.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-poll Telegram forever, answering each text message in its own task.
///
/// Returns only if the token cannot be verified or the stored offset is
/// unreadable. Poll failures are logged and retried.
pub async fn run(
    api: TelegramApi,
    handlers: Arc<Handlers>,
    store: &StateStore,
    poll_timeout: u64,
) -> Result<()> {
    let me = api
        .get_me()
        .await
        .context("failed to verify TELEGRAM_BOT_TOKEN")?;
    info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        id = me.id,
        "connected to Telegram"
    );

    let mut offset = store
        .get_i64(TELEGRAM_OFFSET_KEY)
        .context("failed to read stored Telegram offset")?
        .unwrap_or(0);
    if offset > 0 {
        info!(offset, "restored Telegram polling offset");
    }

    let mut tasks = JoinSet::new();
    loop {
        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                error!(error = %e, "message handler panicked");
            }
        }

        match poll_once(&api, &handlers, store, offset, poll_timeout, &mut tasks).await {
            Ok(next) => offset = next,
            Err(e) => {
                warn!(error = %e, "Telegram poll failed, retrying...");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

/// Fetch one batch of updates, spawn a handler per message, and return the
/// next offset. The offset is persisted before handlers run, so a crash
/// never replays a message.
pub async fn poll_once(
    api: &TelegramApi,
    handlers: &Arc<Handlers>,
    store: &StateStore,
    offset: i64,
    poll_timeout: u64,
    tasks: &mut JoinSet<()>,
) -> Result<i64> {
    let updates = api.get_updates(offset, poll_timeout).await?;

    let mut next = offset;
    for update in updates {
        next = next.max(update.update_id + 1);
        if let Err(e) = store.set_i64(TELEGRAM_OFFSET_KEY, next) {
            warn!(error = %e, offset = next, "failed to persist Telegram offset");
        }

        let Some(message) = update.message else {
            continue;
        };
        let handlers = Arc::clone(handlers);
        tasks.spawn(async move {
            if let Err(e) = handlers.handle_message(&message).await {
                error!(chat_id = message.chat.id, error = %e, "failed to reply");
            }
        });
    }
    Ok(next)
}
