//! Long-polling loop: fetch updates, dispatch each text message, send the replies.

use crate::dispatcher::Dispatcher;
use crate::telegram::{TelegramClient, Update};
use std::future::Future;
use std::time::Duration;

/// Pause after a failed `getUpdates` before polling again.
const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Polls until `shutdown` resolves. Updates are handled in arrival order, so a
/// wizard prompt and the answer that follows it are never reordered.
pub async fn run_polling<F>(
    telegram: &TelegramClient,
    dispatcher: &Dispatcher,
    poll_timeout: Duration,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;

    loop {
        tokio::select! {
            res = telegram.get_updates(offset, poll_timeout) => match res {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        process_update(telegram, dispatcher, &update).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "coachbot::bot", error = %e, "getUpdates failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            },
            _ = &mut shutdown => {
                tracing::info!(target: "coachbot::bot", "shutdown requested; polling stopped");
                break;
            }
        }
    }
}

/// Dispatches one update and sends the reply, if any.
pub async fn process_update(telegram: &TelegramClient, dispatcher: &Dispatcher, update: &Update) {
    let Some((chat_id, uid, text)) = update.text_message() else {
        tracing::debug!(target: "coachbot::bot", update_id = update.update_id, "non-text update skipped");
        return;
    };

    let Some(reply) = dispatcher.handle(&uid, text).await else {
        return;
    };
    if let Err(e) = telegram.send_message(chat_id, &reply).await {
        tracing::warn!(target: "coachbot::bot", uid = %uid, error = %e, "sendMessage failed");
    }
}
