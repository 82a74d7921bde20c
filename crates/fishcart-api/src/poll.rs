//! Telegram long-poll loop.
//!
//! Fetches updates with `getUpdates`, acknowledges callback queries, and
//! hands each event to the dispatcher's per-chat queue: events for one
//! chat run strictly in arrival order, different chats in parallel.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Server-side hold time for each `getUpdates` call.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before retrying.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Poll for updates until `shutdown` is cancelled.
///
/// Transport errors are logged and retried after a short pause; a flaky
/// network or a Telegram outage never brings the loop down.
pub async fn run_poll_loop(state: AppState, shutdown: CancellationToken) {
    let mut offset: Option<i64> = None;
    info!("polling for updates");

    loop {
        let updates = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = state.gateway.get_updates(offset, POLL_TIMEOUT_SECS) => match result {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                    }
                }
            },
        };

        for update in updates {
            // Advance past this update whether or not it is dispatchable.
            let next = update.update_id + 1;
            offset = Some(offset.map_or(next, |current| current.max(next)));

            let Some(inbound) = update.into_event() else {
                continue;
            };

            // Ack before dispatch so the client's spinner stops even when
            // the transition is slow.
            if let Some(callback_query_id) = &inbound.callback_query_id {
                if let Err(e) = state.gateway.answer_callback(callback_query_id).await {
                    debug!(error = %e, "answerCallbackQuery failed");
                }
            }

            state.dispatcher.enqueue(inbound.event);
        }
    }

    info!("poll loop stopped");
}
