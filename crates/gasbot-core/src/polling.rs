//! Long-poll transport: one sequential loop, one update at a time.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{config::Config, dispatcher::Dispatcher, messaging::port::BotApi};

#[derive(Clone, Copy, Debug)]
pub struct PollSettings {
    pub limit: u32,
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl PollSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            limit: cfg.poll_limit,
            timeout: cfg.poll_timeout,
            retry_delay: cfg.poll_retry_delay,
        }
    }
}

/// Id the cursor is advanced past, if the envelope carries one.
pub fn update_id(raw: &serde_json::Value) -> Option<i64> {
    raw.get("update_id").and_then(|v| v.as_i64())
}

/// Monotonic cursor step: never moves backwards.
pub fn advance(cursor: Option<i64>, candidate: Option<i64>) -> Option<i64> {
    match (cursor, candidate) {
        (Some(c), Some(n)) => Some(c.max(n)),
        (c, n) => c.or(n),
    }
}

/// Poll until `shutdown` fires.
///
/// Failed polls sleep `retry_delay` and try again, forever. The cursor moves
/// to `max(update_id) + 1` as updates are handled, and to the server marker
/// once the batch is done, whichever is larger.
pub async fn run_polling(
    api: Arc<dyn BotApi>,
    dispatcher: Dispatcher,
    settings: PollSettings,
    shutdown: CancellationToken,
) {
    let mut cursor: Option<i64> = None;
    info!(
        limit = settings.limit,
        timeout_secs = settings.timeout.as_secs(),
        "long polling started"
    );

    loop {
        let polled = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            res = api.get_updates(cursor, settings.limit, settings.timeout.as_secs()) => res,
        };

        let batch = match polled {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    error = %e,
                    retry_in_ms = settings.retry_delay.as_millis() as u64,
                    "poll failed"
                );
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(settings.retry_delay) => continue,
                }
            }
        };

        if !batch.updates.is_empty() {
            debug!(count = batch.updates.len(), "poll batch");
        }

        for raw in batch.updates {
            if shutdown.is_cancelled() {
                break;
            }
            let next = update_id(&raw).map(|id| id.saturating_add(1));
            handle_contained(&dispatcher, raw).await;
            cursor = advance(cursor, next);
        }

        if shutdown.is_cancelled() {
            break;
        }
        cursor = advance(cursor, batch.marker);
    }

    info!("long polling stopped");
}

/// Runs one update on its own task so a panic is logged instead of ending the loop.
async fn handle_contained(dispatcher: &Dispatcher, raw: serde_json::Value) {
    let dispatcher = dispatcher.clone();
    let task = tokio::spawn(async move { dispatcher.handle(&raw).await });
    match task.await {
        Ok(Ok(_)) => {}
        // Already logged by the dispatcher; the update is skipped.
        Ok(Err(_)) => {}
        Err(e) => error!(error = %e, "update handler panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dispatcher::tests::FakeApi, domain::UpdateBatch, errors::Error};
    use serde_json::json;

    fn settings() -> PollSettings {
        PollSettings {
            limit: 100,
            timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(5),
        }
    }

    fn msg(id: i64, text: &str) -> serde_json::Value {
        json!({
            "update_id": id,
            "type": "message_created",
            "message": { "chat_id": 1, "user_id": 2, "body": { "text": text } }
        })
    }

    #[test]
    fn cursor_is_monotonic() {
        assert_eq!(advance(None, None), None);
        assert_eq!(advance(None, Some(5)), Some(5));
        assert_eq!(advance(Some(5), None), Some(5));
        assert_eq!(advance(Some(5), Some(3)), Some(5));
        assert_eq!(advance(Some(5), Some(9)), Some(9));
    }

    /// Drives the loop until it has issued `polls` requests, then cancels.
    async fn drive(api: Arc<FakeApi>, polls: usize) {
        let shutdown = CancellationToken::new();
        let dispatcher = Dispatcher::new(api.clone());
        let handle = tokio::spawn(run_polling(
            api.clone(),
            dispatcher,
            settings(),
            shutdown.clone(),
        ));
        for _ in 0..500 {
            if api.polls.lock().unwrap().len() >= polls {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn processes_batch_in_order_and_advances_cursor() {
        let api = Arc::new(FakeApi::default());
        api.batches.lock().unwrap().extend([
            Ok(UpdateBatch {
                updates: vec![msg(10, "/start"), msg(12, "/pay"), msg(11, "/help")],
                marker: None,
            }),
            Ok(UpdateBatch {
                updates: vec![msg(13, "/tariffs")],
                marker: Some(20),
            }),
        ]);

        drive(api.clone(), 3).await;

        let intents: Vec<_> = api
            .sent()
            .iter()
            .map(|(_, r)| r.text.lines().next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(intents.len(), 4);
        assert!(intents[0].contains("Добро пожаловать"));
        assert!(intents[1].contains("Оплата"));
        assert!(intents[2].contains("Помощь"));
        assert!(intents[3].contains("Тарифы"));

        let polls = api.polls.lock().unwrap().clone();
        assert_eq!(polls[0], None);
        assert_eq!(polls[1], Some(13));
        assert_eq!(polls[2], Some(20));
    }

    #[tokio::test]
    async fn failed_poll_is_retried_with_same_cursor() {
        let api = Arc::new(FakeApi::default());
        api.batches.lock().unwrap().extend([
            Ok(UpdateBatch {
                updates: vec![msg(1, "/start")],
                marker: None,
            }),
            Err(Error::External("network down".to_string())),
            Ok(UpdateBatch {
                updates: vec![msg(2, "/help")],
                marker: None,
            }),
        ]);

        drive(api.clone(), 4).await;

        let polls = api.polls.lock().unwrap().clone();
        assert_eq!(&polls[..4], &[None, Some(2), Some(2), Some(3)]);
        assert_eq!(api.sent().len(), 2);
    }

    #[tokio::test]
    async fn malformed_update_is_skipped_and_cursor_moves_past_it() {
        let api = Arc::new(FakeApi::default());
        api.batches.lock().unwrap().extend([Ok(UpdateBatch {
            updates: vec![
                json!({ "update_id": 4, "type": "message_created" }),
                msg(5, "/contacts"),
            ],
            marker: None,
        })]);

        drive(api.clone(), 2).await;

        assert_eq!(api.sent().len(), 1);
        assert_eq!(api.polls.lock().unwrap()[1], Some(6));
    }

    #[tokio::test]
    async fn stops_promptly_when_cancelled_before_start() {
        let api = Arc::new(FakeApi::default());
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        run_polling(
            api.clone(),
            Dispatcher::new(api.clone()),
            settings(),
            shutdown,
        )
        .await;
        assert!(api.polls.lock().unwrap().is_empty());
    }
}
