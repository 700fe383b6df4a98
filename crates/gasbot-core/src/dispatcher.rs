//! Per-update handling shared by both transports.
//!
//! Parse -> classify -> render -> send, with exactly one outbound message per
//! answerable update (plus one acknowledgement for callbacks). Outbound
//! failures are logged and swallowed here; only a malformed envelope is
//! reported back to the transport.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    catalog::{self, RenderContext},
    domain::UserId,
    intent::Intent,
    messaging::port::BotApi,
    router,
    update::{parse_update, Parsed, Update, UpdateKind},
    Result,
};

/// Name used when the sender cannot be resolved.
pub const UNKNOWN_USER_NAME: &str = "Пользователь";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Replied {
        intent: Intent,
        /// False when the send call failed (already logged).
        delivered: bool,
    },
    /// Nothing to answer: unsupported update type or the bot was removed.
    Ignored,
}

#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn BotApi>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn BotApi>) -> Self {
        Self { api }
    }

    /// Handle one raw envelope. `Err` means the envelope was malformed and
    /// dropped without a reply.
    pub async fn handle(&self, raw: &serde_json::Value) -> Result<Outcome> {
        match parse_update(raw) {
            Ok(Parsed::Update(update)) => Ok(self.handle_update(update).await),
            Ok(Parsed::Ignored { update_type }) => {
                debug!(%update_type, "ignoring unsupported update type");
                Ok(Outcome::Ignored)
            }
            Err(e) => {
                warn!(error = %e, "dropping update");
                Err(e)
            }
        }
    }

    pub async fn handle_update(&self, update: Update) -> Outcome {
        let Some(intent) = router::classify(&update) else {
            info!(chat_id = update.chat_id.0, "bot removed from chat");
            return Outcome::Ignored;
        };

        match update.kind {
            UpdateKind::MessageCreated => info!(
                chat_id = update.chat_id.0,
                user_id = ?update.user_id.map(|u| u.0),
                text = update.text.as_deref().unwrap_or_default(),
                %intent,
                "message"
            ),
            UpdateKind::Callback => info!(
                chat_id = update.chat_id.0,
                user_id = ?update.user_id.map(|u| u.0),
                payload = update.callback_payload.as_deref().unwrap_or_default(),
                %intent,
                "callback"
            ),
            _ => info!(chat_id = update.chat_id.0, kind = ?update.kind, %intent, "chat event"),
        }

        let user_name = if intent == Intent::GreetingFallback {
            Some(self.resolve_user_name(&update).await)
        } else {
            None
        };

        let original_text = match update.kind {
            UpdateKind::Callback => update.callback_payload.as_deref(),
            _ => update.text.as_deref(),
        };

        let reply = catalog::render(
            intent,
            &RenderContext {
                user_name: user_name.as_deref(),
                original_text,
            },
        );

        let delivered = match self.api.send_message(update.chat_id, &reply).await {
            Ok(()) => true,
            Err(e) => {
                warn!(chat_id = update.chat_id.0, %intent, error = %e, "send failed");
                false
            }
        };

        if update.kind == UpdateKind::Callback {
            match update.callback_id.as_deref() {
                Some(callback_id) => {
                    if let Err(e) = self.api.acknowledge_callback(callback_id).await {
                        warn!(callback_id, error = %e, "callback acknowledgement failed");
                    }
                }
                None => debug!("callback without id; nothing to acknowledge"),
            }
        }

        Outcome::Replied { intent, delivered }
    }

    /// Sender display name: envelope first, then a best-effort lookup.
    async fn resolve_user_name(&self, update: &Update) -> String {
        if let Some(name) = update.user_name.as_deref().filter(|s| !s.trim().is_empty()) {
            return name.to_string();
        }
        let Some(user_id) = update.user_id else {
            return UNKNOWN_USER_NAME.to_string();
        };
        self.lookup_user_name(user_id)
            .await
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string())
    }

    async fn lookup_user_name(&self, user_id: UserId) -> Option<String> {
        match self.api.get_user(user_id).await {
            Ok(profile) => profile.display_name().map(str::to_string),
            Err(e) => {
                debug!(user_id = user_id.0, error = %e, "user lookup failed");
                None
            }
        }
    }
}
