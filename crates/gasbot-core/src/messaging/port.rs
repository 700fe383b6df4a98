use async_trait::async_trait;

use crate::{
    domain::{BotIdentity, ChatId, UpdateBatch, UserId, UserProfile},
    messaging::types::Reply,
    Result,
};

/// Outbound side of the messaging platform.
///
/// Implementations are thin: one HTTP call per method, a fixed timeout, no
/// retries. Callers decide what a failure means (for this bot: log it).
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn get_bot_identity(&self) -> Result<BotIdentity>;

    async fn get_user(&self, user_id: UserId) -> Result<UserProfile>;

    async fn send_message(&self, chat_id: ChatId, reply: &Reply) -> Result<()>;

    /// Stops the platform's pending indicator on a pressed button.
    async fn acknowledge_callback(&self, callback_id: &str) -> Result<()>;

    /// Long-poll for updates after `marker`.
    async fn get_updates(
        &self,
        marker: Option<i64>,
        limit: u32,
        timeout_secs: u64,
    ) -> Result<UpdateBatch>;

    /// Register `url` as the webhook target.
    async fn subscribe_webhook(&self, url: &str) -> Result<()>;
}
