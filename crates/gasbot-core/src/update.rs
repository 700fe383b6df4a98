//! Inbound update model and envelope parsing.
//!
//! The same envelope arrives from the webhook body and from each element of a
//! long-poll batch. Two field layouts are accepted: the flat one
//! (`message.chat_id`, `message.user_id`) and the nested one
//! (`message.recipient.chat_id`, `message.sender.user_id`).

use serde::Deserialize;

use crate::{
    domain::{ChatId, UserId},
    errors::Error,
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    MessageCreated,
    Callback,
    BotAdded,
    BotStarted,
    BotRemoved,
}

impl UpdateKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "message_created" => Some(Self::MessageCreated),
            "message_callback" | "callback" => Some(Self::Callback),
            "bot_added" => Some(Self::BotAdded),
            "bot_started" => Some(Self::BotStarted),
            "bot_removed" => Some(Self::BotRemoved),
            _ => None,
        }
    }
}

/// One inbound event, constructed per request and dropped after handling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    pub kind: UpdateKind,
    pub chat_id: ChatId,
    pub user_id: Option<UserId>,
    /// Sender name when the envelope carries one (saves a lookup call).
    pub user_name: Option<String>,
    pub text: Option<String>,
    pub callback_id: Option<String>,
    pub callback_payload: Option<String>,
}

/// Result of parsing an envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed {
    Update(Update),
    /// Well-formed envelope of a type the bot does not handle.
    Ignored { update_type: String },
}

#[derive(Deserialize)]
struct RawUpdate {
    #[serde(rename = "type", alias = "update_type")]
    update_type: Option<String>,
    message: Option<RawMessage>,
    callback: Option<RawCallback>,
    chat_id: Option<i64>,
    user_id: Option<i64>,
    user: Option<RawUser>,
}

#[derive(Deserialize)]
struct RawMessage {
    chat_id: Option<i64>,
    user_id: Option<i64>,
    recipient: Option<RawRecipient>,
    sender: Option<RawUser>,
    body: Option<RawBody>,
}

impl RawMessage {
    fn chat_id(&self) -> Option<i64> {
        self.chat_id
            .or_else(|| self.recipient.as_ref().and_then(|r| r.chat_id))
    }

    fn user_id(&self) -> Option<i64> {
        self.user_id
            .or_else(|| self.sender.as_ref().and_then(|s| s.user_id))
    }
}

#[derive(Deserialize)]
struct RawRecipient {
    chat_id: Option<i64>,
}

#[derive(Deserialize)]
struct RawBody {
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawUser {
    user_id: Option<i64>,
    first_name: Option<String>,
    name: Option<String>,
    username: Option<String>,
}

impl RawUser {
    fn display_name(&self) -> Option<String> {
        [&self.first_name, &self.name, &self.username]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Deserialize)]
struct RawCallback {
    callback_id: Option<String>,
    payload: Option<String>,
    user_id: Option<i64>,
    user: Option<RawUser>,
    message: Option<RawMessage>,
}

fn malformed(what: &str) -> Error {
    Error::MalformedUpdate(what.to_string())
}

/// Parse a raw JSON envelope.
///
/// Fails with [`Error::MalformedUpdate`] when the envelope is not an object,
/// has no type, or lacks the fields its type needs to be answered.
pub fn parse_update(raw: &serde_json::Value) -> Result<Parsed> {
    let env: RawUpdate = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedUpdate(format!("bad envelope: {e}")))?;

    let update_type = env
        .update_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("missing `type`"))?;

    let Some(kind) = UpdateKind::parse(update_type) else {
        return Ok(Parsed::Ignored {
            update_type: update_type.to_string(),
        });
    };

    let update = match kind {
        UpdateKind::MessageCreated => {
            let msg = env
                .message
                .as_ref()
                .ok_or_else(|| malformed("message_created without `message`"))?;
            let chat_id = msg
                .chat_id()
                .or(env.chat_id)
                .ok_or_else(|| malformed("message without chat id"))?;
            Update {
                kind,
                chat_id: ChatId(chat_id),
                user_id: msg.user_id().or(env.user_id).map(UserId),
                user_name: msg.sender.as_ref().and_then(RawUser::display_name),
                text: msg.body.as_ref().and_then(|b| b.text.clone()),
                callback_id: None,
                callback_payload: None,
            }
        }
        UpdateKind::Callback => {
            let cb = env
                .callback
                .as_ref()
                .ok_or_else(|| malformed("message_callback without `callback`"))?;
            let payload = cb
                .payload
                .clone()
                .ok_or_else(|| malformed("callback without `payload`"))?;
            let chat_id = cb
                .message
                .as_ref()
                .and_then(RawMessage::chat_id)
                .or_else(|| env.message.as_ref().and_then(RawMessage::chat_id))
                .or(env.chat_id)
                .ok_or_else(|| malformed("callback without chat id"))?;
            Update {
                kind,
                chat_id: ChatId(chat_id),
                user_id: cb
                    .user_id
                    .or_else(|| cb.user.as_ref().and_then(|u| u.user_id))
                    .or(env.user_id)
                    .map(UserId),
                user_name: cb.user.as_ref().and_then(RawUser::display_name),
                text: None,
                callback_id: cb.callback_id.clone(),
                callback_payload: Some(payload),
            }
        }
        UpdateKind::BotAdded | UpdateKind::BotStarted | UpdateKind::BotRemoved => {
            let chat_id = env
                .chat_id
                .ok_or_else(|| malformed("chat event without `chat_id`"))?;
            Update {
                kind,
                chat_id: ChatId(chat_id),
                user_id: env
                    .user_id
                    .or_else(|| env.user.as_ref().and_then(|u| u.user_id))
                    .map(UserId),
                user_name: env.user.as_ref().and_then(RawUser::display_name),
                text: None,
                callback_id: None,
                callback_payload: None,
            }
        }
    };

    Ok(Parsed::Update(update))
}
