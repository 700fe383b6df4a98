//! JSON shapes exchanged with the platform API.

use serde::{Deserialize, Serialize};

use gasbot_core::{
    domain::{BotIdentity, UpdateBatch, UserProfile},
    messaging::types::{ButtonAction, FormatMode, InlineKeyboard, Reply},
};

/// Body of the create-message call.
#[derive(Debug, Serialize)]
pub struct NewMessageBody<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

impl<'a> NewMessageBody<'a> {
    pub fn from_reply(reply: &'a Reply) -> Self {
        let attachments = if reply.keyboard.is_empty() {
            Vec::new()
        } else {
            vec![Attachment::InlineKeyboard {
                payload: KeyboardPayload::from_keyboard(&reply.keyboard),
            }]
        };
        let format = match reply.format {
            FormatMode::Markdown => Some("markdown"),
            FormatMode::Plain => None,
        };
        Self {
            text: &reply.text,
            attachments,
            format,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    InlineKeyboard { payload: KeyboardPayload },
}

#[derive(Debug, Serialize)]
pub struct KeyboardPayload {
    pub buttons: Vec<Vec<Button>>,
}

impl KeyboardPayload {
    fn from_keyboard(keyboard: &InlineKeyboard) -> Self {
        let buttons = keyboard
            .rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.iter()
                    .map(|b| match &b.action {
                        ButtonAction::Callback(intent) => Button::Callback {
                            text: b.label.clone(),
                            payload: intent.key().to_string(),
                        },
                        ButtonAction::Link(url) => Button::Link {
                            text: b.label.clone(),
                            url: url.clone(),
                        },
                    })
                    .collect()
            })
            .collect();
        Self { buttons }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    Callback { text: String, payload: String },
    Link { text: String, url: String },
}

#[derive(Debug, Serialize)]
pub struct SubscriptionBody<'a> {
    pub url: &'a str,
}

/// User object returned by `/me` and `/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UserInfo {
    #[serde(alias = "id")]
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

impl UserInfo {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            user_id: self.user_id.unwrap_or_default(),
            first_name: self.first_name,
            name: self.name,
            username: self.username,
        }
    }

    pub fn into_identity(self) -> BotIdentity {
        let profile = self.into_profile();
        let display_name = profile.display_name().unwrap_or("Бот").to_string();
        BotIdentity {
            id: profile.user_id,
            display_name,
            username: profile.username,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatesResponse {
    #[serde(default)]
    pub updates: Vec<serde_json::Value>,
    pub marker: Option<i64>,
}

impl From<UpdatesResponse> for UpdateBatch {
    fn from(r: UpdatesResponse) -> Self {
        UpdateBatch {
            updates: r.updates,
            marker: r.marker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasbot_core::{catalog, intent::Intent};
    use serde_json::json;

    #[test]
    fn contacts_reply_wire_shape() {
        let reply = catalog::render(Intent::ShowContacts, &Default::default());
        let v = serde_json::to_value(NewMessageBody::from_reply(&reply)).unwrap();

        assert_eq!(v["format"], "markdown");
        assert_eq!(
            v["attachments"],
            json!([{
                "type": "inline_keyboard",
                "payload": {
                    "buttons": [[
                        { "type": "callback", "text": "🔙 Назад в меню", "payload": "back_to_menu" }
                    ]]
                }
            }])
        );
    }

    #[test]
    fn link_buttons_and_plain_format() {
        let reply = catalog::render(Intent::GreetingFallback, &Default::default());
        let v = serde_json::to_value(NewMessageBody::from_reply(&reply)).unwrap();

        assert!(v.get("format").is_none());
        let first_row = &v["attachments"][0]["payload"]["buttons"][0];
        assert_eq!(first_row[0]["payload"], "show_contacts");
        assert_eq!(first_row[1]["type"], "link");
        assert_eq!(first_row[1]["url"], catalog::PAYMENT_URL);
    }

    #[test]
    fn empty_keyboard_sends_no_attachments() {
        let reply = Reply {
            text: "x".to_string(),
            keyboard: InlineKeyboard::default(),
            format: FormatMode::Plain,
        };
        let v = serde_json::to_value(NewMessageBody::from_reply(&reply)).unwrap();
        assert_eq!(v, json!({ "text": "x" }));
    }

    #[test]
    fn identity_from_me_response() {
        let info: UserInfo =
            serde_json::from_value(json!({ "user_id": 99, "name": "Газ бот", "username": "gasbot", "is_bot": true }))
                .unwrap();
        let me = info.into_identity();
        assert_eq!(me.id, 99);
        assert_eq!(me.display_name, "Газ бот");
        assert_eq!(me.username.as_deref(), Some("gasbot"));
    }
}
