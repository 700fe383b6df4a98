use crate::intent::Intent;

/// Text markup mode the platform should apply to a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatMode {
    Plain,
    Markdown,
}

/// What pressing a button does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// Sends the intent key back as a callback payload.
    Callback(Intent),
    /// Opens an external URL.
    Link(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, intent: Intent) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(intent),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Link(url.into()),
        }
    }
}

/// Inline keyboard: ordered rows of buttons attached to a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// A fully rendered response, ready to hand to the API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: InlineKeyboard,
    pub format: FormatMode,
}
