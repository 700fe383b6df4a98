/// Platform user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Platform chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Identity of the bot account, fetched once at startup for logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub display_name: String,
    pub username: Option<String>,
}

/// Public profile of a platform user, as returned by the user lookup call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

impl UserProfile {
    /// Best display name: first name, then full name, then username.
    pub fn display_name(&self) -> Option<&str> {
        [&self.first_name, &self.name, &self.username]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// One batch returned by a long-poll call.
#[derive(Clone, Debug, Default)]
pub struct UpdateBatch {
    pub updates: Vec<serde_json::Value>,
    /// Server-side cursor hint, if the platform returns one.
    pub marker: Option<i64>,
}
