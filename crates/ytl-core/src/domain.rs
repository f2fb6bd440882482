use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric). Channels use negative ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The user behind an incoming update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub full_name: String,
}

impl Sender {
    /// Handle recorded as the author of a submission: the `@username` when the
    /// user has one, otherwise their display name.
    pub fn author_handle(&self) -> String {
        match self.username.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => self.full_name.clone(),
        }
    }
}

/// A stored video link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRecord {
    pub url: String,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store stamps `created_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewVideo {
    pub url: String,
    pub title: String,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(username: Option<&str>) -> Sender {
        Sender {
            id: UserId(7),
            username: username.map(str::to_string),
            full_name: "Ann Lee".to_string(),
        }
    }

    #[test]
    fn author_prefers_username() {
        assert_eq!(sender(Some("ann")).author_handle(), "ann");
    }

    #[test]
    fn author_falls_back_to_full_name() {
        assert_eq!(sender(None).author_handle(), "Ann Lee");
        assert_eq!(sender(Some("  ")).author_handle(), "Ann Lee");
    }
}
