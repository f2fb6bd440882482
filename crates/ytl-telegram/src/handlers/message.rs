use std::sync::Arc;

use teloxide::{prelude::*, types::User};
use tracing::debug;

use ytl_core::{
    dispatch::parse_command,
    domain::{ChatId, MessageId, Sender, UserId},
    messaging::types::{Command, IncomingUpdate, TextMessage},
};

use crate::router::AppState;

pub fn sender_from_user(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        full_name: user.full_name(),
    }
}

/// Commands (`/...`) and plain text from a user. Anything else (stickers,
/// photos, service messages, anonymous senders) yields `None`.
pub fn message_update(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;

    let chat_id = ChatId(msg.chat.id.0);
    let message_id = MessageId(msg.id.0);
    let sender = sender_from_user(user);

    if text.starts_with('/') {
        let name = parse_command(text);
        return Some(IncomingUpdate::Command(Command {
            chat_id,
            message_id,
            sender,
            name,
        }));
    }

    Some(IncomingUpdate::Text(TextMessage {
        chat_id,
        message_id,
        sender,
        text: text.to_string(),
    }))
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = message_update(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };

    state.bot.handle(update).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(text: Option<&str>, username: Option<&str>) -> Message {
        let mut from = json!({
            "id": 7,
            "is_bot": false,
            "first_name": "Ann",
            "last_name": "Lee"
        });
        if let Some(u) = username {
            from["username"] = json!(u);
        }
        let mut m = json!({
            "message_id": 42,
            "date": 1_700_000_000,
            "chat": { "id": 10, "type": "private", "first_name": "Ann" },
            "from": from
        });
        match text {
            Some(t) => m["text"] = json!(t),
            None => m["location"] = json!({ "latitude": 55.75, "longitude": 37.62 }),
        }
        serde_json::from_value(m).unwrap()
    }

    #[test]
    fn command_text_becomes_command_update() {
        let msg = message(Some("/save@ytl_bot"), Some("ann"));
        let Some(IncomingUpdate::Command(cmd)) = message_update(&msg) else {
            panic!("expected command");
        };
        assert_eq!(cmd.name, "save");
        assert_eq!(cmd.chat_id, ChatId(10));
        assert_eq!(cmd.message_id, MessageId(42));
        assert_eq!(cmd.sender.id, UserId(7));
        assert_eq!(cmd.sender.author_handle(), "ann");
    }

    #[test]
    fn plain_text_becomes_text_update_with_full_name_fallback() {
        let msg = message(Some("https://youtu.be/x"), None);
        let Some(IncomingUpdate::Text(t)) = message_update(&msg) else {
            panic!("expected text");
        };
        assert_eq!(t.text, "https://youtu.be/x");
        assert_eq!(t.sender.username, None);
        assert_eq!(t.sender.author_handle(), "Ann Lee");
    }

    #[test]
    fn non_text_messages_are_skipped() {
        assert!(message_update(&message(None, Some("ann"))).is_none());
    }
}
