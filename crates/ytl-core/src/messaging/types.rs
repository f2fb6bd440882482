use crate::domain::{ChatId, MessageId, MessageRef, Sender};

/// Transport-neutral incoming update model.
///
/// Telegram-specific fields should live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub sender: Sender,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub sender: Sender,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub sender: Sender,
    pub callback_id: String,
    pub data: String,
    /// Message carrying the pressed button, if Telegram still has it.
    pub message: Option<MessageRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    MarkdownV2,
}

/// Inline keyboard; each inner vec is one row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    /// All buttons on a single row.
    pub fn single_row(buttons: Vec<InlineButton>) -> Self {
        if buttons.is_empty() {
            return Self::default();
        }
        Self {
            rows: vec![buttons],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub format: TextFormat,
    pub reply_to: Option<MessageId>,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutgoingMessage {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: TextFormat::Plain,
            reply_to: None,
            keyboard: None,
        }
    }

    /// `text` must already be valid MarkdownV2 (see `formatting::escape_markdown`).
    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::MarkdownV2,
            ..Self::plain(chat_id, text)
        }
    }

    pub fn reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        if !keyboard.is_empty() {
            self.keyboard = Some(keyboard);
        }
        self
    }
}
