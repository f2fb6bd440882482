//! Routes transport-neutral updates to the submission flow and the listing.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    domain::ChatId,
    flow::SubmissionFlow,
    formatting::{bold, escape_markdown},
    listing::Listing,
    messaging::{
        port::MessagingPort,
        types::{Command, IncomingUpdate, OutgoingMessage},
    },
    ports::{MetadataProvider, VideoStore},
    Result,
};

pub const UNKNOWN_COMMAND_TEXT: &str = "Unknown command. Try /save or /list.";

/// Lowercase command name from `/cmd@botname ...`. Trailing words are ignored.
pub fn parse_command(text: &str) -> String {
    let first = text.split_whitespace().next().unwrap_or("");

    first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// MarkdownV2 greeting for `/start`.
pub fn start_text() -> String {
    format!(
        "👋 {}\n\n📌 {}\n/save {}\n/list {}",
        escape_markdown("Hi! I'm a bot that saves YouTube links."),
        bold("Available commands:"),
        escape_markdown("- save a video"),
        escape_markdown("- list saved videos"),
    )
}

pub struct VideoBot {
    flow: SubmissionFlow,
    listing: Listing,
    messenger: Arc<dyn MessagingPort>,
}

impl VideoBot {
    pub fn new(
        store: Arc<dyn VideoStore>,
        metadata: Arc<dyn MetadataProvider>,
        messenger: Arc<dyn MessagingPort>,
        announce_channel: ChatId,
    ) -> Self {
        Self {
            flow: SubmissionFlow::new(
                store.clone(),
                metadata,
                messenger.clone(),
                announce_channel,
            ),
            listing: Listing::new(store, messenger.clone()),
            messenger,
        }
    }

    pub fn flow(&self) -> &SubmissionFlow {
        &self.flow
    }

    /// Handle one update. Errors are logged, never returned: a failed send must
    /// not stop the dispatcher.
    pub async fn handle(&self, update: IncomingUpdate) {
        if let Err(e) = self.try_handle(update).await {
            error!(error = %e, "update handler failed");
        }
    }

    pub async fn try_handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.on_command(&cmd).await,
            IncomingUpdate::Text(msg) => {
                if let Some(outcome) = self.flow.on_text(&msg).await? {
                    info!(user_id = msg.sender.id.0, ?outcome, "submission finished");
                } else {
                    debug!(user_id = msg.sender.id.0, "ignoring text outside a submission");
                }
                Ok(())
            }
            IncomingUpdate::Callback(q) => {
                self.listing.on_callback(&q).await?;
                Ok(())
            }
        }
    }

    async fn on_command(&self, cmd: &Command) -> Result<()> {
        match cmd.name.as_str() {
            "start" => {
                self.messenger
                    .send(OutgoingMessage::markdown(cmd.chat_id, start_text()).reply_to(cmd.message_id))
                    .await?;
            }
            "save" => self.flow.begin(cmd).await?,
            "list" => {
                self.listing
                    .show(cmd.chat_id, Some(cmd.message_id), 1)
                    .await?;
            }
            _ => {
                self.messenger
                    .send(OutgoingMessage::plain(cmd.chat_id, UNKNOWN_COMMAND_TEXT).reply_to(cmd.message_id))
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageId, MessageRef, UserId},
        flow::{FlowState, PROMPT_TEXT},
        listing::EMPTY_TEXT,
        messaging::types::{CallbackQuery, TextFormat, TextMessage},
        store::MemoryVideoStore,
        test_support::{sender, FakeMessenger, FakeMetadata},
    };

    const CHAT: ChatId = ChatId(10);
    const CHANNEL: ChatId = ChatId(-100);

    fn bot() -> (VideoBot, Arc<MemoryVideoStore>, Arc<FakeMessenger>) {
        let store = Arc::new(MemoryVideoStore::new());
        let messenger = Arc::new(FakeMessenger::default());
        let bot = VideoBot::new(
            store.clone(),
            Arc::new(FakeMetadata::found("A title")),
            messenger.clone(),
            CHANNEL,
        );
        (bot, store, messenger)
    }

    fn command(text: &str) -> IncomingUpdate {
        let name = parse_command(text);
        IncomingUpdate::Command(Command {
            chat_id: CHAT,
            message_id: MessageId(1),
            sender: sender(1, Some("ann")),
            name,
        })
    }

    fn text(body: &str) -> IncomingUpdate {
        IncomingUpdate::Text(TextMessage {
            chat_id: CHAT,
            message_id: MessageId(2),
            sender: sender(1, Some("ann")),
            text: body.to_string(),
        })
    }

    #[test]
    fn parses_commands_with_bot_suffix() {
        assert_eq!(parse_command("/save"), "save");
        assert_eq!(parse_command("/LIST@ytl_bot  2 "), "list");
        assert_eq!(parse_command("  /start"), "start");
        assert_eq!(parse_command("/"), "");
    }

    #[test]
    fn start_text_is_escaped_markdown() {
        let t = start_text();
        assert!(t.contains("*Available commands:*"));
        assert!(t.contains("links\\."));
        assert!(t.contains("/save \\- save a video"));
    }

    #[tokio::test]
    async fn start_replies_with_markdown_greeting() {
        let (bot, _, messenger) = bot();
        bot.handle(command("/start")).await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].format, TextFormat::MarkdownV2);
        assert_eq!(sent[0].text, start_text());
    }

    #[tokio::test]
    async fn save_then_link_then_list_end_to_end() {
        let (bot, store, messenger) = bot();

        bot.handle(command("/save")).await;
        assert_eq!(bot.flow().state(UserId(1)).await, FlowState::AwaitingUrl);
        bot.handle(text("https://www.youtube.com/watch?v=abc")).await;
        assert_eq!(store.len().await, 1);

        bot.handle(command("/list")).await;

        let to_chat = messenger.sent_to(CHAT);
        assert_eq!(to_chat[0].text, PROMPT_TEXT);
        assert!(to_chat[1].text.starts_with("✅ *Video added:*"));
        assert!(to_chat[2].text.contains("*A title*"));
        assert_eq!(messenger.sent_to(CHANNEL).len(), 1);
    }

    #[tokio::test]
    async fn list_command_with_empty_store() {
        let (bot, _, messenger) = bot();
        bot.handle(command("/list")).await;
        assert_eq!(messenger.sent()[0].text, EMPTY_TEXT);
    }

    #[tokio::test]
    async fn commands_do_not_consume_an_armed_submission() {
        let (bot, store, _) = bot();
        bot.handle(command("/save")).await;
        bot.handle(command("/list")).await;
        assert_eq!(bot.flow().state(UserId(1)).await, FlowState::AwaitingUrl);

        bot.handle(text("https://youtu.be/x")).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_command_gets_a_hint() {
        let (bot, _, messenger) = bot();
        bot.handle(command("/delete")).await;
        assert_eq!(messenger.sent()[0].text, UNKNOWN_COMMAND_TEXT);
    }

    #[tokio::test]
    async fn callback_is_routed_to_listing() {
        let (bot, _, messenger) = bot();
        bot.handle(IncomingUpdate::Callback(CallbackQuery {
            sender: sender(1, None),
            callback_id: "cb".to_string(),
            data: "list:1".to_string(),
            message: Some(MessageRef {
                chat_id: CHAT,
                message_id: MessageId(5),
            }),
        }))
        .await;

        assert_eq!(messenger.sent()[0].text, EMPTY_TEXT);
        assert_eq!(messenger.answered().len(), 1);
    }
}
