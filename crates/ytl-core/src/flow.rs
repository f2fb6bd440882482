//! Two-step submission flow: `/save`, then a link in the next text message.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    domain::{ChatId, MessageId, NewVideo, UserId, VideoRecord},
    formatting::{escape_markdown, STORE_UNAVAILABLE_TEXT},
    messaging::{
        port::MessagingPort,
        types::{Command, OutgoingMessage, TextMessage},
    },
    ports::{InsertOutcome, MetadataLookup, MetadataProvider, VideoStore},
    validation::is_valid_youtube_url,
    Result,
};

pub const PROMPT_TEXT: &str = "🔗 Send me a link to a YouTube video.";
pub const INVALID_URL_TEXT: &str =
    "⚠ That doesn't look like a YouTube link! Send /save to try again.";
pub const ALREADY_PRESENT_TEXT: &str = "⚠ This video is already saved!";
pub const UNAVAILABLE_TEXT: &str = "⚠ Couldn't get information about this video. It may have been deleted or is unavailable. Send /save to try another link.";
pub const INTERRUPTED_TEXT: &str =
    "⚠ The bot is restarting and your link was not saved. Send /save to try again in a minute.";

/// Per-user position in the submission flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    AwaitingCommand,
    AwaitingUrl,
}

/// What happened to a candidate link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    InvalidUrl,
    AlreadyPresent,
    Unavailable,
    /// Shutdown cut the metadata lookup short.
    Interrupted,
    Saved(VideoRecord),
    StoreUnavailable,
}

pub struct SubmissionFlow {
    store: Arc<dyn VideoStore>,
    metadata: Arc<dyn MetadataProvider>,
    messenger: Arc<dyn MessagingPort>,
    announce_channel: ChatId,
    // Users absent from the map are in `AwaitingCommand`.
    states: Mutex<HashMap<UserId, FlowState>>,
}

impl SubmissionFlow {
    pub fn new(
        store: Arc<dyn VideoStore>,
        metadata: Arc<dyn MetadataProvider>,
        messenger: Arc<dyn MessagingPort>,
        announce_channel: ChatId,
    ) -> Self {
        Self {
            store,
            metadata,
            messenger,
            announce_channel,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub async fn state(&self, user: UserId) -> FlowState {
        self.states
            .lock()
            .await
            .get(&user)
            .copied()
            .unwrap_or(FlowState::AwaitingCommand)
    }

    /// `/save`: arm the one-shot link entry for this user and prompt for the link.
    pub async fn begin(&self, cmd: &Command) -> Result<()> {
        self.states
            .lock()
            .await
            .insert(cmd.sender.id, FlowState::AwaitingUrl);

        self.messenger
            .send(OutgoingMessage::plain(cmd.chat_id, PROMPT_TEXT).reply_to(cmd.message_id))
            .await?;
        Ok(())
    }

    /// Feed a plain-text message. Returns `None` when the sender was not in the
    /// middle of a submission (the message is ignored).
    ///
    /// The entry is consumed before any check runs, so a rejected link needs a
    /// fresh `/save`.
    pub async fn on_text(&self, msg: &TextMessage) -> Result<Option<SubmissionOutcome>> {
        let armed = self.states.lock().await.remove(&msg.sender.id);
        if armed != Some(FlowState::AwaitingUrl) {
            return Ok(None);
        }

        match self.submit(msg).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if e.is_store_unavailable() => {
                error!(user_id = msg.sender.id.0, error = %e, "video store unavailable");
                self.reply(msg.chat_id, msg.message_id, STORE_UNAVAILABLE_TEXT)
                    .await?;
                Ok(Some(SubmissionOutcome::StoreUnavailable))
            }
            Err(e) => Err(e),
        }
    }

    async fn submit(&self, msg: &TextMessage) -> Result<SubmissionOutcome> {
        let url = msg.text.trim();

        if !is_valid_youtube_url(url) {
            self.reply(msg.chat_id, msg.message_id, INVALID_URL_TEXT)
                .await?;
            return Ok(SubmissionOutcome::InvalidUrl);
        }

        if self.store.exists(url).await? {
            self.reply(msg.chat_id, msg.message_id, ALREADY_PRESENT_TEXT)
                .await?;
            return Ok(SubmissionOutcome::AlreadyPresent);
        }

        let title = match self.metadata.lookup(url).await {
            MetadataLookup::Found(meta) => meta.title,
            MetadataLookup::Unavailable { reason } => {
                warn!(url, %reason, "video metadata unavailable");
                self.reply(msg.chat_id, msg.message_id, UNAVAILABLE_TEXT)
                    .await?;
                return Ok(SubmissionOutcome::Unavailable);
            }
            MetadataLookup::Interrupted => {
                info!(url, "submission interrupted by shutdown");
                self.reply(msg.chat_id, msg.message_id, INTERRUPTED_TEXT)
                    .await?;
                return Ok(SubmissionOutcome::Interrupted);
            }
        };

        let video = NewVideo {
            url: url.to_string(),
            title,
            author: msg.sender.author_handle(),
        };
        let record = match self.store.insert(video).await? {
            InsertOutcome::Inserted(record) => record,
            InsertOutcome::Duplicate => {
                info!(url, "lost insert race; link already stored");
                self.reply(msg.chat_id, msg.message_id, ALREADY_PRESENT_TEXT)
                    .await?;
                return Ok(SubmissionOutcome::AlreadyPresent);
            }
        };
        info!(url = %record.url, author = %record.author, "video saved");

        // The record is stored; delivery failures are only logged.
        let text = confirmation_text(&record);
        let to_user = OutgoingMessage::markdown(msg.chat_id, text.clone()).reply_to(msg.message_id);
        if let Err(e) = self.messenger.send(to_user).await {
            error!(chat_id = msg.chat_id.0, error = %e, "failed to confirm submission");
        }
        let to_channel = OutgoingMessage::markdown(self.announce_channel, text);
        if let Err(e) = self.messenger.send(to_channel).await {
            error!(
                channel_id = self.announce_channel.0,
                error = %e,
                "failed to announce submission"
            );
        }

        Ok(SubmissionOutcome::Saved(record))
    }

    async fn reply(&self, chat_id: ChatId, reply_to: MessageId, text: &str) -> Result<()> {
        self.messenger
            .send(OutgoingMessage::plain(chat_id, text).reply_to(reply_to))
            .await?;
        Ok(())
    }
}

/// MarkdownV2 confirmation shared by the submitter's reply and the channel post.
pub fn confirmation_text(record: &VideoRecord) -> String {
    format!(
        "✅ *Video added:*\n📌 {}\n🔗 {}\n👤 {}",
        escape_markdown(&record.title),
        escape_markdown(&record.url),
        escape_markdown(&record.author)
    )
}
