//! Paginated `/list` output with inline previous/next buttons.

use std::sync::Arc;

use tracing::{error, warn};

use crate::{
    callback::CallbackPayload,
    domain::{ChatId, MessageId, VideoRecord},
    formatting::{bold, escape_markdown, STORE_UNAVAILABLE_TEXT},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, InlineButton, InlineKeyboard, OutgoingMessage},
    },
    ports::VideoStore,
    Result,
};

pub const PAGE_SIZE: u64 = 5;

pub const EMPTY_TEXT: &str = "😔 No videos saved yet.";
pub const PREV_LABEL: &str = "⬅️ Back";
pub const NEXT_LABEL: &str = "➡️ Next";
pub const INVALID_BUTTON_TEXT: &str = "This button is no longer valid.";

/// Number of pages needed for `count` records.
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(PAGE_SIZE)
}

/// Zero-based row offset of a 1-based page.
pub fn page_offset(page: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * PAGE_SIZE
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    /// MarkdownV2.
    pub text: String,
    pub keyboard: InlineKeyboard,
    /// Record count the header and buttons were built from.
    pub total: u64,
}

/// Render one page of records, or `None` if the page is empty.
///
/// `count` is the total number of stored records as read just before the
/// slice; it is only used for the header and the navigation buttons.
pub fn render_page(page: u32, count: u64, records: &[VideoRecord]) -> Option<RenderedPage> {
    if records.is_empty() {
        return None;
    }
    let page = page.max(1);

    // Count and slice come from separate statements; never claim fewer records
    // than the slice proves exist.
    let count = count.max(page_offset(page) + records.len() as u64);

    let mut text = format!(
        "📋 {}\n\n",
        bold(&format!("Videos (page {page} of {}):", total_pages(count)))
    );
    for r in records {
        text.push_str(&format!(
            "🎥 {}\n🔗 {}\n👤 {}\n\n",
            bold(&r.title),
            escape_markdown(&r.url),
            escape_markdown(&r.author)
        ));
    }
    let text = text.trim_end().to_string();

    let mut buttons = Vec::new();
    if page > 1 {
        buttons.push(InlineButton {
            label: PREV_LABEL.to_string(),
            callback_data: CallbackPayload::ListPage { page: page - 1 }.encode(),
        });
    }
    if u64::from(page) * PAGE_SIZE < count {
        buttons.push(InlineButton {
            label: NEXT_LABEL.to_string(),
            callback_data: CallbackPayload::ListPage { page: page + 1 }.encode(),
        });
    }

    Some(RenderedPage {
        text,
        keyboard: InlineKeyboard::single_row(buttons),
        total: count,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOutcome {
    Empty,
    Rendered { page: u32, shown: usize, total: u64 },
    StoreUnavailable,
}

pub struct Listing {
    store: Arc<dyn VideoStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl Listing {
    pub fn new(store: Arc<dyn VideoStore>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self { store, messenger }
    }

    /// Send page `page` (1-based) to `chat_id`.
    pub async fn show(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        page: u32,
    ) -> Result<ListOutcome> {
        let fetched = async {
            let count = self.store.count().await?;
            let records = self.store.page(page_offset(page), PAGE_SIZE).await?;
            Ok::<_, crate::Error>((count, records))
        }
        .await;

        let (outcome, msg) = match fetched {
            Ok((count, records)) => match render_page(page, count, &records) {
                Some(rendered) => (
                    ListOutcome::Rendered {
                        page,
                        shown: records.len(),
                        total: rendered.total,
                    },
                    OutgoingMessage::markdown(chat_id, rendered.text)
                        .with_keyboard(rendered.keyboard),
                ),
                None => (ListOutcome::Empty, OutgoingMessage::plain(chat_id, EMPTY_TEXT)),
            },
            Err(e) if e.is_store_unavailable() => {
                error!(chat_id = chat_id.0, page, error = %e, "video store unavailable");
                (
                    ListOutcome::StoreUnavailable,
                    OutgoingMessage::plain(chat_id, STORE_UNAVAILABLE_TEXT),
                )
            }
            Err(e) => return Err(e),
        };

        let msg = match reply_to {
            Some(id) => msg.reply_to(id),
            None => msg,
        };
        self.messenger.send(msg).await?;
        Ok(outcome)
    }

    /// Handle a navigation button press: render the target page as a new reply
    /// to the list message, then acknowledge the press.
    ///
    /// Returns `None` when the payload was not a valid list button.
    pub async fn on_callback(&self, q: &CallbackQuery) -> Result<Option<ListOutcome>> {
        let page = match CallbackPayload::parse(&q.data) {
            Ok(CallbackPayload::ListPage { page }) => page,
            Err(e) => {
                warn!(data = %q.data, error = %e, "rejected callback payload");
                self.messenger
                    .answer_callback_query(&q.callback_id, Some(INVALID_BUTTON_TEXT))
                    .await?;
                return Ok(None);
            }
        };

        let Some(origin) = q.message else {
            // Message too old for Telegram to hand back; nowhere to reply.
            self.messenger
                .answer_callback_query(&q.callback_id, Some(INVALID_BUTTON_TEXT))
                .await?;
            return Ok(None);
        };

        let shown = self
            .show(origin.chat_id, Some(origin.message_id), page)
            .await;
        let acked = self
            .messenger
            .answer_callback_query(&q.callback_id, None)
            .await;

        let outcome = shown?;
        acked?;
        Ok(Some(outcome))
    }
}
