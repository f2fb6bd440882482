use std::sync::Arc;

use teloxide::prelude::*;

use ytl_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::{CallbackQuery as CoreCallback, IncomingUpdate},
};

use super::message::sender_from_user;
use crate::router::AppState;

pub fn callback_update(q: &CallbackQuery) -> IncomingUpdate {
    IncomingUpdate::Callback(CoreCallback {
        sender: sender_from_user(&q.from),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message: q.message.as_ref().map(|m| MessageRef {
            chat_id: ChatId(m.chat.id.0),
            message_id: MessageId(m.id.0),
        }),
    })
}

/// Navigation buttons. The core always answers the query, including for
/// payloads it does not understand.
pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    state.bot.handle(callback_update(&q)).await;
    Ok(())
}
