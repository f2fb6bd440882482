//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into a `ytl-core` `IncomingUpdate`
//! and hands it to the core dispatcher. Replies go out through the
//! MessagingPort, never through the `Bot` passed in here.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod message;

pub use callback::callback_update;
pub use message::{message_update, sender_from_user};

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    message::handle_message(msg, state).await
}
