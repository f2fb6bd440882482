use std::sync::Arc;

use anyhow::Context;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::Recipient};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ytl_core::{
    config::{AnnounceChannel, Config},
    dispatch::VideoBot,
    domain::ChatId,
    messaging::port::MessagingPort,
    ports::{MetadataProvider, VideoStore},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<VideoBot>,
}

/// Numeric ids pass through; `@channel` handles are looked up once.
pub async fn resolve_announce_channel(
    bot: &Bot,
    channel: &AnnounceChannel,
) -> anyhow::Result<ChatId> {
    match channel {
        AnnounceChannel::Id(id) => Ok(*id),
        AnnounceChannel::Username(name) => {
            let chat = bot
                .get_chat(Recipient::ChannelUsername(name.clone()))
                .await
                .with_context(|| format!("failed to resolve announcement channel {name}"))?;
            info!(channel = %name, chat_id = chat.id.0, "resolved announcement channel");
            Ok(ChatId(chat.id.0))
        }
    }
}

/// Long-poll Telegram until Ctrl-C.
///
/// On Ctrl-C `shutdown` is cancelled (aborting metadata lookups), the
/// dispatcher stops taking updates and in-flight handlers get
/// `cfg.shutdown_grace` to finish before this returns.
pub async fn run_polling(
    cfg: Arc<Config>,
    store: Arc<dyn VideoStore>,
    metadata: Arc<dyn MetadataProvider>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => warn!(error = %e, "getMe failed; continuing"),
    }

    let announce_channel = resolve_announce_channel(&bot, &cfg.announce_channel).await?;
    info!(chat_id = announce_channel.0, "announcing submissions");

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        bot: Arc::new(VideoBot::new(store, metadata, messenger, announce_channel)),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!(update_id = upd.id, "unhandled update");
        })
        .build();

    let dispatcher_token = dispatcher.shutdown_token();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        info!("shutdown requested; draining in-flight updates");
        signal_shutdown.cancel();
        if let Ok(stopped) = dispatcher_token.shutdown() {
            stopped.await;
        }
    });

    let grace = cfg.shutdown_grace;
    tokio::select! {
      _ = dispatcher.dispatch() => {
        info!("dispatcher stopped");
      }
      _ = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
      } => {
        warn!(grace_ms = grace.as_millis() as u64, "in-flight updates did not drain in time");
      }
    }

    Ok(())
}
