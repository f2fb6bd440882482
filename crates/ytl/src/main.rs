use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ytl_core::{config::Config, ports::VideoStore};
use ytl_postgres::{PgStoreConfig, PgVideoStore};
use ytl_ytdlp::{YtDlpClient, YtDlpConfig};

#[tokio::main]
async fn main() -> Result<(), ytl_core::Error> {
    ytl_core::logging::init("ytl")?;

    let cfg = Arc::new(Config::load()?);
    let shutdown = CancellationToken::new();

    let store = Arc::new(
        PgVideoStore::connect(&PgStoreConfig {
            database_url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            acquire_timeout: cfg.db_acquire_timeout,
            query_timeout: cfg.db_query_timeout,
        })
        .await?,
    );
    tracing::info!("connected to database");

    let metadata = Arc::new(YtDlpClient::new(
        YtDlpConfig {
            ytdlp_path: cfg.ytdlp_path.clone(),
            timeout: cfg.metadata_timeout,
        },
        shutdown.clone(),
    ));

    let result = ytl_telegram::router::run_polling(
        cfg,
        store.clone(),
        metadata,
        shutdown.clone(),
    )
    .await;

    shutdown.cancel();
    store.close().await;
    tracing::info!("store closed");

    result.map_err(|e| ytl_core::Error::External(format!("telegram bot failed: {e:#}")))
}
