pub mod api; // REST surface
pub mod catalog; // Professionals, clients, services
pub mod config;
pub mod core_state; // Shared state handed to the API layer
pub mod db;
pub mod models;
pub mod scheduling; // Slots, validation, lifecycle, summaries

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::api::ApiServer;
use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::scheduling::{spawn_event_logger, ChannelNotifier};

const LOGGER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `filter`.
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init();
}

/// Load configuration, prepare the database and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(config.log_filter());

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let (notifier, events) = ChannelNotifier::channel(config.notification_buffer);
    let event_logger = spawn_event_logger(events);

    let bind_addr = config.bind_addr;
    let core = Arc::new(CoreState::new(config, Arc::new(notifier)));
    let db_path = core.prepare_database()?;
    tracing::info!(path = %db_path.display(), "Database ready");

    let server = ApiServer::start(core.clone(), bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.stop().await;

    // Dropping the last notifier closes the channel and ends the logger
    drop(core);
    match tokio::time::timeout(LOGGER_DRAIN_TIMEOUT, event_logger).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Notification logger ended abnormally: {e}"),
        Err(_) => tracing::warn!("Notification logger still running at exit"),
    }
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
