use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

mod api;
mod checker;
mod config;
mod engine;
mod models;
mod store;

use crate::api::ApiState;
use crate::checker::UrlChecker;
use crate::config::WatchConfig;
use crate::engine::Monitor;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(true)
        .init();

    let config = WatchConfig::load("config.json")?;

    let store = store::open(&config.store).await;
    let monitor = Arc::new(Monitor::new(store.clone(), UrlChecker::new()));

    let state = ApiState {
        monitor: Arc::clone(&monitor),
        store,
        cron_secret: config.cron_secret(),
    };
    let api_port = config.api_port;
    tokio::spawn(async move {
        api::start_server(api_port, state).await;
    });

    if config.check_interval_secs > 0 {
        let monitor = Arc::clone(&monitor);
        tokio::spawn(monitor.run_periodic(config.check_interval_secs));
    }

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping llms-watch");

    Ok(())
}
