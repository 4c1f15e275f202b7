pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod state;

use anyhow::Result;
use presentation::{SERVICE_NAME, build_router, server};
use shared::{AppConfig, logging};
use state::AppState;
use std::time::Duration;

pub fn load_config() -> Result<AppConfig> {
    Ok(AppConfig::from_env()?)
}

pub async fn run(config: AppConfig) -> Result<()> {
    logging::init(SERVICE_NAME, &config.logging);

    let state = AppState::new(&config).await?;
    let router = build_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );
    server::serve(&config, router).await
}
