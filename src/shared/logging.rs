use crate::shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,tower_http=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// グローバル subscriber を設定する。既に設定済みなら何もせず false を返す
pub fn init(service_name: &str, config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.compact().try_init().is_ok(),
    };

    if installed {
        tracing::info!(
            service = service_name,
            format = ?config.format,
            "logging initialized"
        );
    }
    installed
}
