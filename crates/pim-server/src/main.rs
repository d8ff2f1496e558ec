//! PIM Server - Main entry point

use anyhow::Result;
use pim_common::logging::{init_logging, LogConfig};
use tracing::info;

use pim_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::from_env()
        .unwrap_or_default()
        .with_file_prefix("pim-server");
    let log_config = if log_config.filter_directives.is_none() {
        log_config.with_filter("pim_server=debug,tower_http=debug,sqlx=info")
    } else {
        log_config
    };

    init_logging(&log_config)?;

    info!("Starting PIM Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
