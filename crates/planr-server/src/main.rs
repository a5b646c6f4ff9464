//! planr server - main entry point

use anyhow::Result;
use planr_common::logging::{init_logging, LogConfig};
use tracing::info;

use planr_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("planr-server".to_string())
        .filter_directives("planr_server=debug,tower_http=debug,sqlx=warn".to_string())
        .build()
        .merge_env()?;

    // Keeps the file writer flushing until shutdown
    let _log_guard = init_logging(&log_config)?;

    info!("Starting planr server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
