use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use report_viewer::config::DbConfig;
use report_viewer::server::{self, ServerOptions};
use report_viewer::services::database::MySqlConnection;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    tracing::info!("Server exiting");
}

async fn run() -> Result<()> {
    dotenv::dotenv().ok();

    let config = DbConfig::from_env()?;
    let connection = MySqlConnection::open(&config)
        .await
        .context("DB connect error")?;
    tracing::info!("DB health check: OK");

    server::serve(
        Arc::new(connection),
        ServerOptions::default(),
        server::shutdown_signal(),
    )
    .await
}
