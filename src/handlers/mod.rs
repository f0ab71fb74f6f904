//! NATS message handlers

pub mod import;
pub mod ping;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe("caseflow.ping").await?;
    let import_sub = client.subscribe("caseflow.import.excel").await?;

    info!("Subscribed to NATS subjects");

    let client_ping = client.clone();
    let client_import = client.clone();

    let ping_handle = tokio::spawn(async move {
        if let Err(e) = ping::handle_ping(client_ping, ping_sub).await {
            error!("Ping handler error: {}", e);
        }
    });

    let import_handle = tokio::spawn(async move {
        if let Err(e) = import::handle_import_file(client_import, import_sub, pool).await {
            error!("Import handler error: {}", e);
        }
    });

    info!("All handlers started");

    // Handlers run until the NATS connection drops.
    select! {
        _ = ping_handle => error!("Ping handler exited"),
        _ = import_handle => error!("Import handler exited"),
    }

    Ok(())
}
