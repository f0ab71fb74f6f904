//! Spreadsheet import handler
//!
//! Accepts a base64-encoded Excel/CSV file over NATS request/reply and runs
//! the import pipeline against Postgres. Imports run sequentially within
//! this handler; a second request waits until the first finishes.

use anyhow::Result;
use async_nats::{Client, Subscriber};
use base64::Engine;
use futures::StreamExt;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::services::import::store::{PgCaseStore, PgLookupStore};
use crate::services::import::{self, ImportError};
use crate::types::{ErrorResponse, ImportFileRequest, Request, SuccessResponse};

fn error_code(e: &ImportError) -> &'static str {
    match e {
        ImportError::UnreadableFile(_)
        | ImportError::NoDataRows
        | ImportError::NoCaseNumberColumn => "INVALID_FILE",
        ImportError::Storage(_) => "STORAGE_ERROR",
    }
}

/// Handle caseflow.import.excel requests
pub async fn handle_import_file(
    client: Client,
    mut subscriber: Subscriber,
    pool: PgPool,
) -> Result<()> {
    let lookup_store = PgLookupStore::new(pool.clone());
    let case_store = PgCaseStore::new(pool);

    while let Some(msg) = subscriber.next().await {
        let reply = match msg.reply {
            Some(ref r) => r.clone(),
            None => {
                error!("Import message without reply subject");
                continue;
            }
        };

        let request: Request<ImportFileRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse import request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let file_name = request.payload.file_name.clone();
        info!("Import requested for '{}'", file_name);

        let bytes = match base64::engine::general_purpose::STANDARD
            .decode(&request.payload.content_base64)
        {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to decode import payload: {}", e);
                let error = ErrorResponse::new(
                    request.id,
                    "INVALID_REQUEST",
                    format!("Invalid base64 file content: {}", e),
                );
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match import::run_import(&lookup_store, &case_store, &file_name, &bytes).await {
            Ok(result) => {
                let success = SuccessResponse::new(request.id, result);
                let _ = client.publish(reply, serde_json::to_vec(&success)?.into()).await;
            }
            Err(e) => {
                error!("Import of '{}' failed: {}", file_name, e);
                let error = ErrorResponse::new(request.id, error_code(&e), e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
