//! Ping handler for health checks
//!
//! Replies identify the worker by name and version so a frontend talking to
//! several backends can tell which one answered.

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Serialize, Deserialize)]
struct PingRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PongResponse {
    message: String,
    service: String,
    version: String,
    timestamp: String,
}

impl PongResponse {
    fn for_request(request: PingRequest) -> Self {
        Self {
            message: request
                .message
                .map(|m| format!("Pong: {}", m))
                .unwrap_or_else(|| "Pong".to_string()),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Handle ping messages
pub async fn handle_ping(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received ping message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                error!("Ping message without reply subject");
                continue;
            }
        };

        let request: PingRequest = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse ping request: {}", e);
                let error_response = serde_json::json!({
                    "error": {
                        "code": "INVALID_REQUEST",
                        "message": format!("Failed to parse request: {}", e)
                    }
                });
                let _ = client.publish(reply, error_response.to_string().into()).await;
                continue;
            }
        };

        let response = PongResponse::for_request(request);
        let response_bytes = serde_json::to_vec(&response)?;
        client.publish(reply, response_bytes.into()).await?;

        debug!("Sent pong response");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_echoes_message_and_identifies_worker() {
        let response = PongResponse::for_request(PingRequest {
            message: Some("hello".to_string()),
            timestamp: None,
        });
        assert_eq!(response.message, "Pong: hello");
        assert_eq!(response.service, "caseflow-worker");
        assert!(!response.version.is_empty());
    }

    #[test]
    fn test_pong_without_message() {
        let response = PongResponse::for_request(PingRequest {
            message: None,
            timestamp: None,
        });
        assert_eq!(response.message, "Pong");
    }
}
