//! HTTP handlers for LINE chatbot webhook

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::line_messaging::{parse_events, verify_signature, SIGNATURE_HEADER};
use crate::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for webhook processing
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle LINE webhook events
/// POST /webhook/line
///
/// Verifies the signature, then hands every event of the delivery to the
/// chatbot service. Any failure aborts the delivery with an error response.
pub async fn handle_line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    if state.config.line.verify_signature {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        verify_signature(&state.config.line.channel_secret, &body, signature)?;
    }

    let events = parse_events(&body)?;
    tracing::debug!("Received webhook with {} events", events.len());

    state.chatbot.process_events(events).await?;

    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook processed successfully".to_string(),
    }))
}
