//! Inbound webhook handler for the Web API.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;
use utoipa;

use crate::routing::{InboundEmail, InboundOutcome};
use crate::web::dto::{ApiResponse, InboundWebhookRequest, WebhookResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Header carrying the shared webhook token.
pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

/// POST /api/webhook/inbound - Inbound mail from the relay.
///
/// Unknown recipients and deactivated mappings are accepted and dropped
/// with a 200, never rejected: a non-2xx answer would make the relay
/// bounce, and stale reverse aliases would turn into bounce storms.
#[utoipa::path(
    post,
    path = "/webhook/inbound",
    tag = "webhook",
    request_body = InboundWebhookRequest,
    responses(
        (status = 200, description = "Message routed or dropped", body = WebhookResponse),
        (status = 401, description = "Bad webhook token")
    )
)]
pub async fn inbound_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<InboundWebhookRequest>,
) -> Result<Json<ApiResponse<WebhookResponse>>, ApiError> {
    // The webhook is not a user endpoint; it authenticates with the shared
    // token from config. An empty configured token disables the check.
    if !state.webhook_token.is_empty() {
        let presented = headers
            .get(WEBHOOK_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if presented != state.webhook_token {
            return Err(ApiError::unauthorized("bad webhook token"));
        }
    }

    let outcome = state
        .inbound_router()
        .handle(InboundEmail {
            recipient: req.recipient,
            sender: req.sender,
            subject: req.subject,
            body_text: req.body_plain,
            body_html: req.body_html,
            message_id: req.message_id,
        })
        .await?;

    let response = match outcome {
        InboundOutcome::Forwarded { delivered, .. } => WebhookResponse {
            outcome: "forwarded".to_string(),
            delivered: Some(delivered),
        },
        InboundOutcome::Dropped(reason) => {
            tracing::debug!(?reason, "inbound message dropped");
            WebhookResponse {
                outcome: "dropped".to_string(),
                delivered: None,
            }
        }
    };

    Ok(Json(ApiResponse::new(response)))
}
