//! Outbound send handlers for the Web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::reverse::ReverseAliasService;
use crate::web::dto::{
    ApiResponse, MailboxDetailResponse, ReverseAliasResponse, SendMailRequest, SendMailResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/send - Send mail from an alias.
///
/// The alias address is the visible sender and reply-to; the caller's
/// real address never reaches the recipient.
#[utoipa::path(
    post,
    path = "/send",
    tag = "send",
    request_body = SendMailRequest,
    responses(
        (status = 200, description = "Mail relayed", body = SendMailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Viewer role cannot send"),
        (status = 404, description = "Alias not found or inaccessible"),
        (status = 422, description = "Bad destination address"),
        (status = 502, description = "Relay failure")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<SendMailRequest>,
) -> Result<Json<ApiResponse<SendMailResponse>>, ApiError> {
    let sent = state
        .outbound_sender()
        .send(claims.sub, &req.from, &req.to, &req.subject, &req.body)
        .await?;

    Ok(Json(ApiResponse::new(SendMailResponse {
        entry: MailboxDetailResponse::from(&sent.entry),
        reverse_address: sent.reverse_address,
    })))
}

/// POST /api/reverse/:id/deactivate - Deactivate a reverse alias.
///
/// Deactivation is terminal; a later send to the same recipient mints a
/// fresh identifier.
#[utoipa::path(
    post,
    path = "/reverse/{id}/deactivate",
    tag = "send",
    params(
        ("id" = i64, Path, description = "Reverse alias row ID")
    ),
    responses(
        (status = 200, description = "Reverse alias deactivated", body = ReverseAliasResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Reverse alias not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deactivate_reverse_alias(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(reverse_id): Path<i64>,
) -> Result<Json<ApiResponse<ReverseAliasResponse>>, ApiError> {
    let reverse = {
        let db = state.db.lock().await;
        ReverseAliasService::new(&db, &state.domain).deactivate(reverse_id, claims.sub)?
    };

    Ok(Json(ApiResponse::new(ReverseAliasResponse::from(&reverse))))
}
