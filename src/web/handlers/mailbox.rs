//! Mailbox handlers for the Web API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::mailbox::MailboxService;
use crate::web::dto::{
    ApiResponse, MailboxDetailResponse, MailboxListResponse, PaginatedResponse, PaginationQuery,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/aliases/:id/mailbox - List mailbox entries for an alias.
#[utoipa::path(
    get,
    path = "/aliases/{id}/mailbox",
    tag = "mailbox",
    params(
        ("id" = i64, Path, description = "Alias ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Mailbox entries, newest first", body = Vec<MailboxListResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Alias not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_mailbox(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(alias_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<MailboxListResponse>>, ApiError> {
    let (offset, limit) = pagination.to_offset_limit();

    let (entries, total) = {
        let db = state.db.lock().await;
        let all = MailboxService::new(&db, &state.domain).list_for_alias(alias_id, claims.sub)?;
        let total = all.len() as u64;

        // Manual pagination
        let entries: Vec<MailboxListResponse> = all
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(MailboxListResponse::from)
            .collect();
        (entries, total)
    };

    Ok(Json(PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// GET /api/mailbox/:id - Mailbox entry detail.
///
/// Viewing a received entry marks it read.
#[utoipa::path(
    get,
    path = "/mailbox/{id}",
    tag = "mailbox",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry detail", body = MailboxDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_mailbox_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(entry_id): Path<i64>,
) -> Result<Json<ApiResponse<MailboxDetailResponse>>, ApiError> {
    let entry = {
        let db = state.db.lock().await;
        MailboxService::new(&db, &state.domain).get_entry(entry_id, claims.sub)?
    };

    Ok(Json(ApiResponse::new(MailboxDetailResponse::from(&entry))))
}

/// DELETE /api/mailbox/:id - Delete a mailbox entry.
///
/// Deletion is hard and immediate, available to any user with access to
/// the parent alias.
#[utoipa::path(
    delete,
    path = "/mailbox/{id}",
    tag = "mailbox",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_mailbox_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(entry_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    {
        let db = state.db.lock().await;
        MailboxService::new(&db, &state.domain).delete_entry(entry_id, claims.sub)?;
    }

    Ok(Json(ApiResponse::new(())))
}
