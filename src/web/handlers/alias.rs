//! Alias handlers for the Web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::activity::ActivityRepository;
use crate::alias::{AccessLevel, AliasService, AliasWithCollaborators, CollaboratorRole};
use crate::reverse::ReverseAliasService;
use crate::web::dto::{
    ActivityResponse, AddCollaboratorRequest, AliasResponse, ApiResponse, CreateAliasRequest,
    ReverseAliasResponse, ToggleAliasRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/aliases - Create an alias.
#[utoipa::path(
    post,
    path = "/aliases",
    tag = "aliases",
    request_body = CreateAliasRequest,
    responses(
        (status = 200, description = "Alias created", body = AliasResponse),
        (status = 402, description = "Plan quota exhausted or pro feature"),
        (status = 409, description = "Address already taken"),
        (status = 422, description = "Invalid alias name")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_alias(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateAliasRequest>,
) -> Result<Json<ApiResponse<AliasResponse>>, ApiError> {
    let alias = {
        let db = state.db.lock().await;
        AliasService::new(&db, &state.domain).create_alias(
            claims.sub,
            &req.name,
            req.is_collaborative,
        )?
    };

    // Freshly created aliases have no collaborators yet
    let entry = AliasWithCollaborators {
        alias,
        access: AccessLevel::Owner,
        collaborators: vec![],
    };
    Ok(Json(ApiResponse::new(AliasResponse::from(&entry))))
}

/// GET /api/aliases - List accessible aliases.
#[utoipa::path(
    get,
    path = "/aliases",
    tag = "aliases",
    responses(
        (status = 200, description = "Owned and collaborated aliases", body = Vec<AliasResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_aliases(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<AliasResponse>>>, ApiError> {
    let aliases = {
        let db = state.db.lock().await;
        AliasService::new(&db, &state.domain).list_accessible(claims.sub)?
    };

    let responses = aliases.iter().map(AliasResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// PATCH /api/aliases/:id/active - Toggle the active flag.
#[utoipa::path(
    patch,
    path = "/aliases/{id}/active",
    tag = "aliases",
    params(
        ("id" = i64, Path, description = "Alias ID")
    ),
    request_body = ToggleAliasRequest,
    responses(
        (status = 200, description = "Alias updated", body = AliasResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Alias not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_alias(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(alias_id): Path<i64>,
    Json(req): Json<ToggleAliasRequest>,
) -> Result<Json<ApiResponse<AliasResponse>>, ApiError> {
    let entry = {
        let db = state.db.lock().await;
        let service = AliasService::new(&db, &state.domain);
        service.toggle_active(alias_id, claims.sub, req.active)?;
        resolve_alias_entry(&service, alias_id, claims.sub)?
    };

    Ok(Json(ApiResponse::new(AliasResponse::from(&entry))))
}

/// POST /api/aliases/:id/collaborators - Add a collaborator.
#[utoipa::path(
    post,
    path = "/aliases/{id}/collaborators",
    tag = "aliases",
    params(
        ("id" = i64, Path, description = "Alias ID")
    ),
    request_body = AddCollaboratorRequest,
    responses(
        (status = 200, description = "Collaborator added", body = AliasResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Alias or user not found"),
        (status = 409, description = "Already a collaborator"),
        (status = 422, description = "Bad role or non-collaborative alias")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_collaborator(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(alias_id): Path<i64>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<Json<ApiResponse<AliasResponse>>, ApiError> {
    let role: CollaboratorRole = req
        .role
        .parse()
        .map_err(|e: String| ApiError::unprocessable(e))?;

    let entry = {
        let db = state.db.lock().await;
        let service = AliasService::new(&db, &state.domain);
        service.add_collaborator(alias_id, claims.sub, &req.email, role)?;
        resolve_alias_entry(&service, alias_id, claims.sub)?
    };

    Ok(Json(ApiResponse::new(AliasResponse::from(&entry))))
}

/// DELETE /api/aliases/:id/collaborators/:user_id - Remove a collaborator.
#[utoipa::path(
    delete,
    path = "/aliases/{id}/collaborators/{user_id}",
    tag = "aliases",
    params(
        ("id" = i64, Path, description = "Alias ID"),
        ("user_id" = i64, Path, description = "Collaborator user ID")
    ),
    responses(
        (status = 200, description = "Collaborator removed", body = AliasResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Alias or collaborator not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_collaborator(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((alias_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<AliasResponse>>, ApiError> {
    let entry = {
        let db = state.db.lock().await;
        let service = AliasService::new(&db, &state.domain);
        service.remove_collaborator(alias_id, claims.sub, user_id)?;
        resolve_alias_entry(&service, alias_id, claims.sub)?
    };

    Ok(Json(ApiResponse::new(AliasResponse::from(&entry))))
}

/// GET /api/aliases/:id/activity - Activity feed for an alias.
#[utoipa::path(
    get,
    path = "/aliases/{id}/activity",
    tag = "aliases",
    params(
        ("id" = i64, Path, description = "Alias ID")
    ),
    responses(
        (status = 200, description = "Activity entries, newest first", body = Vec<ActivityResponse>),
        (status = 404, description = "Alias not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(alias_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ActivityResponse>>>, ApiError> {
    let entries = {
        let db = state.db.lock().await;
        // Read access is enough to see the shared audit trail
        AliasService::new(&db, &state.domain).get_for_read(alias_id, claims.sub)?;
        ActivityRepository::new(&db).list_for_alias(alias_id)?
    };

    let responses = entries.iter().map(ActivityResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/aliases/:id/reverse - Reverse aliases minted for an alias.
#[utoipa::path(
    get,
    path = "/aliases/{id}/reverse",
    tag = "aliases",
    params(
        ("id" = i64, Path, description = "Alias ID")
    ),
    responses(
        (status = 200, description = "Reverse aliases, newest first", body = Vec<ReverseAliasResponse>),
        (status = 404, description = "Alias not found or inaccessible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_reverse_aliases(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(alias_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ReverseAliasResponse>>>, ApiError> {
    let reverses = {
        let db = state.db.lock().await;
        ReverseAliasService::new(&db, &state.domain).list_for_alias(alias_id, claims.sub)?
    };

    let responses = reverses.iter().map(ReverseAliasResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// Re-resolve a single alias with collaborators for a response body.
fn resolve_alias_entry(
    service: &AliasService<'_>,
    alias_id: i64,
    caller_id: i64,
) -> Result<AliasWithCollaborators, ApiError> {
    let entry = service
        .list_accessible(caller_id)?
        .into_iter()
        .find(|e| e.alias.id == alias_id)
        .ok_or_else(|| ApiError::not_found("alias not found"))?;
    Ok(entry)
}
