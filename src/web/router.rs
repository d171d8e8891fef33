//! Router configuration for the Postmask Web API.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, AppState};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let alias_routes = Router::new()
        .route("/aliases", post(handlers::create_alias).get(handlers::list_aliases))
        .route("/aliases/:id/active", patch(handlers::toggle_alias))
        .route(
            "/aliases/:id/collaborators",
            post(handlers::add_collaborator),
        )
        .route(
            "/aliases/:id/collaborators/:user_id",
            delete(handlers::remove_collaborator),
        )
        .route("/aliases/:id/activity", get(handlers::list_activity))
        .route("/aliases/:id/reverse", get(handlers::list_reverse_aliases))
        .route("/aliases/:id/mailbox", get(handlers::list_mailbox));

    let mailbox_routes = Router::new().route(
        "/mailbox/:id",
        get(handlers::get_mailbox_entry).delete(handlers::delete_mailbox_entry),
    );

    let send_routes = Router::new()
        .route("/send", post(handlers::send_mail))
        .route(
            "/reverse/:id/deactivate",
            post(handlers::deactivate_reverse_alias),
        );

    // The relay webhook authenticates with a shared token, not a JWT
    let webhook_routes = Router::new().route("/webhook/inbound", post(handlers::inbound_webhook));

    let api_routes = Router::new()
        .merge(alias_routes)
        .merge(mailbox_routes)
        .merge(send_routes)
        .merge(webhook_routes);

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::alias::create_alias,
        handlers::alias::list_aliases,
        handlers::alias::toggle_alias,
        handlers::alias::add_collaborator,
        handlers::alias::remove_collaborator,
        handlers::alias::list_activity,
        handlers::alias::list_reverse_aliases,
        handlers::mailbox::list_mailbox,
        handlers::mailbox::get_mailbox_entry,
        handlers::mailbox::delete_mailbox_entry,
        handlers::send::send_mail,
        handlers::send::deactivate_reverse_alias,
        handlers::webhook::inbound_webhook,
    ),
    components(schemas(
        crate::web::dto::CreateAliasRequest,
        crate::web::dto::ToggleAliasRequest,
        crate::web::dto::AddCollaboratorRequest,
        crate::web::dto::SendMailRequest,
        crate::web::dto::InboundWebhookRequest,
        crate::web::dto::AliasResponse,
        crate::web::dto::CollaboratorResponse,
        crate::web::dto::MailboxListResponse,
        crate::web::dto::MailboxDetailResponse,
        crate::web::dto::SendMailResponse,
        crate::web::dto::ReverseAliasResponse,
        crate::web::dto::ActivityResponse,
        crate::web::dto::WebhookResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "aliases", description = "Alias registry and collaboration"),
        (name = "mailbox", description = "Mailbox entries"),
        (name = "send", description = "Outbound mail and reverse aliases"),
        (name = "webhook", description = "Inbound relay webhook")
    )
)]
struct ApiDoc;

/// Registers the bearer security scheme referenced by the handlers.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}
