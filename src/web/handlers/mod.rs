//! API handlers for the Postmask Web API.

pub mod alias;
pub mod mailbox;
pub mod send;
pub mod webhook;

pub use alias::*;
pub use mailbox::*;
pub use send::*;
pub use webhook::*;

use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::config::{MailConfig, WebConfig};
use crate::db::SharedDatabase;
use crate::relay::MailRelay;
use crate::routing::{InboundRouter, OutboundSender};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;

/// Shared relay handle.
pub type SharedRelay = Arc<dyn MailRelay>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// Mail relay handle.
    pub relay: SharedRelay,
    /// Alias domain suffix.
    pub domain: String,
    /// Shared token the inbound webhook must present (empty disables the
    /// check, for development).
    pub webhook_token: String,
    /// JWT encoding key (token issuance helper for tooling and tests).
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: SharedDatabase,
        relay: SharedRelay,
        mail_config: &MailConfig,
        web_config: &WebConfig,
    ) -> Self {
        Self {
            db,
            relay,
            domain: mail_config.domain.clone(),
            webhook_token: mail_config.webhook_token.clone(),
            encoding_key: EncodingKey::from_secret(web_config.jwt_secret.as_bytes()),
            access_token_expiry: web_config.jwt_access_token_expiry_secs,
        }
    }

    /// Generate an access token for a user.
    ///
    /// Token issuance normally lives with the external identity
    /// collaborator; this helper exists for operational tooling and the
    /// test suites.
    pub fn generate_access_token(&self, user_id: i64, email: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Inbound router over this state's database and relay.
    pub fn inbound_router(&self) -> InboundRouter {
        InboundRouter::new(
            Arc::clone(&self.db),
            Arc::clone(&self.relay),
            self.domain.clone(),
        )
    }

    /// Outbound sender over this state's database and relay.
    pub fn outbound_sender(&self) -> OutboundSender {
        OutboundSender::new(
            Arc::clone(&self.db),
            Arc::clone(&self.relay),
            self.domain.clone(),
        )
    }
}
