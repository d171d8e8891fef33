//! Test helpers for Web API integration tests.
//!
//! Builds an in-process TestServer over the full router with an in-memory
//! database and a recording relay. Accounts are seeded directly through the
//! user repository (registration belongs to the external identity
//! collaborator) and tokens are minted with the AppState helper.

use std::sync::Arc;

use axum_test::TestServer;

use postmask::config::{MailConfig, WebConfig};
use postmask::web::handlers::AppState;
use postmask::web::middleware::JwtState;
use postmask::web::router::{create_health_router, create_router};
use postmask::{Database, MemoryRelay, NewUser, Plan, SharedDatabase, UserRepository};

/// Alias domain used by the test configuration.
pub const DOMAIN: &str = "m.test";

/// JWT secret used by the test configuration.
pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Webhook token used by the test configuration.
pub const WEBHOOK_TOKEN: &str = "test-webhook-token";

/// An in-process application under test.
pub struct TestApp {
    /// HTTP test server over the full router.
    pub server: TestServer,
    /// Application state (for token minting and direct inspection).
    pub state: Arc<AppState>,
    /// Shared database handle.
    pub db: SharedDatabase,
    /// The recording relay behind the router.
    pub relay: Arc<MemoryRelay>,
}

/// Create a test application with an in-memory database.
pub async fn create_test_app() -> TestApp {
    let db: SharedDatabase = Arc::new(tokio::sync::Mutex::new(
        Database::open_in_memory().expect("Failed to create test database"),
    ));
    let relay = Arc::new(MemoryRelay::new());

    let mail_config = MailConfig {
        domain: DOMAIN.to_string(),
        webhook_token: WEBHOOK_TOKEN.to_string(),
        ..MailConfig::default()
    };
    let web_config = WebConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..WebConfig::default()
    };

    let state = Arc::new(AppState::new(
        Arc::clone(&db),
        relay.clone(),
        &mail_config,
        &web_config,
    ));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));

    let router =
        create_router(Arc::clone(&state), jwt_state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        db,
        relay,
    }
}

impl TestApp {
    /// Seed a user account and mint an access token for it.
    pub async fn create_user(&self, email: &str, name: &str, plan: Plan) -> (i64, String) {
        let user_id = {
            let db = self.db.lock().await;
            UserRepository::new(&db)
                .create(&NewUser::new(email, name).with_plan(plan))
                .expect("Failed to seed user")
                .id
        };
        let token = self
            .state
            .generate_access_token(user_id, email)
            .expect("Failed to mint token");
        (user_id, token)
    }
}
