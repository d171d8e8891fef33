use std::sync::Arc;

use tracing::info;

use postmask::relay::HttpMailRelay;
use postmask::web::WebServer;
use postmask::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = postmask::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        postmask::logging::init_console_only(&config.logging.level);
    }

    info!("Postmask - email alias and forwarding service");
    info!("Alias domain: {}", config.mail.domain);

    let database = match Database::open(&config.database.path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };
    let db = Arc::new(tokio::sync::Mutex::new(database));

    let relay = match HttpMailRelay::new(&config.mail) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            eprintln!("Failed to create relay client: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, db, relay) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to configure web server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
