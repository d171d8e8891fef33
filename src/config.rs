//! Configuration module for Postmask.

use serde::Deserialize;
use std::path::Path;

use crate::{PostmaskError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/postmask.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Mail configuration.
///
/// The alias domain is injected from here into the alias registry and the
/// reverse-alias mapper; it is never read from the environment ad hoc.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Domain suffix for alias and reverse-alias addresses.
    #[serde(default = "default_mail_domain")]
    pub domain: String,
    /// HTTP endpoint of the external mail relay.
    #[serde(default = "default_relay_endpoint")]
    pub relay_endpoint: String,
    /// API key sent as a bearer token to the relay.
    #[serde(default)]
    pub relay_api_key: String,
    /// Relay request timeout in seconds.
    #[serde(default = "default_relay_timeout")]
    pub relay_timeout_secs: u64,
    /// Shared token the inbound webhook must present.
    #[serde(default)]
    pub webhook_token: String,
}

fn default_mail_domain() -> String {
    "mail.postmask.test".to_string()
}

fn default_relay_endpoint() -> String {
    "http://127.0.0.1:8825/messages".to_string()
}

fn default_relay_timeout() -> u64 {
    30
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            domain: default_mail_domain(),
            relay_endpoint: default_relay_endpoint(),
            relay_api_key: String::new(),
            relay_timeout_secs: default_relay_timeout(),
            webhook_token: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/postmask.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// JWT secret key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_token_expiry_secs: u64,
}

fn default_jwt_access_expiry() -> u64 {
    900 // 15 minutes
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_access_token_expiry_secs: default_jwt_access_expiry(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PostmaskError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PostmaskError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `POSTMASK_JWT_SECRET`: Override the JWT secret key
    /// - `POSTMASK_RELAY_API_KEY`: Override the relay API key
    /// - `POSTMASK_WEBHOOK_TOKEN`: Override the inbound webhook token
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("POSTMASK_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.web.jwt_secret = jwt_secret;
            }
        }
        if let Ok(api_key) = std::env::var("POSTMASK_RELAY_API_KEY") {
            if !api_key.is_empty() {
                self.mail.relay_api_key = api_key;
            }
        }
        if let Ok(token) = std::env::var("POSTMASK_WEBHOOK_TOKEN") {
            if !token.is_empty() {
                self.mail.webhook_token = token;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The JWT secret is not set
    /// - The alias domain is empty
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(PostmaskError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via the POSTMASK_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.mail.domain.is_empty() {
            return Err(PostmaskError::Config(
                "mail.domain must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/postmask.db");
        assert_eq!(config.mail.domain, "mail.postmask.test");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.web.jwt_access_token_expiry_secs, 900);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.mail.relay_timeout_secs, 30);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
            [server]
            port = 9000

            [mail]
            domain = "alias.example.com"
            relay_endpoint = "https://relay.example.com/v1/messages"
        "#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.mail.domain, "alias.example.com");
        assert_eq!(
            config.mail.relay_endpoint,
            "https://relay.example.com/v1/messages"
        );
        // Untouched sections fall back to defaults
        assert_eq!(config.database.path, "data/postmask.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not toml [[");
        assert!(matches!(result, Err(PostmaskError::Config(_))));
    }

    #[test]
    fn test_validate_requires_jwt_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.web.jwt_secret = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_domain() {
        let mut config = Config::default();
        config.web.jwt_secret = "secret".to_string();
        config.mail.domain = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [mail]
            domain = "m.example.net"

            [web]
            jwt_secret = "file-secret"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.mail.domain, "m.example.net");
        assert_eq!(config.web.jwt_secret, "file-secret");
    }
}
