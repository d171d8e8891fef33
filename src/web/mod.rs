//! Web API module for Postmask.
//!
//! This module provides the REST API for alias management, mailbox access,
//! outbound sending and the inbound relay webhook.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
