//! Mail relay client for Postmask.
//!
//! Actual transport is delegated to an external web-hosted relay; this
//! module only wraps its HTTP submission endpoint. Failures are terminal
//! per attempt: retries, queuing and bounce handling are the relay
//! provider's concern.

mod client;

pub use client::{HttpMailRelay, MailRelay, MemoryRelay, OutboundMessage, RelayReceipt};
