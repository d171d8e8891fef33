//! Mailbox module for Postmask.
//!
//! One mailbox entry is recorded per inbound or outbound message on an
//! alias. Entries are shared by everyone with access to the alias:
//! - Read/forwarded flags are the only mutations
//! - Deletion is hard and immediate, available to any user with access
//! - Replies routed through a reverse alias carry a link to it

mod repository;
mod service;
mod types;

pub use repository::MailboxRepository;
pub use service::MailboxService;
pub use types::{Direction, MailboxEntry, NewMailboxEntry};
