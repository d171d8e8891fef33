//! Activity log module for Postmask.
//!
//! Append-only audit trail of collaborative actions on an alias: outbound
//! sends, inbound deliveries, replies, and collaborator membership changes.
//! Entries are never mutated or deleted.

mod repository;
mod types;

pub use repository::ActivityRepository;
pub use types::{preview, ActivityAction, ActivityEntry, NewActivity, PREVIEW_MAX_CHARS};
