//! Postmask - Email alias and forwarding service.
//!
//! Users create disposable alias addresses, receive forwarded mail, reply
//! through auto-generated reverse aliases that mask their real address, and
//! share alias mailboxes with collaborators. Actual transport is delegated
//! to an external HTTP mail relay; this crate implements the mapping and
//! policy layer around it.

pub mod activity;
pub mod alias;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod relay;
pub mod reverse;
pub mod routing;
pub mod web;

pub use activity::{ActivityAction, ActivityEntry, ActivityRepository};
pub use alias::{
    AccessLevel, Alias, AliasRepository, AliasService, Collaborator, CollaboratorRole,
};
pub use config::Config;
pub use db::{Database, NewUser, Plan, SharedDatabase, User, UserRepository};
pub use error::{PostmaskError, Result};
pub use mailbox::{Direction, MailboxEntry, MailboxRepository, MailboxService};
pub use relay::{HttpMailRelay, MailRelay, MemoryRelay, OutboundMessage, RelayReceipt};
pub use reverse::{ReverseAlias, ReverseAliasRepository, ReverseAliasService, REVERSE_PREFIX};
pub use routing::{InboundEmail, InboundOutcome, InboundRouter, OutboundSender};
