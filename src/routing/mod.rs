//! Mail routing for Postmask.
//!
//! The inbound router classifies webhook messages (reply via reverse alias
//! vs fresh mail to an alias), persists mailbox entries and fans out
//! forwarded copies to every eligible recipient. The outbound sender
//! validates authorization, obtains a reverse alias for the destination and
//! relays the message with the alias as the visible sender.

mod inbound;
mod outbound;

pub use inbound::{DropReason, InboundEmail, InboundOutcome, InboundRouter};
pub use outbound::{OutboundSender, SentMail};
