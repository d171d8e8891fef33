//! Mailbox entry types for Postmask.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Message direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Outbound message sent from the alias.
    Sent,
    /// Inbound message delivered to the alias.
    Received,
}

impl Direction {
    /// Convert direction to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Direction::Sent),
            "received" => Ok(Direction::Received),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}

/// One mailbox entry.
#[derive(Debug, Clone)]
pub struct MailboxEntry {
    /// Entry ID.
    pub id: i64,
    /// Parent alias.
    pub alias_id: i64,
    /// Message direction.
    pub direction: Direction,
    /// The external counterpart address (sender for received, recipient
    /// for sent).
    pub counterpart: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Whether the entry has been read.
    pub is_read: bool,
    /// Whether the message was forwarded to the recipient set.
    pub is_forwarded: bool,
    /// Whether this is a reply routed through a reverse alias.
    pub is_reply: bool,
    /// The reverse alias involved, for replies.
    pub reverse_alias_id: Option<i64>,
    /// Transport message identifier from the relay.
    pub transport_id: Option<String>,
    /// The acting user, for outbound entries.
    pub sender_user_id: Option<i64>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

/// New mailbox entry for creation.
#[derive(Debug, Clone)]
pub struct NewMailboxEntry {
    /// Parent alias.
    pub alias_id: i64,
    /// Message direction.
    pub direction: Direction,
    /// External counterpart address.
    pub counterpart: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Reply flag.
    pub is_reply: bool,
    /// Linked reverse alias, for replies and sends.
    pub reverse_alias_id: Option<i64>,
    /// Transport message identifier.
    pub transport_id: Option<String>,
    /// Acting user, for outbound entries.
    pub sender_user_id: Option<i64>,
}

impl NewMailboxEntry {
    /// A fresh inbound message.
    pub fn received(
        alias_id: i64,
        counterpart: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            alias_id,
            direction: Direction::Received,
            counterpart: counterpart.into(),
            subject: subject.into(),
            body: body.into(),
            is_reply: false,
            reverse_alias_id: None,
            transport_id: None,
            sender_user_id: None,
        }
    }

    /// An inbound reply routed through a reverse alias.
    pub fn reply(
        alias_id: i64,
        counterpart: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        reverse_alias_id: i64,
    ) -> Self {
        Self {
            is_reply: true,
            reverse_alias_id: Some(reverse_alias_id),
            ..Self::received(alias_id, counterpart, subject, body)
        }
    }

    /// An outbound message sent by a user.
    pub fn sent(
        alias_id: i64,
        counterpart: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        sender_user_id: i64,
    ) -> Self {
        Self {
            alias_id,
            direction: Direction::Sent,
            counterpart: counterpart.into(),
            subject: subject.into(),
            body: body.into(),
            is_reply: false,
            reverse_alias_id: None,
            transport_id: None,
            sender_user_id: Some(sender_user_id),
        }
    }

    /// Attach the transport message identifier.
    pub fn with_transport_id(mut self, transport_id: impl Into<String>) -> Self {
        self.transport_id = Some(transport_id.into());
        self
    }

    /// Link the reverse alias involved.
    pub fn with_reverse_alias(mut self, reverse_alias_id: i64) -> Self {
        self.reverse_alias_id = Some(reverse_alias_id);
        self
    }
}
