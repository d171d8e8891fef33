//! Alias types for Postmask.

use std::fmt;
use std::str::FromStr;

/// Collaborator permission level on a shared alias.
///
/// The owner is implicit and holds full control; these roles only apply to
/// the collaborators list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorRole {
    /// Read and send.
    Member,
    /// Read only.
    Viewer,
}

impl CollaboratorRole {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Member => "member",
            CollaboratorRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CollaboratorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(CollaboratorRole::Member),
            "viewer" => Ok(CollaboratorRole::Viewer),
            _ => Err(format!("unknown collaborator role: {s}")),
        }
    }
}

/// An alias mailbox.
#[derive(Debug, Clone)]
pub struct Alias {
    /// Alias ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Local part of the address.
    pub local_part: String,
    /// Full address (`localpart@domain`, lower-cased, immutable).
    pub address: String,
    /// Whether collaborators may be attached.
    pub is_collaborative: bool,
    /// Whether the alias currently receives and sends mail.
    pub is_active: bool,
    /// Outbound message counter.
    pub emails_sent: i64,
    /// Inbound message counter.
    pub emails_received: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// One collaborator membership row.
#[derive(Debug, Clone)]
pub struct Collaborator {
    /// Row ID.
    pub id: i64,
    /// Alias the membership belongs to.
    pub alias_id: i64,
    /// Collaborating user.
    pub user_id: i64,
    /// Permission level.
    pub role: CollaboratorRole,
    /// When the collaborator was added.
    pub added_at: String,
}

/// New alias for creation.
#[derive(Debug, Clone)]
pub struct NewAlias {
    /// Owning user ID.
    pub user_id: i64,
    /// Normalized local part.
    pub local_part: String,
    /// Derived full address.
    pub address: String,
    /// Whether the alias is collaborative.
    pub is_collaborative: bool,
}
