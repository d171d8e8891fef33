//! Activity log types for Postmask.

use std::fmt;
use std::str::FromStr;

/// Maximum characters kept in activity body previews.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Kind of recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    /// Outbound mail sent from the alias.
    Sent,
    /// Fresh inbound mail delivered to the alias.
    Received,
    /// Inbound reply routed through a reverse alias.
    ReplyReceived,
    /// A collaborator was added.
    AddedCollaborator,
    /// A collaborator was removed.
    RemovedCollaborator,
}

impl ActivityAction {
    /// Convert action to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Sent => "sent",
            ActivityAction::Received => "received",
            ActivityAction::ReplyReceived => "reply_received",
            ActivityAction::AddedCollaborator => "added_collaborator",
            ActivityAction::RemovedCollaborator => "removed_collaborator",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(ActivityAction::Sent),
            "received" => Ok(ActivityAction::Received),
            "reply_received" => Ok(ActivityAction::ReplyReceived),
            "added_collaborator" => Ok(ActivityAction::AddedCollaborator),
            "removed_collaborator" => Ok(ActivityAction::RemovedCollaborator),
            _ => Err(format!("unknown activity action: {s}")),
        }
    }
}

/// One recorded activity entry.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    /// Entry ID.
    pub id: i64,
    /// Alias the action happened on.
    pub alias_id: i64,
    /// Kind of action.
    pub action: ActivityAction,
    /// User who performed the action.
    pub actor_user_id: i64,
    /// Action-specific JSON payload.
    pub payload: Option<String>,
    /// When the action was recorded.
    pub created_at: String,
}

/// New activity entry for appending.
#[derive(Debug, Clone)]
pub struct NewActivity {
    /// Alias the action happened on.
    pub alias_id: i64,
    /// Kind of action.
    pub action: ActivityAction,
    /// User who performed the action.
    pub actor_user_id: i64,
    /// Action-specific JSON payload.
    pub payload: Option<serde_json::Value>,
}

impl NewActivity {
    /// Create a new activity record without a payload.
    pub fn new(alias_id: i64, action: ActivityAction, actor_user_id: i64) -> Self {
        Self {
            alias_id,
            action,
            actor_user_id,
            payload: None,
        }
    }

    /// Attach a JSON payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Truncate a body to the activity preview length, appending an ellipsis
/// when content was cut.
pub fn preview(body: &str) -> String {
    let mut out: String = body.chars().take(PREVIEW_MAX_CHARS).collect();
    if body.chars().count() > PREVIEW_MAX_CHARS {
        out.push('…');
    }
    out
}
