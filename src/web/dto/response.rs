//! Response DTOs for the Postmask Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::alias::{AliasWithCollaborators, CollaboratorInfo};
use crate::mailbox::MailboxEntry;
use crate::reverse::ReverseAlias;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
}

// ============================================================================
// Alias Responses
// ============================================================================

/// One resolved collaborator.
#[derive(Debug, Serialize, ToSchema)]
pub struct CollaboratorResponse {
    /// Collaborating user ID.
    pub user_id: i64,
    /// Collaborator email.
    pub email: String,
    /// Collaborator display name.
    pub name: String,
    /// Granted role.
    pub role: String,
}

impl From<&CollaboratorInfo> for CollaboratorResponse {
    fn from(info: &CollaboratorInfo) -> Self {
        Self {
            user_id: info.user_id,
            email: info.email.clone(),
            name: info.name.clone(),
            role: info.role.as_str().to_string(),
        }
    }
}

/// One alias with the caller's access level and resolved collaborators.
#[derive(Debug, Serialize, ToSchema)]
pub struct AliasResponse {
    /// Alias ID.
    pub id: i64,
    /// Full alias address.
    pub address: String,
    /// Local part.
    pub local_part: String,
    /// Whether collaborators may be attached.
    pub is_collaborative: bool,
    /// Whether the alias is active.
    pub is_active: bool,
    /// Outbound counter.
    pub emails_sent: i64,
    /// Inbound counter.
    pub emails_received: i64,
    /// The caller's access level ("owner", "member", "viewer").
    pub access: String,
    /// Resolved collaborators.
    pub collaborators: Vec<CollaboratorResponse>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&AliasWithCollaborators> for AliasResponse {
    fn from(entry: &AliasWithCollaborators) -> Self {
        let access = match entry.access {
            crate::alias::AccessLevel::Owner => "owner",
            crate::alias::AccessLevel::Member => "member",
            crate::alias::AccessLevel::Viewer => "viewer",
            crate::alias::AccessLevel::None => "none",
        };
        Self {
            id: entry.alias.id,
            address: entry.alias.address.clone(),
            local_part: entry.alias.local_part.clone(),
            is_collaborative: entry.alias.is_collaborative,
            is_active: entry.alias.is_active,
            emails_sent: entry.alias.emails_sent,
            emails_received: entry.alias.emails_received,
            access: access.to_string(),
            collaborators: entry.collaborators.iter().map(Into::into).collect(),
            created_at: entry.alias.created_at.clone(),
        }
    }
}

// ============================================================================
// Mailbox Responses
// ============================================================================

/// Mailbox entry summary (list view, body omitted).
#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxListResponse {
    /// Entry ID.
    pub id: i64,
    /// Parent alias ID.
    pub alias_id: i64,
    /// Direction ("sent" or "received").
    pub direction: String,
    /// External counterpart address.
    pub counterpart: String,
    /// Subject line.
    pub subject: String,
    /// Read flag.
    pub is_read: bool,
    /// Forwarded flag.
    pub is_forwarded: bool,
    /// Reply flag.
    pub is_reply: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&MailboxEntry> for MailboxListResponse {
    fn from(entry: &MailboxEntry) -> Self {
        Self {
            id: entry.id,
            alias_id: entry.alias_id,
            direction: entry.direction.as_str().to_string(),
            counterpart: entry.counterpart.clone(),
            subject: entry.subject.clone(),
            is_read: entry.is_read,
            is_forwarded: entry.is_forwarded,
            is_reply: entry.is_reply,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Mailbox entry detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxDetailResponse {
    /// Entry ID.
    pub id: i64,
    /// Parent alias ID.
    pub alias_id: i64,
    /// Direction ("sent" or "received").
    pub direction: String,
    /// External counterpart address.
    pub counterpart: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Read flag.
    pub is_read: bool,
    /// Forwarded flag.
    pub is_forwarded: bool,
    /// Reply flag.
    pub is_reply: bool,
    /// Linked reverse alias row, for replies and sends.
    pub reverse_alias_id: Option<i64>,
    /// Transport message identifier.
    pub transport_id: Option<String>,
    /// Acting user for outbound entries.
    pub sender_user_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&MailboxEntry> for MailboxDetailResponse {
    fn from(entry: &MailboxEntry) -> Self {
        Self {
            id: entry.id,
            alias_id: entry.alias_id,
            direction: entry.direction.as_str().to_string(),
            counterpart: entry.counterpart.clone(),
            subject: entry.subject.clone(),
            body: entry.body.clone(),
            is_read: entry.is_read,
            is_forwarded: entry.is_forwarded,
            is_reply: entry.is_reply,
            reverse_alias_id: entry.reverse_alias_id,
            transport_id: entry.transport_id.clone(),
            sender_user_id: entry.sender_user_id,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Outbound send result.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendMailResponse {
    /// The persisted mailbox entry.
    pub entry: MailboxDetailResponse,
    /// The reverse address the recipient will reply to.
    pub reverse_address: String,
}

// ============================================================================
// Reverse Alias Responses
// ============================================================================

/// One reverse-alias mapping.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReverseAliasResponse {
    /// Row ID.
    pub id: i64,
    /// Opaque identifier (address local part).
    pub reverse_id: String,
    /// Owning alias ID.
    pub alias_id: i64,
    /// External recipient.
    pub recipient_email: String,
    /// Originating alias address snapshot.
    pub alias_address: String,
    /// Outbound counter.
    pub emails_sent: i64,
    /// Inbound counter.
    pub emails_received: i64,
    /// Whether the mapping still resolves.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last use timestamp.
    pub last_used_at: Option<String>,
}

impl From<&ReverseAlias> for ReverseAliasResponse {
    fn from(reverse: &ReverseAlias) -> Self {
        Self {
            id: reverse.id,
            reverse_id: reverse.reverse_id.clone(),
            alias_id: reverse.alias_id,
            recipient_email: reverse.recipient_email.clone(),
            alias_address: reverse.alias_address.clone(),
            emails_sent: reverse.emails_sent,
            emails_received: reverse.emails_received,
            is_active: reverse.is_active,
            created_at: reverse.created_at.clone(),
            last_used_at: reverse.last_used_at.clone(),
        }
    }
}

// ============================================================================
// Activity Responses
// ============================================================================

/// One activity log entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityResponse {
    /// Entry ID.
    pub id: i64,
    /// Action kind.
    pub action: String,
    /// Acting user ID.
    pub actor_user_id: i64,
    /// Action-specific payload.
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&crate::activity::ActivityEntry> for ActivityResponse {
    fn from(entry: &crate::activity::ActivityEntry) -> Self {
        let payload = entry
            .payload
            .as_deref()
            .and_then(|p| serde_json::from_str(p).ok());
        Self {
            id: entry.id,
            action: entry.action.as_str().to_string(),
            actor_user_id: entry.actor_user_id,
            payload,
            created_at: entry.created_at.clone(),
        }
    }
}

// ============================================================================
// Webhook Responses
// ============================================================================

/// Inbound webhook outcome.
///
/// Dropped messages still report success; the relay must never retry or
/// bounce them.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    /// "forwarded" or "dropped".
    pub outcome: String,
    /// Forward attempts accepted by the relay, for forwarded messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<usize>,
}
