//! Request DTOs for the Postmask Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Alias creation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAliasRequest {
    /// Desired alias local name.
    pub name: String,
    /// Whether the alias is collaborative (pro plan only).
    #[serde(default)]
    pub is_collaborative: bool,
}

/// Alias activation toggle request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleAliasRequest {
    /// New active state.
    pub active: bool,
}

/// Collaborator addition request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCollaboratorRequest {
    /// Email of the user to add.
    pub email: String,
    /// Role to grant: "member" or "viewer".
    pub role: String,
}

/// Outbound send request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMailRequest {
    /// Alias address to send from.
    pub from: String,
    /// Destination address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Decoded inbound webhook payload.
///
/// The relay provider decodes its own content types upstream; this core
/// only consumes the resulting tuple.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InboundWebhookRequest {
    /// Envelope recipient.
    pub recipient: String,
    /// Envelope sender.
    pub sender: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Plain-text body.
    #[serde(default, rename = "body_plain")]
    pub body_plain: String,
    /// HTML body.
    #[serde(default, rename = "body_html")]
    pub body_html: Option<String>,
    /// Transport message identifier.
    #[serde(default, rename = "message_id")]
    pub message_id: Option<String>,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    25
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationQuery {
    /// Convert to a (offset, limit) pair with bounds applied.
    pub fn to_offset_limit(&self) -> (u32, u32) {
        let per_page = self.per_page.clamp(1, 100);
        let page = self.page.max(1);
        ((page - 1) * per_page, per_page)
    }
}
